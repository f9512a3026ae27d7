// Application layer - Use cases over the reading store
pub mod export_service;
pub mod reading_repository;
pub mod session_writer;
pub mod status_service;
