// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_writer;
pub mod influx_repository;
