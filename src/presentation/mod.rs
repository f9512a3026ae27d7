// Presentation layer - HTTP handlers and command line
pub mod app_state;
pub mod cli;
pub mod handlers;
