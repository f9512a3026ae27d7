// Main entry point - Dependency injection, server and export setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{http::Method, routing::get, Router};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::export_service::SessionExportService;
use crate::application::reading_repository::ReadingRepository;
use crate::application::status_service::StatusService;
use crate::domain::session::TrailingRunPolicy;
use crate::infrastructure::config::{load_settings, Settings};
use crate::infrastructure::csv_writer::CsvSessionWriter;
use crate::infrastructure::influx_repository::InfluxReadingRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::cli::{Cli, Command};
use crate::presentation::handlers::{health_check, latest_status};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = load_settings(&cli.config)
        .with_context(|| format!("Failed to load settings from {}", cli.config))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    // Create repository (infrastructure layer)
    let store = &settings.store;
    let repository: Arc<dyn ReadingRepository> = Arc::new(InfluxReadingRepository::new(
        store.host.clone(),
        store.token.clone(),
        store.database.clone(),
        store.retention_policy.clone(),
        store.measurement.clone(),
    ));

    match cli.command {
        Command::Serve => serve(&settings, repository).await,
        Command::Export {
            after,
            close_trailing,
            output_dir,
        } => {
            let policy = if close_trailing {
                TrailingRunPolicy::Close
            } else {
                settings.export.trailing_run
            };
            let output_dir = output_dir.unwrap_or_else(|| settings.export.output_dir.clone());
            let writer = Arc::new(CsvSessionWriter::new(output_dir, settings.export.delimiter)?);

            let service =
                SessionExportService::new(repository, writer, settings.switches.clone(), policy);

            for summary in service.export_after(after).await? {
                tracing::info!(
                    "{}: {} readings, {} sessions, {} files",
                    summary.switch,
                    summary.readings,
                    summary.sessions,
                    summary.files.len()
                );
            }
            Ok(())
        }
    }
}

async fn serve(settings: &Settings, repository: Arc<dyn ReadingRepository>) -> anyhow::Result<()> {
    // Create application state
    let state = Arc::new(AppState {
        status_service: StatusService::new(repository, settings.switches.clone()),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/", get(latest_status))
        .route("/healthz", get(health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = settings
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", settings.server.bind))?;
    tracing::info!("Starting appliance-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
