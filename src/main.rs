use std::process::ExitCode;
use std::sync::Arc;

use dotenv::dotenv;
use thiserror::Error;
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod model;
mod routes;
mod sheets;
mod state;
mod table;

use config::{AppConfig, ConfigError, StoreConfig};
use sheets::{GoogleSheets, MemoryWorkbook, SheetBackend, SheetError, StaticToken};
use state::{AppState, SheetLayout};

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("spreadsheet backend: {0}")]
    Backend(#[from] SheetError),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    init_tracing(config::log_json_from_env());

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "linh_nga_crm=info,tower_http=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

async fn open_backend(store: &StoreConfig) -> Result<Arc<dyn SheetBackend>, StartupError> {
    Ok(match store {
        StoreConfig::Google(google) => {
            tracing::info!(
                spreadsheet_id = %google.spreadsheet_id,
                service_account = %google.service_account_email,
                "Using Google Sheets backend"
            );
            let tokens = Arc::new(StaticToken::new(google.access_token.clone()));
            Arc::new(GoogleSheets::new(&google.spreadsheet_id, tokens)?)
        }
        StoreConfig::Memory { workbook_path: Some(path) } => {
            tracing::info!(path = %path.display(), "Using workbook file backend");
            Arc::new(MemoryWorkbook::open(path).await?)
        }
        StoreConfig::Memory { workbook_path: None } => {
            tracing::warn!("Using in-memory backend, data is lost on exit");
            Arc::new(MemoryWorkbook::with_default_sheets())
        }
    })
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    tracing::info!(backend = ?config.store.kind(), "Configuration loaded");
    tracing::debug!(?config, "Full configuration");

    let backend = open_backend(&config.store).await?;
    let state = AppState::new(backend, SheetLayout::from_config(&config));

    let mut app = routes::app(state);
    if let Some(dir) = &config.static_dir {
        tracing::info!(dir = %dir.display(), "Serving frontend build");
        let serve_dir = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html")));
        app = app.fallback_service(serve_dir);
    }

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
