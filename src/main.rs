mod bracket;
mod config;
mod domain;
mod exchanges;
mod server;

use std::env;
use std::error::Error;
use std::sync::Arc;

use bracket::{ClientOrderIdGenerator, OrchestratorSettings};
use config::{Config, CredentialStore};
use exchanges::binance::BinanceFactory;
use server::AppState;
use tokio::net::TcpListener;
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

fn parse_config_path() -> String {
    for arg in env::args().skip(1) {
        if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    DEFAULT_CONFIG_PATH.to_string()
}

fn init_tracing(log_level: Option<&str>) {
    let level = match log_level {
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("warn") | Some("warning") => Level::WARN,
        Some("error") => Level::ERROR,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config_path = parse_config_path();
    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.app.log_level.as_deref());

    info!(
        name = %config.app.name,
        env = %config.app.env,
        config = %config_path,
        "Config loaded"
    );

    if let Err(e) = serve(config).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn serve(config: Config) -> Result<(), Box<dyn Error>> {
    let addr = config.bind_addr()?;
    let ids = ClientOrderIdGenerator::new(config.exchange.client_order_prefix.clone())?;

    let state = AppState {
        store: Arc::new(CredentialStore::new(&config.server.credentials_path)),
        factory: Arc::new(BinanceFactory::new(config.exchange.clone())),
        ids: Arc::new(ids),
        settings: OrchestratorSettings::from(&config.exchange),
    };

    let app = server::router(state, config.server.cors);
    let listener = TcpListener::bind(addr).await?;

    info!(
        addr = %addr,
        credentials = %config.server.credentials_path,
        base_url = %config.exchange.base_url,
        "Listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
