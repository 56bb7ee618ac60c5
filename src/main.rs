use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watch_detection_console::api::{create_router, ConsoleState};
use watch_detection_console::app::App;
use watch_detection_console::session::SessionStore;
use watch_detection_console::Config;

#[derive(Debug, Parser)]
#[command(name = "watch-detection-console")]
#[command(about = "Demo console for the watch detection service")]
struct CliArgs {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = Config::default_path())]
    config: PathBuf,

    /// Address to listen on, overriding the configuration.
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,

    /// Answer detection requests locally with placeholder results.
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watch_detection_console=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting watch-detection-console v{}", env!("CARGO_PKG_VERSION"));

    let args = CliArgs::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let bind = args.bind.unwrap_or_else(|| config.console.bind.clone());
    let sessions = SessionStore::new(config.demo_credentials().clone());
    let app = App::from_config(&config, args.offline);
    let router = create_router(Arc::new(ConsoleState::new(app, sessions)));

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    info!("Console listening on http://{}", bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        })
        .await?;

    info!("Goodbye!");
    Ok(())
}
