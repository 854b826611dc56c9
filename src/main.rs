use anyhow::{Context, Result};
use chatkit_server::{create_router, AppState, Config};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// ChatKit session proxy and single-page app server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Optional config file (TOML, YAML, JSON, ...)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind (overrides HOST)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Built app directory (overrides STATIC_DIR)
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables take precedence
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();

    let mut cfg = Config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        cfg.server.bind = bind;
    }
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }
    if let Some(static_dir) = cli.static_dir {
        cfg.assets.root = static_dir;
    }

    info!("ChatKit server v{}", env!("CARGO_PKG_VERSION"));
    info!("Workflow: {}", cfg.chatkit.workflow_id);

    let addr = format!("{}:{}", cfg.server.bind, cfg.server.port);
    let state = AppState::from_config(cfg)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
