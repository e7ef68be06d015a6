//! alpino-server — web API over the Alpino parser.
//!
//! Reads config from env vars:
//!   ALPINO_HOME          — Alpino installation directory (required)
//!   NERC_JAR, NERC_MODEL — ixa-pipe-nerc jar and model (both or neither)
//!   COREF_CMD            — coreference resolver command line (optional)
//!   PROCESS_TIMEOUT_SECS — external tool timeout (default: 600)
//!   BIND_ADDR            — listen address (default: 0.0.0.0:5002)

use alpino_server::config::Config;
use alpino_server::handlers::AppState;
use alpino_server::router::build_router;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,alpino_server=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    tracing::info!(
        alpino_home = %config.alpino_home.display(),
        nerc = config.nerc.is_some(),
        coref = config.coref_cmd.is_some(),
        "configuration loaded"
    );

    let app = build_router(AppState::new(config));

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("alpino-server listening on {bind_addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
