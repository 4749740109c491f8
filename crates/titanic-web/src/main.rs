//! Titanic Q&A API server
//!
//! Run with: cargo run -p titanic-web --bin titanic-server

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use titanic_config::{load_dotenv, Config};
use titanic_web::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("titanic_web=debug,titanic_agent=debug,info")),
        )
        .init();

    if let Some(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = Config::load()?;
    info!(
        dataset = %config.dataset.path.display(),
        model = %config.llm.model,
        "Starting Titanic Q&A server..."
    );
    if config.llm.api_key().is_none() {
        warn!(env = %config.llm.api_key_env, "No API token set; model calls will be rejected");
    }

    let bind = config.server.bind.clone();
    let state = AppState::new(config)?;

    // Load the table and build the agent up front so the first request is fast.
    // A failure here is logged and retried on the first /ask.
    match state.agent().await {
        Ok(agent) => info!(model = agent.model_id(), tools = agent.tools().len(), "Agent warm"),
        Err(e) => error!(error = %e, "Agent warm-up failed"),
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

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
