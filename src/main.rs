use anyhow::Context;
use std::net::SocketAddr;
use tokio::sync::broadcast::error::RecvError;
use tpo_admin::{create_app_with_rate_limit, seed, AppState, Settings, Store};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env().context("failed to load configuration")?;

    let store = if settings.seed_demo {
        tracing::info!("loading demo data");
        Store::with_snapshot(seed::demo_snapshot())
    } else {
        Store::new()
    };

    // Log every change at debug level; useful when following the dashboard's writes.
    let mut events = store.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!(collection = ?event.collection, change = ?event.change, id = ?event.id, "store changed"),
                Err(RecvError::Lagged(skipped)) => tracing::debug!(skipped, "change log lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut state = AppState::new(store);
    match &settings.admin_token {
        Some(token) => state = state.with_admin_token(token.clone()),
        None => tracing::warn!("ADMIN_TOKEN is not set; write routes will answer 401"),
    }

    let app = create_app_with_rate_limit(state, settings.rate_limit);
    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    tracing::info!("Server running on http://{}", settings.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(?e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
