use std::{future::Future, net::SocketAddr};

use axum::Router;
use configs::AppConfig;
use service::resources::{ResourceStore, StoreOptions};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes;
use crate::state::AppState;

/// Open the configured store and build the router around it.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let options = StoreOptions {
        strict: cfg.storage.strict,
        op_timeout: cfg.storage.op_timeout(),
    };
    let store = ResourceStore::open_file(&cfg.storage.path, cfg.storage.create_if_missing, options).await?;
    info!(
        path = %cfg.storage.path,
        strict = cfg.storage.strict,
        create_if_missing = cfg.storage.create_if_missing,
        "resource store ready"
    );
    Ok(routes::build_router(AppState::new(store, cfg.storage.strict), cfg.server.max_body_bytes))
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, "resource server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!(%addr, "resource server drained");
    Ok(())
}

/// Public entry: build the app, bind and run until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;
    let listener = TcpListener::bind(cfg.server.bind_addr()).await?;
    serve(listener, app, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
