//! Server start-up: build the state, bind, serve until shutdown.

use std::{future::Future, sync::Arc};

use thiserror::Error;
use tokio::net::TcpListener;

use crate::{
    config::ServerConfig,
    infrastructure::repository::InMemoryChatStore,
    signal::shutdown_signal,
    ui::{AppState, build_router},
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Application state backed by the in-memory store
pub fn build_state(config: &ServerConfig) -> Arc<AppState> {
    Arc::new(AppState::new(
        Arc::new(InMemoryChatStore::new()),
        config.outbound_buffer,
    ))
}

/// Bind the configured address.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr = config.bind_addr();
    TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Run the server until Ctrl-C or SIGTERM.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let listener = bind(&config).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("Server listening on http://{}", local_addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws?user_id=<user id>", local_addr);

    let state = build_state(&config);
    serve(listener, state, shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}
