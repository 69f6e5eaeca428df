//! HTTP routes served from inside the host.
//!
//! Each route receives the host document through router state, never through
//! a global. The document is shared as `Arc<Mutex<D>>`; a request holds the
//! lock for its whole duration, so only one transaction is ever open.
//!
//! # Routes
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | `POST` | `/create_line_based_element/` | [`line_elements::handle_create_line_based_element`] |

pub mod line_elements;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::post, Router};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;

use crate::host::HostDocument;

pub use line_elements::{
    create_line_based_element, CreateLineElementRequest, CreateLineElementResponse,
    ErrorResponse, RouteError,
};

/// A host document shared between requests.
pub type SharedDocument<D> = Arc<Mutex<D>>;

/// Wraps a document for use as router state.
pub fn share<D: HostDocument>(doc: D) -> SharedDocument<D> {
    Arc::new(Mutex::new(doc))
}

/// Builds the route table for `doc`, rooted at `/`.
pub fn router<D: HostDocument + 'static>(doc: SharedDocument<D>) -> Router {
    Router::new()
        .route(
            "/create_line_based_element/",
            post(line_elements::handle_create_line_based_element::<D>),
        )
        .with_state(doc)
}

/// Builds the route table nested under `prefix` (e.g. `/revit_mcp`).
///
/// An empty prefix serves the routes at the root.
pub fn api_router<D: HostDocument + 'static>(prefix: &str, doc: SharedDocument<D>) -> Router {
    let routes = router(doc);
    if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(prefix, routes)
    }
}

/// Serves `app` on `addr` until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or serving fails.
pub async fn serve(addr: SocketAddr, app: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(address = %listener.local_addr()?, "Host routes listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Resolves when the process receives SIGINT or SIGTERM.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (Ok(mut sigint), Ok(mut sigterm)) = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) else {
        tracing::warn!("Failed to install signal handlers, serving until killed");
        return std::future::pending().await;
    };

    tokio::select! {
        _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
        _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

/// Resolves when the process receives Ctrl+C.
#[cfg(windows)]
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, initiating graceful shutdown");
    } else {
        tracing::warn!("Failed to listen for Ctrl+C, serving until killed");
        std::future::pending::<()>().await;
    }
}
