//! ff-mcp: assistant-protocol surface over the FeedbackFlow store.
//!
//! Exposes the store's five operations to editor / assistant integrations
//! as named resources, tools and prompts over HTTP:
//!
//! | Route | Kind | Store operation |
//! |-------|------|-----------------|
//! | `GET /resources/log` | resource `feedback://log` | `read_log` |
//! | `GET /resources/status` | resource `feedback://status` | `status` |
//! | `GET /resources/meta` | resource `feedback://meta` | `read_meta` |
//! | `POST /tools/add_feedback` | tool | `append` |
//! | `POST /tools/clear_feedback` | tool | `clear` |
//! | `POST /tools/mark_feedback_addressed` | tool | `mark_addressed` |
//! | `GET /prompts/analyze_feedback` | prompt | none |
//!
//! Store calls are blocking filesystem work and run on the blocking pool.

pub mod error;
pub mod prompts;
pub mod routes;

use std::future::Future;
use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use ff_core::Store;
use tokio::net::TcpListener;
use tracing::info;

pub use error::ApiError;

/// Build the router. State is just the store handle.
pub fn router(store: Store) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/resources/log", get(routes::log))
        .route("/resources/status", get(routes::status))
        .route("/resources/meta", get(routes::meta))
        .route("/tools/add_feedback", post(routes::add_feedback))
        .route("/tools/clear_feedback", post(routes::clear_feedback))
        .route(
            "/tools/mark_feedback_addressed",
            post(routes::mark_feedback_addressed),
        )
        .route("/prompts/{name}", get(routes::prompt))
        .with_state(store)
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn serve<S>(addr: SocketAddr, store: Store, shutdown: S) -> std::io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, store = %store.dir().display(), "assistant surface listening");
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
}
