pub mod ai;
pub mod auth;
pub mod comments;
pub mod convert;
pub mod dreams;
pub mod feed;
pub mod likes;
pub mod middleware;
pub mod profile;
pub mod routes;

use axum::http::StatusCode;
use oneiro_db::Database;
use tracing::error;

use crate::auth::AppState;

/// Run a blocking database call off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, StatusCode>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("Database error: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
