use async_trait::async_trait;
use uuid::Uuid;

use oneiro_types::api::{FeedQuery, ToggleLikeResponse};
use oneiro_types::models::Dream;

use crate::error::ClientError;

/// The backend procedures the client core depends on.
#[async_trait]
pub trait FeedBackend: Send + Sync + 'static {
    /// One page of public dreams, with `has_liked` computed for `token`'s user.
    async fn fetch_feed(&self, query: &FeedQuery, token: Option<&str>) -> Result<Vec<Dream>, ClientError>;

    /// Flip the caller's like and return the authoritative state.
    async fn toggle_like(&self, dream_id: Uuid, token: &str) -> Result<ToggleLikeResponse, ClientError>;

    async fn search(&self, query: &str, token: Option<&str>) -> Result<Vec<Dream>, ClientError>;
}
