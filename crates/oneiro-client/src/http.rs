use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;
use uuid::Uuid;

use oneiro_types::api::{ErrorResponse, ExploreQuery, FeedQuery, ToggleLikeResponse};
use oneiro_types::models::Dream;

use crate::backend::FeedBackend;
use crate::error::ClientError;

/// `FeedBackend` over the Oneiro HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Turn a non-2xx response into `ClientError::Server`, preferring the
/// server's `{error}` message when it sent one.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            }
        });

    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl FeedBackend for HttpBackend {
    async fn fetch_feed(&self, query: &FeedQuery, token: Option<&str>) -> Result<Vec<Dream>, ClientError> {
        debug!(offset = query.offset, sort = query.sort.as_str(), lang = %query.lang, "Fetching feed page");
        let request = self.client.get(self.url("/feed")).query(query);
        let response = check(authorize(request, token).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn toggle_like(&self, dream_id: Uuid, token: &str) -> Result<ToggleLikeResponse, ClientError> {
        let response = self
            .client
            .post(self.url(&format!("/dreams/{dream_id}/like")))
            .bearer_auth(token)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn search(&self, query: &str, token: Option<&str>) -> Result<Vec<Dream>, ClientError> {
        let params = ExploreQuery { q: query.to_string() };
        let request = self.client.get(self.url("/explore")).query(&params);
        let response = check(authorize(request, token).send().await?).await?;
        Ok(response.json().await?)
    }
}
