//! HTTP client for the answer backend.
//!
//! One client instance serves all four endpoints. The base URL is settable
//! at runtime so the host page's configuration can repoint the widget
//! without rebuilding it.

use std::sync::RwLock;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use docent_core::types::{
    ConversationHistory, FeedbackRequest, FeedbackResponse, HealthResponse, QueryRequest,
    QueryResponse,
};

use crate::error::ClientError;

/// The answer backend boundary: query, history, feedback, health.
///
/// Implemented by `AnswerClient` over HTTP and by scripted fakes in tests.
/// No call is retried automatically.
#[async_trait]
pub trait AnswerApi: Send + Sync {
    /// Ask a question, optionally continuing an existing conversation.
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError>;

    /// Fetch the ordered messages of a conversation.
    async fn history(&self, conversation_id: &str) -> Result<ConversationHistory, ClientError>;

    /// Record a helpfulness rating for a message.
    async fn submit_feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackResponse, ClientError>;

    /// Backend liveness probe.
    async fn health(&self) -> Result<HealthResponse, ClientError>;
}

/// HTTP implementation of `AnswerApi`.
pub struct AnswerClient {
    http: reqwest::Client,
    base_url: RwLock<String>,
}

impl AnswerClient {
    /// Create a client against the given base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: RwLock::new(normalize(base_url.into())),
        }
    }

    /// Repoint the client at a different deployment.
    pub fn set_base_url(&self, base_url: impl Into<String>) {
        let mut guard = self.base_url.write().expect("base_url lock poisoned");
        *guard = normalize(base_url.into());
    }

    /// The currently configured base URL.
    pub fn base_url(&self) -> String {
        self.base_url.read().expect("base_url lock poisoned").clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        decode(response).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        decode(response).await
    }
}

#[async_trait]
impl AnswerApi for AnswerClient {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
        tracing::debug!(query_len = request.query.len(), "Sending chat query");
        self.post_json("/chat/query", request).await
    }

    async fn history(&self, conversation_id: &str) -> Result<ConversationHistory, ClientError> {
        self.get_json(&format!("/chat/history/{}", conversation_id))
            .await
    }

    async fn submit_feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackResponse, ClientError> {
        self.post_json("/feedback", request).await
    }

    async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get_json("/health").await
    }
}

fn normalize(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Server {
            status: status.as_u16(),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let client = AnswerClient::new("http://localhost:8000/api/");
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/health"), "http://localhost:8000/api/health");
    }

    #[test]
    fn test_set_base_url_repoints() {
        let client = AnswerClient::new("http://localhost:8000/api");
        client.set_base_url("https://docs.example.org/api/");
        assert_eq!(client.base_url(), "https://docs.example.org/api");
    }
}
