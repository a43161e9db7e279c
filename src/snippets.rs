//! Client for the n8n snippet webhook service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::config::Config;
use crate::error::RelayError;

const SNIPPET_READ_URL: &str =
    "https://n8n.1000.school/webhook/ae38a67a-6dbd-4404-8a54-74c565b1868e";
const SNIPPET_WRITE_URL: &str =
    "https://n8n.1000.school/webhook/0a43fbad-cc6d-4a5f-8727-b387c27de7c8/";

/// A daily snippet: who wrote it, for which date, and the text itself.
/// Never stored locally; created and read through the webhook service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub user_email: String,
    pub snippet_date: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct SnippetEnvelope {
    snippets: Vec<Snippet>,
}

/// Read/write access to the snippet webhook service.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SnippetApi: Send + Sync {
    /// Reads snippets for an inclusive date range.
    async fn list(&self, date_from: &str, date_to: &str) -> Result<Vec<Snippet>, RelayError>;

    /// Writes a new snippet and returns the upstream JSON verbatim.
    async fn create(&self, snippet: &Snippet) -> Result<Value, RelayError>;
}

/// Live client against the n8n webhook endpoints.
pub struct SnippetClient {
    http: reqwest::Client,
    token: String,
    read_url: String,
    write_url: String,
}

impl SnippetClient {
    pub fn new(config: &Config) -> Self {
        SnippetClient {
            http: reqwest::Client::new(),
            token: config.snippet_token.clone(),
            read_url: SNIPPET_READ_URL.to_string(),
            write_url: SNIPPET_WRITE_URL.to_string(),
        }
    }

    async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, RelayError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let message = res.text().await.unwrap_or_default();
        Err(RelayError::UpstreamStatus {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SnippetApi for SnippetClient {
    async fn list(&self, date_from: &str, date_to: &str) -> Result<Vec<Snippet>, RelayError> {
        debug!(date_from, date_to, "Fetching snippets");

        let res = self
            .http
            .get(&self.read_url)
            .query(&[
                ("api_id", self.token.as_str()),
                ("date_from", date_from),
                ("date_to", date_to),
            ])
            .send()
            .await?;

        let res = Self::check_status(res).await?;

        // The service wraps the result in a single-element array.
        let envelopes: Vec<SnippetEnvelope> = res.json().await?;
        let first = envelopes.into_iter().next().ok_or_else(|| {
            RelayError::MalformedUpstream("empty snippet envelope list".to_string())
        })?;
        Ok(first.snippets)
    }

    async fn create(&self, snippet: &Snippet) -> Result<Value, RelayError> {
        debug!(user_email = %snippet.user_email, snippet_date = %snippet.snippet_date, "Creating snippet");

        let body = json!({
            "user_email": snippet.user_email,
            "api_id": self.token,
            "snippet_date": snippet.snippet_date,
            "content": snippet.content,
        });

        // The webhook answers JSON but expects this Accept hint.
        let res = self
            .http
            .post(&self.write_url)
            .header("Accept", "text/html")
            .json(&body)
            .send()
            .await?;

        let res = Self::check_status(res).await?;
        Ok(res.json().await?)
    }
}
