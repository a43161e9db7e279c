//! Notion API client: database query and block-children fetches.
//!
//! The [`NotionApi`] trait is the seam between handlers/walker and the
//! wire; it is annotated for `mockall` so tests can assert call counts
//! and inject canned trees without a network.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::blocks::Block;
use crate::config::Config;
use crate::error::RelayError;

const NOTION_API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// Read-only access to the document database and block trees.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait NotionApi: Send + Sync {
    /// Queries all entries of the shared database in one call, with no
    /// filter, paging or sort parameters. Returns the upstream JSON
    /// verbatim.
    async fn query_database(&self) -> Result<Value, RelayError>;

    /// Fetches the immediate children of a block, in upstream order.
    async fn block_children(&self, block_id: &str) -> Result<Vec<Block>, RelayError>;
}

#[derive(Debug, Deserialize)]
struct ChildrenResponse {
    results: Vec<Block>,
}

/// Live client against the Notion REST API.
pub struct NotionClient {
    http: reqwest::Client,
    token: String,
    database_id: String,
    base_url: String,
}

impl NotionClient {
    pub fn new(config: &Config) -> Self {
        NotionClient {
            http: reqwest::Client::new(),
            token: config.notion_token.clone(),
            database_id: config.notion_database_id.clone(),
            base_url: NOTION_API_BASE.to_string(),
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
impl NotionApi for NotionClient {
    async fn query_database(&self) -> Result<Value, RelayError> {
        let url = format!("{}/databases/{}/query", self.base_url, self.database_id);
        debug!(url = %url, "Querying Notion database");

        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({}))
            .send()
            .await?;

        let res = Self::check_status(res).await?;
        Ok(res.json().await?)
    }

    async fn block_children(&self, block_id: &str) -> Result<Vec<Block>, RelayError> {
        let url = format!("{}/blocks/{}/children", self.base_url, block_id);
        debug!(url = %url, "Fetching block children");

        let res = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await?;

        let res = Self::check_status(res).await?;
        let body: ChildrenResponse = res.json().await?;
        Ok(body.results)
    }
}
