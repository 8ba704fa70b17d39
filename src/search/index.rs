//! Client for the external full-text index.
//!
//! The index only ranks; question content always comes from the store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::query::{index_definition, match_all, parse_hits, IndexDocument, SearchHit, SearchRequest};
use crate::error::IndexError;

/// Default index base URL.
pub const DEFAULT_SEARCH_URL: &str = "http://localhost:9200";

/// Default index name.
pub const DEFAULT_INDEX_NAME: &str = "question_index";

/// Default request timeout for index calls.
pub const DEFAULT_INDEX_TIMEOUT: Duration = Duration::from_secs(60);

/// Operations the search layer needs from a full-text index.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Ranked hits, most relevant first.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, IndexError>;

    async fn exists(&self) -> Result<bool, IndexError>;

    /// Create the index with its analyzer settings and mapping.
    async fn create_index(&self) -> Result<(), IndexError>;

    /// Delete the index. Deleting a missing index is not an error.
    async fn delete_index(&self) -> Result<(), IndexError>;

    /// Remove every document but keep the index.
    async fn clear(&self) -> Result<(), IndexError>;

    /// Add or replace documents, keyed by `pk`.
    async fn bulk_index(&self, docs: &[IndexDocument]) -> Result<(), IndexError>;
}

/// Elasticsearch over its REST API.
#[derive(Debug, Clone)]
pub struct ElasticsearchIndex {
    client: Client,
    base_url: Url,
    index: String,
}

impl ElasticsearchIndex {
    pub fn new(base_url: &str, index: &str, timeout: Duration) -> Result<Self, IndexError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| IndexError::Unavailable(format!("invalid index URL '{}': {}", base_url, e)))?;
        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            index: index.to_string(),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, IndexError> {
        self.base_url
            .join(path)
            .map_err(|e| IndexError::Unavailable(format!("invalid index path '{}': {}", path, e)))
    }

    async fn check(response: Response) -> Result<Response, IndexError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(IndexError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, IndexError> {
        let url = self.url(&format!("{}/_search", self.index))?;
        let response = self.client.post(url).json(&request.to_query()).send().await?;
        let body: Value = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| IndexError::Malformed(e.to_string()))?;

        let hits = parse_hits(&body)?;
        debug!("Index returned {} hits for '{}'", hits.len(), request.text);
        Ok(hits)
    }

    async fn exists(&self) -> Result<bool, IndexError> {
        let response = self.client.head(self.url(&self.index)?).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => Self::check(response).await.map(|_| true),
        }
    }

    async fn create_index(&self) -> Result<(), IndexError> {
        let response = self
            .client
            .put(self.url(&self.index)?)
            .json(&index_definition())
            .send()
            .await?;
        Self::check(response).await?;
        debug!("Created index '{}'", self.index);
        Ok(())
    }

    async fn delete_index(&self) -> Result<(), IndexError> {
        let response = self.client.delete(self.url(&self.index)?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(response).await?;
        debug!("Deleted index '{}'", self.index);
        Ok(())
    }

    async fn clear(&self) -> Result<(), IndexError> {
        let url = self.url(&format!("{}/_delete_by_query?refresh=true", self.index))?;
        let response = self.client.post(url).json(&match_all()).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn bulk_index(&self, docs: &[IndexDocument]) -> Result<(), IndexError> {
        if docs.is_empty() {
            return Ok(());
        }

        let mut body = String::new();
        for doc in docs {
            let action = json!({ "index": { "_index": self.index, "_id": doc.pk } });
            let source =
                serde_json::to_string(doc).map_err(|e| IndexError::Malformed(e.to_string()))?;
            body.push_str(&action.to_string());
            body.push('\n');
            body.push_str(&source);
            body.push('\n');
        }

        let response = self
            .client
            .post(self.url("_bulk?refresh=true")?)
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?;
        let result: Value = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| IndexError::Malformed(e.to_string()))?;

        if result.get("errors").and_then(Value::as_bool).unwrap_or(false) {
            return Err(IndexError::Malformed(
                "bulk request reported per-document errors".to_string(),
            ));
        }
        debug!("Indexed {} documents into '{}'", docs.len(), self.index);
        Ok(())
    }
}
