//! Wikipedia-backed [`KnowledgeSource`].
//!
//! Uses the REST summary endpoint for lookups and the opensearch API for
//! suggestions when the exact title is missing or ambiguous.

use async_trait::async_trait;
use parley_core::error::RetrievalError;
use parley_core::retrieval::{KnowledgeOutcome, KnowledgeSource};
use serde::Deserialize;
use std::time::Duration;

pub struct WikipediaSource {
    client: reqwest::Client,
    base_url: String,
    max_candidates: usize,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    extract: String,
}

impl WikipediaSource {
    /// A source for the given language edition (e.g. "en").
    pub fn new(language: &str, max_candidates: usize) -> Result<Self, RetrievalError> {
        Self::with_base_url(format!("https://{language}.wikipedia.org"), max_candidates)
    }

    pub fn with_base_url(base_url: impl Into<String>, max_candidates: usize) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("parley/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RetrievalError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_candidates,
        })
    }

    fn summary_url(&self, title: &str) -> String {
        let title = title.trim().replace(' ', "_");
        format!(
            "{}/api/rest_v1/page/summary/{}",
            self.base_url,
            urlencoding::encode(&title)
        )
    }

    fn search_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}/w/api.php?action=opensearch&format=json&limit={limit}&search={}",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    /// `None` when the page does not exist.
    async fn summary(&self, title: &str) -> Result<Option<SummaryResponse>, RetrievalError> {
        let response = self
            .client
            .get(self.summary_url(title))
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RetrievalError::QueryFailed(format!(
                "summary request returned {status}"
            )));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| RetrievalError::QueryFailed(format!("unreadable summary: {e}")))
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, RetrievalError> {
        let response = self
            .client
            .get(self.search_url(query, limit))
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RetrievalError::QueryFailed(format!(
                "search request returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RetrievalError::QueryFailed(format!("unreadable search result: {e}")))?;
        Ok(parse_opensearch(&body))
    }

    async fn outcome_for(
        &self,
        query: &str,
        page: SummaryResponse,
    ) -> Result<KnowledgeOutcome, RetrievalError> {
        if page.kind == "disambiguation" {
            let candidates = self
                .search(query, self.max_candidates + 1)
                .await?
                .into_iter()
                .filter(|title| title != &page.title)
                .take(self.max_candidates)
                .collect();
            return Ok(KnowledgeOutcome::Ambiguous { candidates });
        }

        if page.extract.trim().is_empty() {
            return Ok(KnowledgeOutcome::NotFound);
        }

        Ok(KnowledgeOutcome::Found {
            title: page.title,
            summary: page.extract,
        })
    }
}

/// Titles from an opensearch response: `[query, [titles], [descriptions], [urls]]`.
fn parse_opensearch(body: &serde_json::Value) -> Vec<String> {
    body.get(1)
        .and_then(|titles| titles.as_array())
        .map(|titles| {
            titles
                .iter()
                .filter_map(|t| t.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl KnowledgeSource for WikipediaSource {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn lookup(&self, query: &str) -> Result<KnowledgeOutcome, RetrievalError> {
        if let Some(page) = self.summary(query).await? {
            return self.outcome_for(query, page).await;
        }

        // No exact title: follow the best search suggestion once
        let suggestion = self.search(query, 1).await?.into_iter().next();
        match suggestion {
            Some(title) => {
                tracing::debug!(query, suggestion = %title, "Following search suggestion");
                match self.summary(&title).await? {
                    Some(page) => self.outcome_for(&title, page).await,
                    None => Ok(KnowledgeOutcome::NotFound),
                }
            }
            None => Ok(KnowledgeOutcome::NotFound),
        }
    }
}
