//! Rule search service client.
//!
//! Implements [`RuleRetriever`] against an HTTP search backend holding
//! the brand compliance rulebook (hybrid vector + keyword index). One
//! blocking request per retrieval; failures surface to the stage as a
//! single recorded error.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};
use crate::state::Rule;
use crate::traits::RuleRetriever;

/// HTTP client for the rule search service.
#[derive(Clone)]
pub struct SearchRetriever {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SearchRetriever {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RuleHit>,
}

#[derive(Deserialize)]
struct RuleHit {
    id: String,
    #[serde(alias = "content")]
    text: String,
    #[serde(default)]
    category: String,
}

#[async_trait]
impl RuleRetriever for SearchRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Rule>> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("api-key", &self.api_key)
            .json(&SearchRequest { query, top_k })
            .send()
            .await
            .map_err(|e| AuditError::Upstream(Box::new(e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuditError::Upstream(
                format!("rule search failed with status {status}: {body}").into(),
            ));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AuditError::Upstream(Box::new(e)))?;

        let rules = parsed
            .results
            .into_iter()
            .map(|hit| Rule::new(hit.id, hit.text, hit.category))
            .collect::<Vec<_>>();

        tracing::debug!(rules = rules.len(), "rule search returned");
        Ok(rules)
    }
}
