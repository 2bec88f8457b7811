//! Rule retrieval capability.
//!
//! Abstracts over the rule store (vector search, keyword search, or a
//! hybrid of both). The retrieval stage builds a query from the
//! extracted transcript and on-screen text and asks for the top-K
//! applicable rules.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::state::Rule;

/// Rule retriever capability.
#[async_trait]
pub trait RuleRetriever: Send + Sync {
    /// Fetch the `top_k` rules most applicable to the query text.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Rule>>;
}

#[async_trait]
impl<T: RuleRetriever + ?Sized> RuleRetriever for Arc<T> {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Rule>> {
        (**self).retrieve(query, top_k).await
    }
}
