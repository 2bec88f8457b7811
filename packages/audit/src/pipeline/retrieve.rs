//! Retrieval stage: extracted text → applicable compliance rules.

use async_trait::async_trait;

use crate::pipeline::Stage;
use crate::state::{AuditState, StateUpdate};
use crate::traits::RuleRetriever;

/// Default number of rules requested from the rule store.
pub const DEFAULT_TOP_K: usize = 5;

/// Retrieval queries are built from extracted content, which can be
/// arbitrarily long; cap what we send to the rule store.
const MAX_QUERY_CHARS: usize = 2000;

/// Build the rule-store query from transcript and on-screen text.
pub fn build_rule_query(transcript: &str, ocr_text: &[String]) -> String {
    let mut query = String::with_capacity(transcript.len().min(MAX_QUERY_CHARS));
    query.push_str(transcript.trim());
    for line in ocr_text {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !query.is_empty() {
            query.push('\n');
        }
        query.push_str(line);
    }

    if query.len() > MAX_QUERY_CHARS {
        // Truncate on a char boundary.
        let mut cut = MAX_QUERY_CHARS;
        while !query.is_char_boundary(cut) {
            cut -= 1;
        }
        query.truncate(cut);
    }
    query
}

/// Wraps the [`RuleRetriever`] capability.
pub struct RetrieveStage<R> {
    retriever: R,
    top_k: usize,
}

impl<R: RuleRetriever> RetrieveStage<R> {
    pub fn new(retriever: R) -> Self {
        Self {
            retriever,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

#[async_trait]
impl<R: RuleRetriever> Stage for RetrieveStage<R> {
    fn name(&self) -> &'static str {
        "retrieve"
    }

    async fn run(&self, state: &AuditState) -> StateUpdate {
        let query = build_rule_query(state.transcript.as_deref().unwrap_or(""), &state.ocr_text);

        match self.retriever.retrieve(&query, self.top_k).await {
            Ok(rules) => {
                tracing::info!(rules = rules.len(), "rules retrieved");
                StateUpdate::empty().with_rules(rules)
            }
            Err(e) => StateUpdate::error(e.to_string()).with_rules(Vec::new()),
        }
    }
}
