//! Reasoning stage: extracted content × rules → compliance issues.

use async_trait::async_trait;

use crate::pipeline::Stage;
use crate::state::{AuditState, StateUpdate};
use crate::traits::ClaimReasoner;

/// Wraps the [`ClaimReasoner`] capability.
///
/// A failed call appends one error and an empty issue list — a no-op
/// under the append-only merge rule, so earlier findings survive.
pub struct ReasonStage<C> {
    reasoner: C,
}

impl<C: ClaimReasoner> ReasonStage<C> {
    pub fn new(reasoner: C) -> Self {
        Self { reasoner }
    }
}

#[async_trait]
impl<C: ClaimReasoner> Stage for ReasonStage<C> {
    fn name(&self) -> &'static str {
        "reason"
    }

    async fn run(&self, state: &AuditState) -> StateUpdate {
        let transcript = state.transcript.as_deref().unwrap_or("");

        match self
            .reasoner
            .evaluate(transcript, &state.ocr_text, &state.retrieved_rules)
            .await
        {
            Ok(issues) => {
                tracing::info!(issues = issues.len(), "claims evaluated");
                StateUpdate::empty().with_issues(issues)
            }
            Err(e) => StateUpdate::error(e.to_string()).with_issues(Vec::new()),
        }
    }
}
