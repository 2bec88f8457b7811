//! Pipeline orchestration: fixed stage sequence, merge semantics,
//! partial-failure policy.
//!
//! The orchestrator owns one [`AuditState`] per run and executes the
//! fixed sequence ingest → retrieve → reason → report, folding each
//! stage's [`StateUpdate`] in with [`AuditState::merge`]. Expected
//! failures never escape: every stage is total, converting capability
//! errors into `errors` appends, and the reporting stage turns whatever
//! accumulated into a terminal verdict. The only escape hatch left is a
//! panic, which signals a defect in the orchestrator itself.
//!
//! Partial-failure policy:
//! - ingest fails → nothing to audit; skip straight to reporting
//! - retrieve fails → reason still runs (against an empty rule set),
//!   then reporting
//! - reason fails → reporting still runs with whatever was accumulated

use async_trait::async_trait;

use crate::state::{AuditState, StateUpdate};
use crate::traits::{ClaimReasoner, IngestionService, RuleRetriever};

mod ingest;
mod reason;
pub mod report;
mod retrieve;

pub use ingest::IngestStage;
pub use reason::ReasonStage;
pub use report::ReportStage;
pub use retrieve::{build_rule_query, RetrieveStage, DEFAULT_TOP_K};

/// One pipeline step.
///
/// `run` is total: implementations catch every capability failure and
/// fold it into the returned update's `errors`, so the orchestrator's
/// merge logic stays failure-agnostic.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, state: &AuditState) -> StateUpdate;
}

/// The audit pipeline, generic over its three external capabilities.
///
/// Performs no I/O of its own; all side effects live behind the
/// capability seams. One `Pipeline` value serves any number of
/// concurrent runs — each run owns its own `AuditState`.
pub struct Pipeline<I, R, C> {
    ingest: IngestStage<I>,
    retrieve: RetrieveStage<R>,
    reason: ReasonStage<C>,
    report: ReportStage,
}

impl<I, R, C> Pipeline<I, R, C>
where
    I: IngestionService,
    R: RuleRetriever,
    C: ClaimReasoner,
{
    pub fn new(ingestion: I, retriever: R, reasoner: C) -> Self {
        Self {
            ingest: IngestStage::new(ingestion),
            retrieve: RetrieveStage::new(retriever),
            reason: ReasonStage::new(reasoner),
            report: ReportStage,
        }
    }

    /// Set how many rules the retrieval stage asks for.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.retrieve = self.retrieve.with_top_k(top_k);
        self
    }

    /// Convenience entry point: build the initial state and run.
    pub async fn run_audit(
        &self,
        video_url: impl Into<String>,
        video_id: impl Into<String>,
    ) -> AuditState {
        self.run(AuditState::new(video_url, video_id)).await
    }

    /// Execute the full pipeline against one state and return the
    /// terminal state. Infallible for expected failures.
    pub async fn run(&self, initial: AuditState) -> AuditState {
        let mut state = initial;
        tracing::info!(video_url = %state.video_url, video_id = %state.video_id, "audit started");

        let update = self.step(&self.ingest, &state).await;
        let ingest_failed = update.has_errors();
        state = state.merge(update);

        if ingest_failed {
            // Nothing was extracted, so there is nothing to audit.
            tracing::warn!("ingestion failed, skipping retrieval and reasoning");
        } else {
            let update = self.step(&self.retrieve, &state).await;
            state = state.merge(update);

            let update = self.step(&self.reason, &state).await;
            state = state.merge(update);
        }

        let update = self.step(&self.report, &state).await;
        state = state.merge(update);

        tracing::info!(
            status = ?state.final_status,
            issues = state.compliance_results.len(),
            errors = state.errors.len(),
            "audit finished"
        );
        state
    }

    async fn step(&self, stage: &dyn Stage, state: &AuditState) -> StateUpdate {
        tracing::info!(stage = stage.name(), "stage started");
        let update = stage.run(state).await;
        if update.has_errors() {
            tracing::warn!(stage = stage.name(), errors = ?update.errors, "stage recorded errors");
        } else {
            tracing::info!(stage = stage.name(), "stage complete");
        }
        update
    }
}
