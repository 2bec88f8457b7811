//! Testing utilities including mock capability implementations.
//!
//! Deterministic, configurable stand-ins for the three external
//! capabilities, with call recording so tests can assert which stages
//! actually ran (short-circuit behavior, invocation order).

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{AuditError, Result};
use crate::state::{ComplianceIssue, Rule};
use crate::traits::{ClaimReasoner, IngestOutput, IngestionService, RuleRetriever};

/// Record of a call made to one of the mocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    FetchAndExtract { video_url: String, video_id: String },
    Retrieve { query: String, top_k: usize },
    Evaluate { rule_count: usize },
}

/// Shared call log, cloneable across the three mocks so a test can
/// assert on global invocation order.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<RwLock<Vec<MockCall>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: MockCall) {
        self.calls.write().unwrap().push(call);
    }

    /// Snapshot of all recorded calls, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&MockCall) -> bool) -> usize {
        self.calls.read().unwrap().iter().filter(|c| matches(*c)).count()
    }
}

/// Mock ingestion service with a canned output or injected failure.
#[derive(Clone, Default)]
pub struct MockIngestion {
    output: Option<IngestOutput>,
    failure: Option<String>,
    log: CallLog,
}

impl MockIngestion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed with the given transcript and OCR lines.
    pub fn with_content(mut self, transcript: impl Into<String>, ocr_text: Vec<String>) -> Self {
        self.output = Some(IngestOutput {
            local_file_path: Some("/tmp/staged.mp4".to_string()),
            video_metadata: Default::default(),
            transcript: transcript.into(),
            ocr_text,
        });
        self
    }

    pub fn with_output(mut self, output: IngestOutput) -> Self {
        self.output = Some(output);
        self
    }

    /// Fail every call with an `UnsupportedInput`-shaped reason.
    pub fn failing_with(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

#[async_trait]
impl IngestionService for MockIngestion {
    async fn fetch_and_extract(&self, video_url: &str, video_id: &str) -> Result<IngestOutput> {
        self.log.record(MockCall::FetchAndExtract {
            video_url: video_url.to_string(),
            video_id: video_id.to_string(),
        });

        if let Some(reason) = &self.failure {
            return Err(AuditError::UnsupportedInput { url: reason.clone() });
        }
        Ok(self.output.clone().unwrap_or_default())
    }
}

/// Mock rule retriever with canned rules or injected failure.
#[derive(Clone, Default)]
pub struct MockRetriever {
    rules: Vec<Rule>,
    failure: Option<String>,
    log: CallLog,
}

impl MockRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn failing_with(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

#[async_trait]
impl RuleRetriever for MockRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Rule>> {
        self.log.record(MockCall::Retrieve {
            query: query.to_string(),
            top_k,
        });

        if let Some(reason) = &self.failure {
            return Err(AuditError::Upstream(reason.clone().into()));
        }
        Ok(self.rules.clone())
    }
}

/// Mock claim reasoner with canned issues or injected failure.
#[derive(Clone, Default)]
pub struct MockReasoner {
    issues: Vec<ComplianceIssue>,
    failure: Option<String>,
    log: CallLog,
}

impl MockReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issues(mut self, issues: Vec<ComplianceIssue>) -> Self {
        self.issues = issues;
        self
    }

    pub fn failing_with(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

#[async_trait]
impl ClaimReasoner for MockReasoner {
    async fn evaluate(
        &self,
        _transcript: &str,
        _ocr_text: &[String],
        rules: &[Rule],
    ) -> Result<Vec<ComplianceIssue>> {
        self.log.record(MockCall::Evaluate {
            rule_count: rules.len(),
        });

        if let Some(reason) = &self.failure {
            return Err(AuditError::Upstream(reason.clone().into()));
        }
        Ok(self.issues.clone())
    }
}
