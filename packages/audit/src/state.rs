//! The audit state container and its merge engine.
//!
//! One [`AuditState`] value is created per audit invocation and threaded
//! through the four pipeline stages. Stages never mutate it directly;
//! each stage returns a [`StateUpdate`] and the orchestrator folds it in
//! with [`AuditState::merge`], which applies a fixed per-field rule:
//!
//! - **overwrite-once** (`video_url`, `video_id`): set by the caller;
//!   a second write is ignored with a warning.
//! - **last-write-wins** (`local_file_path`, `video_metadata`,
//!   `transcript`, `ocr_text`, `retrieved_rules`, `final_status`,
//!   `final_report`): whole-value replace.
//! - **append-only union** (`compliance_results`, `errors`): concatenated
//!   in stage execution order, never replaced or shrunk.
//!
//! Merge is pure and total: it never fails, so stages stay
//! forward-compatible with fields they do not know about.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Severity of a single compliance finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    Warning,
}

/// Terminal verdict of an audit run.
///
/// Only meaningful after the reporting stage has run; defaults to
/// [`FinalStatus::Unknown`] until then.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalStatus {
    Pass,
    Fail,
    #[default]
    Unknown,
}

/// A single compliance violation found in the video.
///
/// Immutable once created by the reasoning stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    /// Free-text classification, e.g. "Misleading Claims"
    pub category: String,

    pub severity: Severity,

    /// Specific detail of the violation
    pub description: String,

    /// Position in the video where it was found, e.g. "00:32"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ComplianceIssue {
    pub fn new(
        category: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            severity,
            description: description.into(),
            timestamp: None,
        }
    }

    /// Attach the video position the issue was found at.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// A compliance rule fetched from the rule store.
///
/// Read-only downstream of the retrieval stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub text: String,
    pub category: String,
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category: category.into(),
        }
    }
}

/// The canonical record threaded through the pipeline.
///
/// Exactly one instance exists per audit invocation; the orchestrator
/// owns it exclusively for the lifetime of one run and returns it as the
/// terminal state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditState {
    // Input parameters
    pub video_url: String,
    pub video_id: String,

    // Ingestion & extraction data
    pub local_file_path: Option<String>,
    pub video_metadata: HashMap<String, serde_json::Value>,
    pub transcript: Option<String>,
    pub ocr_text: Vec<String>,

    // Analysis output
    pub retrieved_rules: Vec<Rule>,
    pub compliance_results: Vec<ComplianceIssue>,

    // Final deliverables
    pub final_status: FinalStatus,
    pub final_report: String,

    // System observability: appended without halting execution
    pub errors: Vec<String>,
}

impl AuditState {
    /// Create the initial state for one audit invocation.
    pub fn new(video_url: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            video_url: video_url.into(),
            video_id: video_id.into(),
            ..Default::default()
        }
    }

    /// Fold one stage's partial update into the state.
    ///
    /// Pure and total. Fields absent from the update leave the current
    /// value untouched; append-only fields grow monotonically.
    pub fn merge(mut self, update: StateUpdate) -> AuditState {
        // Overwrite-once input fields: ignore a second write.
        if let Some(url) = update.video_url {
            if self.video_url.is_empty() {
                self.video_url = url;
            } else {
                tracing::warn!(field = "video_url", "ignoring second write to input field");
            }
        }
        if let Some(id) = update.video_id {
            if self.video_id.is_empty() {
                self.video_id = id;
            } else {
                tracing::warn!(field = "video_id", "ignoring second write to input field");
            }
        }

        // Last-write-wins fields: whole-value replace.
        if let Some(path) = update.local_file_path {
            self.local_file_path = Some(path);
        }
        if let Some(metadata) = update.video_metadata {
            self.video_metadata = metadata;
        }
        if let Some(transcript) = update.transcript {
            self.transcript = Some(transcript);
        }
        if let Some(ocr_text) = update.ocr_text {
            self.ocr_text = ocr_text;
        }
        if let Some(rules) = update.retrieved_rules {
            self.retrieved_rules = rules;
        }
        if let Some(status) = update.final_status {
            self.final_status = status;
        }
        if let Some(report) = update.final_report {
            self.final_report = report;
        }

        // Append-only union fields.
        self.compliance_results.extend(update.compliance_results);
        self.errors.extend(update.errors);

        self
    }
}

/// A partial update produced by one stage.
///
/// `Option` fields are last-write-wins (absent means "leave unchanged");
/// the two `Vec` fields are append-only.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub video_url: Option<String>,
    pub video_id: Option<String>,
    pub local_file_path: Option<String>,
    pub video_metadata: Option<HashMap<String, serde_json::Value>>,
    pub transcript: Option<String>,
    pub ocr_text: Option<Vec<String>>,
    pub retrieved_rules: Option<Vec<Rule>>,
    pub compliance_results: Vec<ComplianceIssue>,
    pub final_status: Option<FinalStatus>,
    pub final_report: Option<String>,
    pub errors: Vec<String>,
}

impl StateUpdate {
    /// An update that changes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The failure shape every stage uses: record the reason, leave the
    /// rest to stage-appropriate defaults.
    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            errors: vec![reason.into()],
            ..Default::default()
        }
    }

    pub fn with_local_file_path(mut self, path: impl Into<String>) -> Self {
        self.local_file_path = Some(path.into());
        self
    }

    pub fn with_video_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.video_metadata = Some(metadata);
        self
    }

    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = Some(transcript.into());
        self
    }

    pub fn with_ocr_text(mut self, ocr_text: Vec<String>) -> Self {
        self.ocr_text = Some(ocr_text);
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.retrieved_rules = Some(rules);
        self
    }

    pub fn with_issues(mut self, issues: Vec<ComplianceIssue>) -> Self {
        self.compliance_results = issues;
        self
    }

    pub fn with_status(mut self, status: FinalStatus) -> Self {
        self.final_status = Some(status);
        self
    }

    pub fn with_report(mut self, report: impl Into<String>) -> Self {
        self.final_report = Some(report.into());
        self
    }

    pub fn with_error(mut self, reason: impl Into<String>) -> Self {
        self.errors.push(reason.into());
        self
    }

    /// True if this update records at least one error.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_defaults() {
        let state = AuditState::new("https://youtu.be/abc123", "vid_1");
        assert_eq!(state.final_status, FinalStatus::Unknown);
        assert!(state.transcript.is_none());
        assert!(state.ocr_text.is_empty());
        assert!(state.compliance_results.is_empty());
        assert!(state.errors.is_empty());
    }

    #[test]
    fn merge_ignores_second_write_to_input_fields() {
        let state = AuditState::new("https://youtu.be/abc123", "vid_1");
        let update = StateUpdate {
            video_url: Some("https://youtu.be/other".to_string()),
            video_id: Some("vid_2".to_string()),
            ..Default::default()
        };

        let state = state.merge(update);
        assert_eq!(state.video_url, "https://youtu.be/abc123");
        assert_eq!(state.video_id, "vid_1");
    }

    #[test]
    fn merge_last_write_wins_replaces_whole_value() {
        let state = AuditState::new("u", "v")
            .merge(StateUpdate::empty().with_ocr_text(vec!["first".to_string()]));
        let state =
            state.merge(StateUpdate::empty().with_ocr_text(vec!["second".to_string()]));

        assert_eq!(state.ocr_text, vec!["second".to_string()]);
    }

    #[test]
    fn merge_last_write_wins_is_idempotent() {
        let update = StateUpdate::empty()
            .with_transcript("hello world")
            .with_local_file_path("/tmp/vid.mp4");

        let once = AuditState::new("u", "v").merge(update.clone());
        let twice = AuditState::new("u", "v").merge(update.clone()).merge(update);

        assert_eq!(once.transcript, twice.transcript);
        assert_eq!(once.local_file_path, twice.local_file_path);
    }

    #[test]
    fn merge_appends_errors_and_issues() {
        let issue = ComplianceIssue::new("Misleading Claims", Severity::Critical, "guarantee");

        let state = AuditState::new("u", "v")
            .merge(StateUpdate::error("first failure"))
            .merge(
                StateUpdate::empty()
                    .with_issues(vec![issue.clone()])
                    .with_error("second failure"),
            );

        assert_eq!(state.errors, vec!["first failure", "second failure"]);
        assert_eq!(state.compliance_results, vec![issue]);
    }

    #[test]
    fn merge_never_shrinks_append_only_fields() {
        let issue = ComplianceIssue::new("Cat", Severity::Warning, "desc");
        let mut state = AuditState::new("u", "v")
            .merge(StateUpdate::empty().with_issues(vec![issue]).with_error("e1"));

        // An empty update (the failure shape of a later stage) must not
        // clear what is already recorded.
        let before_issues = state.compliance_results.len();
        let before_errors = state.errors.len();
        state = state.merge(StateUpdate::empty());

        assert_eq!(state.compliance_results.len(), before_issues);
        assert_eq!(state.errors.len(), before_errors);
    }

    #[test]
    fn empty_append_is_a_no_op() {
        let state = AuditState::new("u", "v").merge(StateUpdate::empty().with_issues(vec![]));
        assert!(state.compliance_results.is_empty());
    }

    #[test]
    fn severity_serializes_screaming_snake() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
        let json = serde_json::to_string(&FinalStatus::Pass).unwrap();
        assert_eq!(json, "\"PASS\"");
    }
}
