//! End-to-end pipeline tests against mock capabilities.
//!
//! Cover the partial-failure policy (short-circuit, degraded
//! continuation), state monotonicity, and the terminal verdicts for
//! clean, violating, and failed runs.

use audit::testing::{CallLog, MockCall, MockIngestion, MockReasoner, MockRetriever};
use audit::{ComplianceIssue, FinalStatus, Pipeline, Rule, Severity};

fn sample_rules() -> Vec<Rule> {
    vec![
        Rule::new("R-1", "No absolute guarantees.", "Misleading Claims"),
        Rule::new("R-2", "Disclose paid partnerships.", "Disclosure"),
    ]
}

fn guarantee_issue() -> ComplianceIssue {
    ComplianceIssue::new(
        "Misleading Claims",
        Severity::Critical,
        "Absolute guarantee at 00:32",
    )
    .with_timestamp("00:32")
}

fn wired_pipeline(
    ingestion: MockIngestion,
    retriever: MockRetriever,
    reasoner: MockReasoner,
) -> (Pipeline<MockIngestion, MockRetriever, MockReasoner>, CallLog) {
    let log = CallLog::new();
    let pipeline = Pipeline::new(
        ingestion.with_log(log.clone()),
        retriever.with_log(log.clone()),
        reasoner.with_log(log.clone()),
    );
    (pipeline, log)
}

#[tokio::test]
async fn clean_run_passes() {
    let (pipeline, _log) = wired_pipeline(
        MockIngestion::new().with_content("We love our customers.", vec![]),
        MockRetriever::new().with_rules(sample_rules()),
        MockReasoner::new().with_issues(vec![]),
    );

    let state = pipeline.run_audit("https://youtu.be/abc123", "vid_1").await;

    assert_eq!(state.final_status, FinalStatus::Pass);
    assert!(state.errors.is_empty());
    assert!(state.compliance_results.is_empty());
    assert!(state.final_report.contains("No violations found"));
}

#[tokio::test]
async fn critical_violation_fails_and_is_reported() {
    let (pipeline, _log) = wired_pipeline(
        MockIngestion::new().with_content("100% guaranteed!", vec!["BUY NOW".to_string()]),
        MockRetriever::new().with_rules(sample_rules()),
        MockReasoner::new().with_issues(vec![guarantee_issue()]),
    );

    let state = pipeline.run_audit("https://youtu.be/abc123", "vid_1").await;

    assert_eq!(state.final_status, FinalStatus::Fail);
    assert!(state.errors.is_empty());
    assert_eq!(state.compliance_results.len(), 1);
    assert!(state.final_report.contains("Misleading Claims"));
    assert!(state.final_report.contains("Absolute guarantee at 00:32"));
}

#[tokio::test]
async fn failed_ingestion_short_circuits_to_reporting() {
    let (pipeline, log) = wired_pipeline(
        MockIngestion::new().failing_with("not-a-video-url"),
        MockRetriever::new().with_rules(sample_rules()),
        MockReasoner::new().with_issues(vec![guarantee_issue()]),
    );

    let state = pipeline.run_audit("not-a-video-url", "vid_1").await;

    assert_eq!(state.final_status, FinalStatus::Fail);
    assert_eq!(state.errors, vec!["unsupported input: not-a-video-url".to_string()]);
    assert_eq!(state.transcript.as_deref(), Some(""));
    assert!(state.ocr_text.is_empty());
    assert!(state.compliance_results.is_empty());

    // Retrieval and reasoning were never invoked.
    assert_eq!(log.count(|c| matches!(c, MockCall::Retrieve { .. })), 0);
    assert_eq!(log.count(|c| matches!(c, MockCall::Evaluate { .. })), 0);
}

#[tokio::test]
async fn failed_retrieval_still_reasons_against_empty_rules() {
    let (pipeline, log) = wired_pipeline(
        MockIngestion::new().with_content("Some claim.", vec![]),
        MockRetriever::new().failing_with("rule store unreachable"),
        MockReasoner::new().with_issues(vec![]),
    );

    let state = pipeline.run_audit("https://youtu.be/abc123", "vid_1").await;

    assert_eq!(state.final_status, FinalStatus::Fail);
    assert_eq!(state.errors.len(), 1);
    assert!(state.retrieved_rules.is_empty());

    // Reasoning ran, and saw the empty rule set.
    let calls = log.calls();
    assert!(calls.contains(&MockCall::Evaluate { rule_count: 0 }));
}

#[tokio::test]
async fn failed_reasoning_still_reports_partial_outcome() {
    let (pipeline, _log) = wired_pipeline(
        MockIngestion::new().with_content("Some claim.", vec![]),
        MockRetriever::new().with_rules(sample_rules()),
        MockReasoner::new().failing_with("model unavailable"),
    );

    let state = pipeline.run_audit("https://youtu.be/abc123", "vid_1").await;

    assert_eq!(state.final_status, FinalStatus::Fail);
    assert_eq!(state.errors.len(), 1);
    assert!(state.compliance_results.is_empty());
    assert!(state.final_report.contains("Could not complete analysis"));
    assert!(state.final_report.contains("model unavailable"));
}

#[tokio::test]
async fn stages_run_in_fixed_order() {
    let (pipeline, log) = wired_pipeline(
        MockIngestion::new().with_content("claim", vec!["text".to_string()]),
        MockRetriever::new().with_rules(sample_rules()),
        MockReasoner::new().with_issues(vec![]),
    );

    pipeline.run_audit("https://youtu.be/abc123", "vid_1").await;

    let calls = log.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[0], MockCall::FetchAndExtract { .. }));
    assert!(matches!(calls[1], MockCall::Retrieve { .. }));
    assert!(matches!(calls[2], MockCall::Evaluate { rule_count: 2 }));
}

#[tokio::test]
async fn retrieval_query_carries_transcript_and_ocr() {
    let (pipeline, log) = wired_pipeline(
        MockIngestion::new()
            .with_content("Spoken claim.", vec!["ON-SCREEN OFFER".to_string()]),
        MockRetriever::new().with_rules(vec![]),
        MockReasoner::new().with_issues(vec![]),
    );

    pipeline.run_audit("https://youtu.be/abc123", "vid_1").await;

    let query = log
        .calls()
        .into_iter()
        .find_map(|c| match c {
            MockCall::Retrieve { query, .. } => Some(query),
            _ => None,
        })
        .expect("retrieval was invoked");

    assert!(query.contains("Spoken claim."));
    assert!(query.contains("ON-SCREEN OFFER"));
}

#[tokio::test]
async fn errors_and_findings_never_shrink_across_stages() {
    // Both retrieval and reasoning fail; each must add to (never
    // replace) the accumulated errors.
    let (pipeline, _log) = wired_pipeline(
        MockIngestion::new().with_content("claim", vec![]),
        MockRetriever::new().failing_with("retrieval down"),
        MockReasoner::new().failing_with("reasoner down"),
    );

    let state = pipeline.run_audit("https://youtu.be/abc123", "vid_1").await;

    assert_eq!(state.errors.len(), 2);
    assert!(state.errors[0].contains("retrieval down"));
    assert!(state.errors[1].contains("reasoner down"));
    assert_eq!(state.final_status, FinalStatus::Fail);
}

#[tokio::test]
async fn input_fields_survive_the_whole_run() {
    let (pipeline, _log) = wired_pipeline(
        MockIngestion::new().with_content("claim", vec![]),
        MockRetriever::new().with_rules(vec![]),
        MockReasoner::new().with_issues(vec![]),
    );

    let state = pipeline.run_audit("https://youtu.be/abc123", "vid_42").await;

    assert_eq!(state.video_url, "https://youtu.be/abc123");
    assert_eq!(state.video_id, "vid_42");
}
