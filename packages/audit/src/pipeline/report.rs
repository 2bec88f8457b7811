//! Reporting stage: accumulated findings → terminal verdict and report.
//!
//! Pure: no external calls, no I/O, never fails. Given identical
//! findings and errors it produces identical output.

use async_trait::async_trait;

use crate::pipeline::Stage;
use crate::state::{AuditState, ComplianceIssue, FinalStatus, Severity, StateUpdate};

/// Compute the terminal verdict.
///
/// Policy: any recorded issue fails the audit, WARNING-only included;
/// severity affects report wording, not the pass/fail boundary. A run
/// with errors and no findings also fails, since the analysis did not
/// complete. Only a clean, finding-free run passes.
pub fn final_status_for(issues: &[ComplianceIssue], errors: &[String]) -> FinalStatus {
    if !issues.is_empty() || !errors.is_empty() {
        FinalStatus::Fail
    } else {
        FinalStatus::Pass
    }
}

/// Render the textual summary for the caller.
pub fn render_report(
    status: FinalStatus,
    issues: &[ComplianceIssue],
    errors: &[String],
) -> String {
    let mut report = String::new();
    report.push_str("Brand Compliance Audit\n");
    report.push_str(&format!("Status: {}\n", status_label(status)));

    if issues.is_empty() && errors.is_empty() {
        report.push_str("\nNo violations found.\n");
        return report;
    }

    if !issues.is_empty() {
        report.push_str(&format!("\nViolations ({}):\n", issues.len()));
        for issue in issues {
            report.push_str(&format!(
                "  [{}] {}: {}",
                severity_label(issue.severity),
                issue.category,
                issue.description
            ));
            if let Some(ts) = &issue.timestamp {
                report.push_str(&format!(" (at {ts})"));
            }
            report.push('\n');
        }
    } else {
        report.push_str("\nCould not complete analysis; no findings were produced.\n");
    }

    if !errors.is_empty() {
        report.push_str(&format!("\nProcessing errors ({}):\n", errors.len()));
        for error in errors {
            report.push_str(&format!("  - {error}\n"));
        }
    }

    report
}

fn status_label(status: FinalStatus) -> &'static str {
    match status {
        FinalStatus::Pass => "PASS",
        FinalStatus::Fail => "FAIL",
        FinalStatus::Unknown => "UNKNOWN",
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "CRITICAL",
        Severity::Warning => "WARNING",
    }
}

/// The reporting stage. Reads only `compliance_results` and `errors`.
pub struct ReportStage;

#[async_trait]
impl Stage for ReportStage {
    fn name(&self) -> &'static str {
        "report"
    }

    async fn run(&self, state: &AuditState) -> StateUpdate {
        let status = final_status_for(&state.compliance_results, &state.errors);
        let report = render_report(status, &state.compliance_results, &state.errors);

        StateUpdate::empty().with_status(status).with_report(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn critical_issue() -> ComplianceIssue {
        ComplianceIssue::new(
            "Misleading Claims",
            Severity::Critical,
            "Absolute guarantee at 00:32",
        )
        .with_timestamp("00:32")
    }

    #[test]
    fn clean_run_passes() {
        assert_eq!(final_status_for(&[], &[]), FinalStatus::Pass);
        let report = render_report(FinalStatus::Pass, &[], &[]);
        assert!(report.contains("Status: PASS"));
        assert!(report.contains("No violations found"));
    }

    #[test]
    fn critical_issue_fails_and_is_named_in_report() {
        let issues = vec![critical_issue()];
        let status = final_status_for(&issues, &[]);
        assert_eq!(status, FinalStatus::Fail);

        let report = render_report(status, &issues, &[]);
        assert!(report.contains("Status: FAIL"));
        assert!(report.contains("Misleading Claims"));
        assert!(report.contains("Absolute guarantee at 00:32"));
        assert!(report.contains("CRITICAL"));
    }

    #[test]
    fn warning_only_still_fails() {
        let issues = vec![ComplianceIssue::new(
            "Tone",
            Severity::Warning,
            "Informal phrasing",
        )];
        assert_eq!(final_status_for(&issues, &[]), FinalStatus::Fail);
    }

    #[test]
    fn errors_without_findings_fail_with_explanation() {
        let errors = vec!["processing timed out after 60s".to_string()];
        let status = final_status_for(&[], &errors);
        assert_eq!(status, FinalStatus::Fail);

        let report = render_report(status, &[], &errors);
        assert!(report.contains("Could not complete analysis"));
        assert!(report.contains("processing timed out after 60s"));
    }

    #[test]
    fn report_is_deterministic() {
        let issues = vec![critical_issue()];
        let errors = vec!["rule store unreachable".to_string()];
        let a = render_report(FinalStatus::Fail, &issues, &errors);
        let b = render_report(FinalStatus::Fail, &issues, &errors);
        assert_eq!(a, b);
    }
}
