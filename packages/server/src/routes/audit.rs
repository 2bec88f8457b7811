//! The main audit endpoint.

use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use audit::{ComplianceIssue, FinalStatus};

use crate::app::AppState;

#[derive(Deserialize)]
pub struct AuditRequest {
    pub video_url: String,
}

#[derive(Serialize)]
pub struct AuditResponse {
    pub session_id: String,
    pub video_id: String,
    pub status: FinalStatus,
    pub final_report: String,
    pub compliance_results: Vec<ComplianceIssue>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Run a full compliance audit for one video URL.
///
/// Expected per-stage failures come back as a normal 200 response with
/// `status = FAIL` and the reasons inside `final_report`; only a defect
/// in the pipeline itself (a panicked run) maps to a 500 with the
/// reason in `detail`.
pub async fn audit_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<AuditRequest>,
) -> Result<Json<AuditResponse>, (StatusCode, Json<ErrorBody>)> {
    if request.video_url.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                detail: "video_url must not be empty".to_string(),
            }),
        ));
    }

    let session_id = Uuid::new_v4().to_string();
    let video_id = format!("vid_{}", &session_id[..8]);

    tracing::info!(video_url = %request.video_url, session_id = %session_id, "audit request received");

    // Run on a separate task so a panicked run surfaces as a JoinError
    // instead of tearing down the connection handler.
    let pipeline = state.pipeline.clone();
    let video_url = request.video_url.clone();
    let task_video_id = video_id.clone();
    let run = tokio::spawn(async move { pipeline.run_audit(video_url, task_video_id).await });

    match run.await {
        Ok(terminal) => Ok(Json(AuditResponse {
            session_id,
            video_id: terminal.video_id,
            status: terminal.final_status,
            final_report: terminal.final_report,
            compliance_results: terminal.compliance_results,
        })),
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "audit execution failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    detail: format!("audit execution failed: {e}"),
                }),
            ))
        }
    }
}
