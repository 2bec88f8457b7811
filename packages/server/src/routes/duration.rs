//! Pre-audit duration check.
//!
//! Lets the frontend reject over-long videos before paying for a full
//! indexing round trip.

use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::routes::audit::ErrorBody;

#[derive(Deserialize)]
pub struct DurationRequest {
    pub video_url: String,
}

#[derive(Serialize)]
pub struct DurationResponse {
    pub duration: f64,
    pub max_duration: f64,
    pub allowed: bool,
}

pub async fn check_duration_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<DurationRequest>,
) -> Result<Json<DurationResponse>, (StatusCode, Json<ErrorBody>)> {
    match state.indexer.probe_duration(&request.video_url).await {
        Ok(duration) => {
            tracing::info!(
                duration,
                max = state.max_video_duration_secs,
                "duration check"
            );
            Ok(Json(DurationResponse {
                duration,
                max_duration: state.max_video_duration_secs,
                allowed: duration <= state.max_video_duration_secs,
            }))
        }
        Err(e) => {
            tracing::warn!(video_url = %request.video_url, error = %e, "duration check failed");
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    detail: format!("Could not fetch video info: {e}"),
                }),
            ))
        }
    }
}
