//! Ingestion stage: video URL → transcript, on-screen text, metadata.

use async_trait::async_trait;

use crate::pipeline::Stage;
use crate::state::{AuditState, StateUpdate};
use crate::traits::IngestionService;

/// Wraps the [`IngestionService`] capability.
///
/// On failure (download error, unsupported URL, processing timeout,
/// extraction error) the update carries the reason plus empty
/// transcript/OCR so downstream stages and the report see a consistent
/// "nothing extracted" shape. Staged-file cleanup is the capability's
/// responsibility and holds on every exit path.
pub struct IngestStage<I> {
    ingestion: I,
}

impl<I: IngestionService> IngestStage<I> {
    pub fn new(ingestion: I) -> Self {
        Self { ingestion }
    }
}

#[async_trait]
impl<I: IngestionService> Stage for IngestStage<I> {
    fn name(&self) -> &'static str {
        "ingest"
    }

    async fn run(&self, state: &AuditState) -> StateUpdate {
        match self
            .ingestion
            .fetch_and_extract(&state.video_url, &state.video_id)
            .await
        {
            Ok(output) => {
                let mut update = StateUpdate::empty()
                    .with_video_metadata(output.video_metadata)
                    .with_transcript(output.transcript)
                    .with_ocr_text(output.ocr_text);
                if let Some(path) = output.local_file_path {
                    update = update.with_local_file_path(path);
                }
                update
            }
            Err(e) => StateUpdate::error(e.to_string())
                .with_transcript("")
                .with_ocr_text(Vec::new()),
        }
    }
}
