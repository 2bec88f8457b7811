//! Ingestion capability: turn a video URL into machine-readable signals.
//!
//! Implementations own the whole download → upload → poll → extract
//! sequence against an indexing backend. The pipeline only sees the
//! final [`IngestOutput`] (or an error); the bounded waiting for the
//! backend happens inside the implementation, typically through
//! [`crate::poll::await_completion`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Everything the indexing backend extracted from one video.
#[derive(Debug, Clone, Default)]
pub struct IngestOutput {
    /// Where the video was staged locally during processing.
    ///
    /// The file itself is deleted before the ingestion call returns;
    /// the path is kept for audit traceability only.
    pub local_file_path: Option<String>,

    /// Backend-reported metadata, e.g. `{"duration": 15, "resolution": "1080p"}`
    pub video_metadata: HashMap<String, serde_json::Value>,

    /// Full speech transcript
    pub transcript: String,

    /// On-screen text lines, in order of appearance
    pub ocr_text: Vec<String>,
}

/// Ingestion service capability.
///
/// Must release any locally staged file on every exit path, success or
/// failure.
#[async_trait]
pub trait IngestionService: Send + Sync {
    /// Download the video, index it, and extract transcript/OCR/metadata.
    async fn fetch_and_extract(&self, video_url: &str, video_id: &str) -> Result<IngestOutput>;
}

#[async_trait]
impl<T: IngestionService + ?Sized> IngestionService for Arc<T> {
    async fn fetch_and_extract(&self, video_url: &str, video_id: &str) -> Result<IngestOutput> {
        (**self).fetch_and_extract(video_url, video_id).await
    }
}
