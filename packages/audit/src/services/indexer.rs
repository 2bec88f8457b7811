//! Video indexer backend client.
//!
//! Implements [`IngestionService`] against an HTTP indexing backend:
//! download the source video to a staging path, upload it for indexing,
//! wait for processing through the long-poll supervisor, then pull the
//! transcript, on-screen text and metadata out of the insights payload.
//!
//! Only recognized video-platform URLs are accepted; anything else is
//! rejected up front as [`AuditError::UnsupportedInput`] before any
//! bytes move.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{AuditError, Result};
use crate::poll::await_completion;
use crate::staging::StagedFile;
use crate::traits::{IngestOutput, IngestionService};

/// Hosts the ingestion service will download from.
const SUPPORTED_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com", "youtu.be"];

/// HTTP client for the video indexing backend.
#[derive(Clone)]
pub struct IndexerClient {
    client: Client,
    base_url: String,
    api_key: String,
    staging_dir: PathBuf,
    poll_timeout: Duration,
    poll_interval: Duration,
}

impl IndexerClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            staging_dir: std::env::temp_dir(),
            poll_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(5),
        }
    }

    /// Set where downloads are staged (default: the system temp dir).
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Set the processing poll timeout (default: 5 minutes).
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Set the interval between processing polls (default: 5 seconds).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Ask the backend for the video's duration without running a full
    /// ingest. Used by the pre-audit duration check.
    pub async fn probe_duration(&self, video_url: &str) -> Result<f64> {
        let url = supported_video_url(video_url)?;

        let response = self
            .client
            .get(format!("{}/probe", self.base_url))
            .query(&[("url", url.as_str())])
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| AuditError::Upstream(Box::new(e)))?;

        if !response.status().is_success() {
            return Err(upstream_status("probe", response).await);
        }

        let probe: ProbeResponse = response
            .json()
            .await
            .map_err(|e| AuditError::Upstream(Box::new(e)))?;
        Ok(probe.duration_seconds)
    }

    /// Download the video to the staging dir.
    async fn download(&self, url: &Url, video_id: &str) -> Result<StagedFile> {
        let response = self
            .client
            .get(format!("{}/download", self.base_url))
            .query(&[("url", url.as_str())])
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| AuditError::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuditError::Download(format!(
                "download failed with status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AuditError::Download(e.to_string()))?;

        let path = self.staging_dir.join(format!("{video_id}.mp4"));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| AuditError::Download(format!("staging write failed: {e}")))?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "video staged");
        Ok(StagedFile::claim(path))
    }

    /// Upload the staged file for indexing. Returns the backend's job id.
    async fn upload(&self, path: &Path, video_id: &str) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AuditError::Upstream(Box::new(e)))?;

        let response = self
            .client
            .post(format!("{}/videos", self.base_url))
            .query(&[("name", video_id)])
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AuditError::Upstream(Box::new(e)))?;

        if !response.status().is_success() {
            return Err(upstream_status("upload", response).await);
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| AuditError::Upstream(Box::new(e)))?;

        tracing::info!(indexer_id = %upload.id, "upload accepted");
        Ok(upload.id)
    }

    /// Wait until the backend reports a terminal processing state.
    async fn wait_for_processing(&self, indexer_id: &str) -> Result<IndexStatus> {
        let status = await_completion(
            || self.fetch_index(indexer_id),
            |status: &IndexStatus| status.state == "Processed" || status.state == "Failed",
            self.poll_timeout,
            self.poll_interval,
        )
        .await?;

        if status.state == "Failed" {
            return Err(AuditError::Extraction(format!(
                "indexer reported processing failure for {indexer_id}"
            )));
        }
        Ok(status)
    }

    async fn fetch_index(&self, indexer_id: &str) -> std::result::Result<IndexStatus, reqwest::Error> {
        self.client
            .get(format!("{}/videos/{}/index", self.base_url, indexer_id))
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl IngestionService for IndexerClient {
    async fn fetch_and_extract(&self, video_url: &str, video_id: &str) -> Result<IngestOutput> {
        let url = supported_video_url(video_url)?;

        let staged = self.download(&url, video_id).await?;
        let staged_path = staged.path().display().to_string();

        let indexer_id = self.upload(staged.path(), video_id).await?;

        // The backend now has its own copy; release the staged file
        // before the long wait. If anything above bailed early, the
        // guard's drop has already removed it.
        drop(staged);

        let status = self.wait_for_processing(&indexer_id).await?;
        let mut output = extract_output(status)?;
        output.local_file_path = Some(staged_path);

        tracing::info!(
            video_id,
            transcript_chars = output.transcript.len(),
            ocr_lines = output.ocr_text.len(),
            "extraction complete"
        );
        Ok(output)
    }
}

/// Validate that the URL points at a supported video platform.
fn supported_video_url(video_url: &str) -> Result<Url> {
    let unsupported = || AuditError::UnsupportedInput {
        url: video_url.to_string(),
    };

    let url = Url::parse(video_url).map_err(|_| unsupported())?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(unsupported());
    }
    match url.host_str() {
        Some(host) if SUPPORTED_HOSTS.contains(&host) => Ok(url),
        _ => Err(unsupported()),
    }
}

/// Flatten the insights payload into the pipeline's shape.
fn extract_output(status: IndexStatus) -> Result<IngestOutput> {
    let video = status
        .videos
        .into_iter()
        .next()
        .ok_or_else(|| AuditError::Extraction("index payload contained no videos".to_string()))?;

    let insights = video.insights;

    let transcript = insights
        .transcript
        .iter()
        .map(|block| block.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let ocr_text = insights
        .ocr
        .iter()
        .map(|block| block.text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    let mut video_metadata = HashMap::new();
    if let Some(duration) = insights.duration_in_seconds {
        video_metadata.insert("duration".to_string(), serde_json::json!(duration));
    }
    if let Some(language) = insights.source_language {
        video_metadata.insert("language".to_string(), serde_json::json!(language));
    }

    Ok(IngestOutput {
        local_file_path: None,
        video_metadata,
        transcript,
        ocr_text,
    })
}

async fn upstream_status(operation: &str, response: reqwest::Response) -> AuditError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    AuditError::Upstream(format!("{operation} failed with status {status}: {body}").into())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProbeResponse {
    duration_seconds: f64,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStatus {
    state: String,
    #[serde(default)]
    videos: Vec<IndexedVideo>,
}

#[derive(Debug, Default, Deserialize)]
struct IndexedVideo {
    #[serde(default)]
    insights: Insights,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Insights {
    duration_in_seconds: Option<f64>,
    source_language: Option<String>,
    #[serde(default)]
    transcript: Vec<TextBlock>,
    #[serde(default)]
    ocr: Vec<TextBlock>,
}

#[derive(Debug, Deserialize)]
struct TextBlock {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_video_platform_urls() {
        assert!(supported_video_url("https://youtu.be/abc123").is_ok());
        assert!(supported_video_url("https://www.youtube.com/watch?v=abc123").is_ok());
    }

    #[test]
    fn rejects_unsupported_input() {
        for input in [
            "not-a-video-url",
            "ftp://youtube.com/video",
            "https://example.com/clip.mp4",
            "file:///etc/passwd",
        ] {
            let err = supported_video_url(input).unwrap_err();
            assert!(matches!(err, AuditError::UnsupportedInput { .. }), "{input}");
        }
    }

    #[test]
    fn extracts_transcript_ocr_and_metadata() {
        let status: IndexStatus = serde_json::from_value(serde_json::json!({
            "state": "Processed",
            "videos": [{
                "insights": {
                    "durationInSeconds": 15.0,
                    "sourceLanguage": "en-US",
                    "transcript": [
                        {"text": "Our product is "},
                        {"text": "100% guaranteed."},
                        {"text": "   "}
                    ],
                    "ocr": [
                        {"text": "LIMITED OFFER"},
                        {"text": ""}
                    ]
                }
            }]
        }))
        .unwrap();

        let output = extract_output(status).unwrap();
        assert_eq!(output.transcript, "Our product is 100% guaranteed.");
        assert_eq!(output.ocr_text, vec!["LIMITED OFFER".to_string()]);
        assert_eq!(output.video_metadata["duration"], serde_json::json!(15.0));
        assert_eq!(output.video_metadata["language"], serde_json::json!("en-US"));
    }

    #[test]
    fn empty_index_payload_is_an_extraction_error() {
        let status: IndexStatus =
            serde_json::from_value(serde_json::json!({"state": "Processed", "videos": []}))
                .unwrap();
        let err = extract_output(status).unwrap_err();
        assert!(matches!(err, AuditError::Extraction(_)));
    }
}
