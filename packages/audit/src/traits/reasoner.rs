//! Claim reasoning capability.
//!
//! Implementations wrap an LLM provider and evaluate each claim made in
//! the video (spoken or on-screen) against the retrieved rules,
//! returning the violations they find. A single blocking
//! request/response; no retries here — a failed call surfaces as one
//! recorded error so failure attribution stays clear.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::state::{ComplianceIssue, Rule};

/// Claim reasoner capability.
#[async_trait]
pub trait ClaimReasoner: Send + Sync {
    /// Evaluate the extracted content against the rules.
    async fn evaluate(
        &self,
        transcript: &str,
        ocr_text: &[String],
        rules: &[Rule],
    ) -> Result<Vec<ComplianceIssue>>;
}

#[async_trait]
impl<T: ClaimReasoner + ?Sized> ClaimReasoner for Arc<T> {
    async fn evaluate(
        &self,
        transcript: &str,
        ocr_text: &[String],
        rules: &[Rule],
    ) -> Result<Vec<ComplianceIssue>> {
        (**self).evaluate(transcript, ocr_text, rules).await
    }
}
