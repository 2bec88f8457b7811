//! OpenAI-backed claim reasoner.
//!
//! Implements [`ClaimReasoner`] over the chat-completions API: the
//! transcript, on-screen text and retrieved rules are rendered into one
//! audit prompt, the model answers with a JSON object, and the answer is
//! parsed into [`ComplianceIssue`] values. A malformed answer is an
//! [`AuditError::Extraction`], not a panic.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};
use crate::state::{ComplianceIssue, Rule, Severity};
use crate::traits::ClaimReasoner;

const SYSTEM_PROMPT: &str = "You are a brand compliance auditor. Evaluate every claim made in \
the video content against the provided compliance rules. Respond with a JSON object of the form \
{\"issues\": [{\"category\": string, \"severity\": \"CRITICAL\" | \"WARNING\", \"description\": \
string, \"timestamp\": string | null}]}. Report only genuine violations; an empty issues array \
means the content is compliant.";

/// Chat-completions client implementing the claim reasoner capability.
#[derive(Clone)]
pub struct OpenAiReasoner {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiReasoner {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AuditError::Config("OPENAI_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn chat(&self, user_prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AuditError::Upstream(Box::new(e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuditError::Upstream(
                format!("chat completion failed with status {status}: {body}").into(),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AuditError::Upstream(Box::new(e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AuditError::Extraction("model returned no choices".to_string()))
    }
}

#[async_trait]
impl ClaimReasoner for OpenAiReasoner {
    async fn evaluate(
        &self,
        transcript: &str,
        ocr_text: &[String],
        rules: &[Rule],
    ) -> Result<Vec<ComplianceIssue>> {
        let prompt = format_audit_prompt(transcript, ocr_text, rules);
        let answer = self.chat(&prompt).await?;
        parse_issues(&answer)
    }
}

/// Render the audit prompt the reasoner sends to the model.
pub fn format_audit_prompt(transcript: &str, ocr_text: &[String], rules: &[Rule]) -> String {
    let mut prompt = String::new();

    prompt.push_str("## Compliance rules\n");
    if rules.is_empty() {
        prompt.push_str("(no specific rules retrieved; apply general brand-safety judgment)\n");
    }
    for rule in rules {
        prompt.push_str(&format!("- [{}] ({}) {}\n", rule.id, rule.category, rule.text));
    }

    prompt.push_str("\n## Speech transcript\n");
    if transcript.trim().is_empty() {
        prompt.push_str("(no speech detected)\n");
    } else {
        prompt.push_str(transcript.trim());
        prompt.push('\n');
    }

    prompt.push_str("\n## On-screen text\n");
    if ocr_text.is_empty() {
        prompt.push_str("(no on-screen text detected)\n");
    }
    for line in ocr_text {
        prompt.push_str(&format!("- {line}\n"));
    }

    prompt
}

/// Parse the model's JSON answer into issues.
pub fn parse_issues(answer: &str) -> Result<Vec<ComplianceIssue>> {
    let body = strip_code_fence(answer);

    let parsed: IssuesResponse = serde_json::from_str(body)
        .map_err(|e| AuditError::Extraction(format!("unparseable reasoner output: {e}")))?;

    Ok(parsed
        .issues
        .into_iter()
        .map(|issue| ComplianceIssue {
            category: issue.category,
            severity: issue.severity,
            description: issue.description,
            timestamp: issue.timestamp,
        })
        .collect())
}

/// Models sometimes wrap JSON in a markdown fence despite instructions.
fn strip_code_fence(answer: &str) -> &str {
    let trimmed = answer.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct IssuesResponse {
    #[serde(default)]
    issues: Vec<WireIssue>,
}

#[derive(Deserialize)]
struct WireIssue {
    category: String,
    severity: Severity,
    description: String,
    #[serde(default)]
    timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_rules_transcript_and_ocr() {
        let rules = vec![Rule::new("R-1", "No absolute guarantees.", "Misleading Claims")];
        let prompt = format_audit_prompt(
            "This product is 100% guaranteed to work.",
            &["LIMITED OFFER".to_string()],
            &rules,
        );

        assert!(prompt.contains("[R-1] (Misleading Claims) No absolute guarantees."));
        assert!(prompt.contains("This product is 100% guaranteed to work."));
        assert!(prompt.contains("- LIMITED OFFER"));
    }

    #[test]
    fn prompt_marks_missing_content() {
        let prompt = format_audit_prompt("", &[], &[]);
        assert!(prompt.contains("(no speech detected)"));
        assert!(prompt.contains("(no on-screen text detected)"));
        assert!(prompt.contains("(no specific rules retrieved"));
    }

    #[test]
    fn parses_issues_from_model_answer() {
        let answer = r#"{"issues": [{"category": "Misleading Claims", "severity": "CRITICAL",
            "description": "Absolute guarantee at 00:32", "timestamp": "00:32"}]}"#;

        let issues = parse_issues(answer).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].timestamp.as_deref(), Some("00:32"));
    }

    #[test]
    fn parses_fenced_answer() {
        let answer = "```json\n{\"issues\": []}\n```";
        assert!(parse_issues(answer).unwrap().is_empty());
    }

    #[test]
    fn malformed_answer_is_an_extraction_error() {
        let err = parse_issues("I found no violations!").unwrap_err();
        assert!(matches!(err, AuditError::Extraction(_)));
    }
}
