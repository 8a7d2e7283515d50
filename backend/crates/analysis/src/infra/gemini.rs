//! Gemini `generateContent` client
//!
//! One HTTP call per `generate`; retrying is the caller's business. Failures
//! are classified from the HTTP status and the structured error body the
//! API returns (`error.status`, `error.details[].reason`).

use crate::domain::model::{AnalysisModel, Prompt, UpstreamError, UpstreamErrorKind};
use platform::config::{ConfigError, Env};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Finish reasons that mean the provider withheld the answer
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

#[derive(Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl GeminiSettings {
    pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env.required("GEMINI_API_KEY")?,
            model: env.or_default("GEMINI_MODEL", DEFAULT_MODEL),
            base_url: env.or_default("GEMINI_BASE_URL", DEFAULT_BASE_URL),
            request_timeout: Duration::from_secs(env.parse_or("GEMINI_TIMEOUT_SECS", 30)?),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// reqwest-backed upstream model
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    settings: Arc<GeminiSettings>,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            http,
            settings: Arc::new(settings),
        })
    }
}

impl AnalysisModel for GeminiClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String, UpstreamError> {
        let response = self
            .http
            .post(self.settings.endpoint())
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| UpstreamError::transient(format!("Upstream request failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::transient(format!("Upstream body unreadable: {e}")))?;

        if !(200..300).contains(&status) {
            let err = classify_error(status, &body);
            tracing::debug!(
                status = status,
                kind = err.kind.as_str(),
                model = %self.settings.model,
                "Upstream returned an error"
            );
            return Err(err);
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            UpstreamError::transient(format!("Malformed upstream response: {e}"))
                .with_status(status)
        })?;

        extract_text(parsed)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a Prompt) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: prompt
                    .parts
                    .iter()
                    .map(|text| TextPart { text })
                    .collect(),
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

// ============================================================================
// Classification
// ============================================================================

/// Classify a non-2xx reply
pub fn classify_error(status: u16, body: &str) -> UpstreamError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);

    let rpc_status = parsed.as_ref().map(|e| e.status.as_str()).unwrap_or("");
    let key_invalid = parsed
        .as_ref()
        .map(|e| {
            e.details
                .iter()
                .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"))
        })
        .unwrap_or(false);

    let kind = if status == 429 || rpc_status == "RESOURCE_EXHAUSTED" {
        UpstreamErrorKind::RateLimited
    } else if key_invalid
        || matches!(status, 401 | 403 | 404)
        || matches!(
            rpc_status,
            "PERMISSION_DENIED" | "UNAUTHENTICATED" | "FAILED_PRECONDITION"
        )
    {
        UpstreamErrorKind::Access
    } else if status == 400 || rpc_status == "INVALID_ARGUMENT" {
        UpstreamErrorKind::Content
    } else {
        UpstreamErrorKind::Transient
    };

    let detail = match parsed {
        Some(e) if !e.message.is_empty() => e.message,
        _ => body.chars().take(200).collect(),
    };

    UpstreamError::new(kind, format!("Upstream returned {status}: {detail}")).with_status(status)
}

/// Pull the generated text out of a 2xx reply
pub fn extract_text(response: GenerateContentResponse) -> Result<String, UpstreamError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(UpstreamError::new(
            UpstreamErrorKind::Content,
            format!("Prompt blocked: {reason}"),
        ));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(UpstreamError::transient("Upstream returned no candidates"));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if !text.trim().is_empty() {
        return Ok(text);
    }

    match candidate.finish_reason.as_deref() {
        Some(reason) if BLOCKED_FINISH_REASONS.contains(&reason) => Err(UpstreamError::new(
            UpstreamErrorKind::Content,
            format!("Response withheld: {reason}"),
        )),
        _ => Err(UpstreamError::transient("Upstream returned empty text")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_shape() {
        let prompt = Prompt {
            parts: vec!["system".to_string(), "user text".to_string()],
        };
        let value = serde_json::to_value(GenerateContentRequest::from_prompt(&prompt)).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [{"text": "system"}, {"text": "user text"}]
                }]
            })
        );
    }

    #[test]
    fn test_endpoint() {
        let settings = GeminiSettings {
            api_key: "k".to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: "http://127.0.0.1:9999/".to_string(),
            request_timeout: Duration::from_secs(1),
        };
        assert_eq!(
            settings.endpoint(),
            "http://127.0.0.1:9999/v1beta/models/gemini-2.0-flash-001:generateContent"
        );
        assert!(!format!("{settings:?}").contains("\"k\""));
    }

    #[test]
    fn test_settings_from_env_defaults() {
        let env = Env::from_pairs([("GEMINI_API_KEY", "abc")]);
        let settings = GeminiSettings::from_env(&env).unwrap();
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.request_timeout, Duration::from_secs(30));

        assert!(GeminiSettings::from_env(&Env::from_pairs([("GEMINI_MODEL", "m")])).is_err());
    }

    fn error_body(code: u16, message: &str, status: &str) -> String {
        serde_json::json!({ "error": { "code": code, "message": message, "status": status } })
            .to_string()
    }

    #[test]
    fn test_classify_quota() {
        let body = error_body(
            429,
            "Resource has been exhausted (e.g. check quota).",
            "RESOURCE_EXHAUSTED",
        );
        let err = classify_error(429, &body);
        assert_eq!(err.kind, UpstreamErrorKind::RateLimited);
        assert_eq!(err.status, Some(429));
        assert!(err.message.contains("Resource has been exhausted"));
    }

    #[test]
    fn test_classify_invalid_key_reported_as_400() {
        let body = serde_json::json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{
                    "@type": "type.googleapis.com/google.rpc.ErrorInfo",
                    "reason": "API_KEY_INVALID"
                }]
            }
        })
        .to_string();
        assert_eq!(classify_error(400, &body).kind, UpstreamErrorKind::Access);
    }

    #[test]
    fn test_classify_permission_and_content() {
        let denied = error_body(403, "denied", "PERMISSION_DENIED");
        assert_eq!(classify_error(403, &denied).kind, UpstreamErrorKind::Access);

        let bad = error_body(400, "Request contains an invalid argument.", "INVALID_ARGUMENT");
        assert_eq!(classify_error(400, &bad).kind, UpstreamErrorKind::Content);
    }

    #[test]
    fn test_classify_server_errors_transient() {
        let body = error_body(503, "The model is overloaded.", "UNAVAILABLE");
        assert_eq!(classify_error(503, &body).kind, UpstreamErrorKind::Transient);

        let err = classify_error(502, "<html>bad gateway</html>");
        assert_eq!(err.kind, UpstreamErrorKind::Transient);
        assert_eq!(err.message, "Upstream returned 502: <html>bad gateway</html>");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "Analysis:\n" }, { "text": "• 💡 ok" }]
                },
                "finishReason": "STOP"
            }]
        });
        let response = parse(&body.to_string());
        assert_eq!(extract_text(response).unwrap(), "Analysis:\n• 💡 ok");
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let response = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        assert_eq!(extract_text(response).unwrap_err().kind, UpstreamErrorKind::Content);
    }

    #[test]
    fn test_extract_text_safety_finish() {
        let response = parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert_eq!(extract_text(response).unwrap_err().kind, UpstreamErrorKind::Content);
    }

    #[test]
    fn test_extract_text_empty_is_transient() {
        assert_eq!(
            extract_text(parse("{}")).unwrap_err().kind,
            UpstreamErrorKind::Transient
        );
        let response = parse(r#"{"candidates":[{"content":{"parts":[]},"finishReason":"STOP"}]}"#);
        assert_eq!(extract_text(response).unwrap_err().kind, UpstreamErrorKind::Transient);
    }
}
