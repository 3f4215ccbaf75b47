use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const API_VERSION: &str = "v1beta";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request to the model endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Api { status: StatusCode, message: String },

    #[error("could not decode the model response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("model returned no text{}", blocked_suffix(.reason))]
    EmptyResponse { reason: Option<String> },
}

fn blocked_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" (blocked: {r})"))
        .unwrap_or_default()
}

/// A remote text-generation model that turns one prompt into one reply.
#[async_trait]
pub trait TextModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Client for the Gemini `generateContent` endpoint, bound to one model and key.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl GeminiClient {
    /// Fails when the underlying HTTP client cannot be built (TLS backend).
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl AsRef<str>,
    ) -> Result<Self, ModelError> {
        let model = model.into();
        let url = format!(
            "{}/{API_VERSION}/models/{model}:generateContent",
            base_url.as_ref().trim_end_matches('/')
        );
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            api_key: api_key.into(),
            model,
            url,
        })
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
        };

        debug!(model = %self.model, "sending generateContent request");
        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(%status, model = %self.model, "model endpoint returned an error");
            return Err(ModelError::Api {
                status,
                message: api_error_message(&body),
            });
        }

        extract_text(&body)
    }
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "<empty response body>".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

fn extract_text(body: &str) -> Result<String, ModelError> {
    let response: GenerateResponse = serde_json::from_str(body)?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ModelError::EmptyResponse {
            reason: response.prompt_feedback.and_then(|f| f.block_reason),
        });
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_all_text_parts_of_the_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Squats, "}, {"text": "lunges..."}]}},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ]
        }"#;

        assert_eq!(extract_text(body).unwrap(), "Squats, lunges...");
    }

    #[test]
    fn blocked_prompt_reports_the_reason() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;

        let err = extract_text(body).unwrap_err();
        assert!(matches!(err, ModelError::EmptyResponse { .. }));
        assert_eq!(err.to_string(), "model returned no text (blocked: SAFETY)");
    }

    #[test]
    fn candidate_without_content_is_empty() {
        let err = extract_text(r#"{"candidates": [{"finishReason": "OTHER"}]}"#).unwrap_err();

        assert_eq!(err.to_string(), "model returned no text");
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(matches!(
            extract_text("not json").unwrap_err(),
            ModelError::Decode(_)
        ));
    }

    #[test]
    fn api_error_message_prefers_the_envelope() {
        let body = r#"{"error": {"code": 404, "message": "model not found", "status": "NOT_FOUND"}}"#;

        assert_eq!(api_error_message(body), "model not found");
        assert_eq!(api_error_message("  upstream down \n"), "upstream down");
        assert_eq!(api_error_message(""), "<empty response body>");
    }

    #[test]
    fn url_is_built_from_base_and_model() {
        let client =
            GeminiClient::new("key", "gemini-1.5-flash-latest", "http://localhost:8080/").unwrap();

        assert_eq!(
            client.url,
            "http://localhost:8080/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
        assert_eq!(client.model_name(), "gemini-1.5-flash-latest");
    }
}
