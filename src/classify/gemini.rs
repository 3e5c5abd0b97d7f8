//! Gemini `generateContent` backend.
//!
//! One POST per analysis: an `inlineData` JPEG part, a text part with the
//! prompt, and a `responseSchema` forcing a JSON reply. The HTTP client is
//! built once and reused; nothing else is kept between calls.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::prompt::{build_prompt, response_schema};
use super::{ClassificationResult, Classifier, ModelReply};
use crate::config::AppConfig;
use crate::error::{UpcycleError, UpcycleResult};
use crate::photo::EncodedImage;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Classifier backed by the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiClassifier {
    client: Client,
    url: String,
    model: String,
    api_key: String,
}

impl GeminiClassifier {
    /// Build the client; fails with a configuration error if `API_KEY` is missing.
    pub fn from_config(config: &AppConfig) -> UpcycleResult<Self> {
        let api_key = config.require_api_key()?.to_string();
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: config.generate_content_url(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Request body for one photo.
    pub fn request_body(image: &EncodedImage, location: Option<&str>) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": image.mime_type, "data": image.data } },
                    { "text": build_prompt(location) }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        })
    }

    /// Send the request and return the model's raw reply text.
    pub async fn generate_raw(
        &self,
        image: &EncodedImage,
        location: Option<&str>,
    ) -> UpcycleResult<String> {
        let body = Self::request_body(image, location);
        tracing::info!(
            model = %self.model,
            payload_bytes = image.data.len(),
            has_location = location.is_some(),
            "sending classification request"
        );

        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_from_status(status.as_u16(), &text));
        }

        let reply: GenerateContentResponse = response.json().await?;
        extract_text(reply)
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(
        &self,
        image: &EncodedImage,
        location: Option<&str>,
    ) -> UpcycleResult<ClassificationResult> {
        let text = self.generate_raw(image, location).await?;
        let result = ModelReply::from_json(&text)?.interpret()?;
        tracing::info!(
            furniture = %result.furniture_key,
            condition = ?result.condition,
            "classification received"
        );
        Ok(result)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReplyPart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

fn extract_text(reply: GenerateContentResponse) -> UpcycleResult<String> {
    let block_reason = reply.prompt_feedback.and_then(|f| f.block_reason);
    let candidate = reply.candidates.into_iter().next().ok_or_else(|| {
        let reason = match &block_reason {
            Some(block) => format!("request blocked: {}", block),
            None => "reply contained no candidates".to_string(),
        };
        UpcycleError::transport("generate_content", reason)
    })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate
            .finish_reason
            .map(|r| format!("reply contained no text (finish reason {})", r))
            .unwrap_or_else(|| "reply contained no text".to_string());
        return Err(UpcycleError::transport("generate_content", reason));
    }
    Ok(text)
}

fn error_from_status(status: u16, body: &str) -> UpcycleError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("unexpected status {}", status));

    let error = UpcycleError::transport_status("generate_content", status, message);
    match status {
        401 | 403 => error.with_recovery_suggestion("Check that API_KEY is valid for this model"),
        429 => error.with_recovery_suggestion("The model is rate limited; wait a moment and try again"),
        _ => error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HasRecoverySuggestion;
    use upcycle_scale::presets::Size;

    fn image() -> EncodedImage {
        EncodedImage::from_jpeg_bytes(&[0xFF, 0xD8, 0xFF], Size { w: 1, h: 1 })
    }

    #[test]
    fn test_missing_key_blocks_construction() {
        let err = GeminiClassifier::from_config(&AppConfig::default()).unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn test_request_body_shape() {
        let body = GeminiClassifier::request_body(&image(), Some("Nantes"));
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "/9j/");
        assert!(parts[1]["text"].as_str().unwrap().contains("Nantes"));
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let reply: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [ { "text": "{\"furnitureType\":" }, { "text": "\"metal chair\"}" } ] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(
            extract_text(reply).unwrap(),
            r#"{"furnitureType":"metal chair"}"#
        );
    }

    #[test]
    fn test_blocked_prompt_is_transport_error() {
        let reply: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        let err = extract_text(reply).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_error_envelope_message_is_used() {
        let err = error_from_status(
            403,
            r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#,
        );
        assert!(err.to_string().contains("API key not valid"));
        assert!(err.recovery_suggestion().unwrap().contains("API_KEY"));

        let err = error_from_status(500, "<html>oops</html>");
        assert!(err.to_string().contains("unexpected status 500"));
    }
}
