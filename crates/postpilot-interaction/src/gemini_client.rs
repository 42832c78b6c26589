//! GeminiClient - direct REST client for Gemini `generateContent`.
//!
//! Used by the idea source (optionally with the `google_search` tool) and by
//! the post composer. Errors are normalized into [`PostPilotError`].

use std::sync::Arc;

use postpilot_core::config::GeminiSettings;
use postpilot_core::error::extract_api_error_message;
use postpilot_core::http::{HttpRequest, HttpTransport};
use postpilot_core::{PostPilotError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client that talks to the Gemini HTTP API through an [`HttpTransport`].
#[derive(Clone)]
pub struct GeminiClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Creates a client with the default endpoint and model.
    pub fn new(transport: Arc<dyn HttpTransport>, api_key: impl Into<String>) -> Self {
        Self::from_settings(transport, &GeminiSettings::default(), api_key)
    }

    pub fn from_settings(
        transport: Arc<dyn HttpTransport>,
        settings: &GeminiSettings,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: api_key.into(),
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> Result<Url> {
        Url::parse_with_params(
            &format!("{}/{}:generateContent", self.base_url, self.model),
            &[("key", self.api_key.as_str())],
        )
        .map_err(|err| PostPilotError::config(format!("invalid Gemini base URL: {err}")))
    }

    /// Sends `request` and returns the generated text of the first candidate.
    pub async fn generate(&self, request: &GenerateContentRequest) -> Result<String> {
        let http_request = HttpRequest::post(self.endpoint()?)
            .header("Content-Type", "application/json")
            .json(serde_json::to_value(request)?);

        debug!(
            url = %http_request.redacted_url(),
            tools = request.tools.len(),
            "sending Gemini generateContent request"
        );

        let response = self.transport.send(http_request).await?;

        if !response.is_success() {
            let message = extract_api_error_message(&response.text());
            return Err(PostPilotError::http(
                response.status,
                format!("Gemini API HTTP Error: {} - {}", response.status, message),
            ));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|err| PostPilotError::malformed(format!("Failed to parse Gemini response: {err}")))?;

        extract_text_response(parsed)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

impl GenerateContentRequest {
    /// Single-turn request carrying one user message.
    pub fn user_prompt(text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::text("user", text)],
            system_instruction: None,
            tools: Vec::new(),
        }
    }

    pub fn with_system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::text("system", text));
        self
    }

    /// Lets the model run Google searches while answering.
    pub fn with_google_search(mut self) -> Self {
        self.tools.push(Tool::default());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Tool {
    #[serde(rename = "google_search")]
    google_search: GoogleSearchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
struct GoogleSearchConfig {}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

/// Joins the text parts of the first candidate.
///
/// Grounded answers may split the text over several parts.
fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(PostPilotError::EmptyModelResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use postpilot_core::http::HttpResponse;
    use postpilot_core::testing::ScriptedTransport;
    use serde_json::json;

    fn client(transport: Arc<ScriptedTransport>) -> GeminiClient {
        GeminiClient::new(transport, "test-key")
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest::user_prompt("hello")
            .with_system_instruction("be brief")
            .with_google_search();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "systemInstruction": {"role": "system", "parts": [{"text": "be brief"}]},
                "tools": [{"google_search": {}}]
            })
        );
    }

    #[test]
    fn test_plain_request_omits_optional_fields() {
        let value = serde_json::to_value(GenerateContentRequest::user_prompt("hi")).unwrap();
        assert!(value.get("systemInstruction").is_none());
        assert!(value.get("tools").is_none());
    }

    #[tokio::test]
    async fn test_generate_returns_first_candidate_text() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_response(HttpResponse::new(200).with_json(&json!({
            "candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "world"}]}}]
        })));

        let text = client(transport.clone())
            .generate(&GenerateContentRequest::user_prompt("hi"))
            .await
            .unwrap();
        assert_eq!(text, "Hello world");

        let sent = &transport.requests()[0];
        assert!(sent.url.starts_with(
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent?key="
        ));
        assert!(sent.url.ends_with("key=test-key"));
    }

    #[tokio::test]
    async fn test_http_error_carries_api_message() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_response(HttpResponse::new(400).with_json(&json!({
            "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
        })));

        let err = client(transport)
            .generate(&GenerateContentRequest::user_prompt("hi"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.to_string(),
            "Gemini API HTTP Error: 400 - API key not valid."
        );
    }

    #[tokio::test]
    async fn test_missing_parts_is_empty_response() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_response(HttpResponse::new(200).with_json(&json!({"candidates": []})));

        let err = client(transport)
            .generate(&GenerateContentRequest::user_prompt("hi"))
            .await
            .unwrap_err();
        assert_eq!(err, PostPilotError::EmptyModelResponse);
    }
}
