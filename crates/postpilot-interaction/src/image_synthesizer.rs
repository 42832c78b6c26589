//! ImageSynthesizer - asks the image worker for an illustration of a topic.

use std::sync::Arc;
use std::time::Duration;

use postpilot_core::config::ImageWorkerConfig;
use postpilot_core::deadline::run_with_deadline;
use postpilot_core::error::{RAW_ERROR_SNIPPET_CHARS, truncate_chars};
use postpilot_core::http::{HttpRequest, HttpResponse, HttpTransport};
use postpilot_core::{CancellationToken, GeneratedImage, PostPilotError, Result, Topic};
use serde_json::{Value, json};
use tracing::{debug, info};

const IMAGE_GENERATION: &str = "Image Generation";

/// Keeps abstract topics from turning into messy photorealism.
const VISUAL_METAPHOR: &str = "A network of interconnected glowing nodes, geometric shapes, and clean lines forming a secure data stream or digital brain structure.";
const VISUAL_STYLE: &str = "A dynamic, isometric graphic design illustration. Sleek, professional, and futuristic aesthetic. High resolution, ultra-detailed, 8k digital art, sharp focus.";

#[derive(Clone)]
pub struct ImageSynthesizer {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl ImageSynthesizer {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        worker: &ImageWorkerConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            endpoint: worker.endpoint.clone(),
            api_key: worker.api_key.clone(),
            timeout,
        }
    }

    pub fn build_prompt(topic: &Topic) -> String {
        format!(
            "An abstract concept of \"{}\". {VISUAL_METAPHOR} {VISUAL_STYLE}",
            topic.as_str()
        )
    }

    pub async fn synthesize_image(
        &self,
        topic: &Topic,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage> {
        let request = HttpRequest::post(self.endpoint.clone())
            .bearer(&self.api_key)
            .header("Content-Type", "application/json")
            .json(json!({ "prompt": Self::build_prompt(topic) }));

        info!("requesting image from worker");
        let response = run_with_deadline(
            IMAGE_GENERATION,
            self.timeout,
            cancel,
            self.transport.send(request),
        )
        .await?;

        if !response.is_success() {
            return Err(worker_error(&response));
        }

        debug!(
            content_type = response.content_type(),
            bytes = response.body.len(),
            "worker answered"
        );
        let mime_type = response.content_type().to_string();
        GeneratedImage::from_payload(response.body, &mime_type)
    }
}

/// The worker's JSON `error` field when present, else the raw body.
fn worker_error(response: &HttpResponse) -> PostPilotError {
    let text = response.text();
    let message = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => match map.get("error") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => text.clone(),
        },
        _ => text.clone(),
    };
    PostPilotError::WorkerError {
        status: response.status,
        message: truncate_chars(&message, RAW_ERROR_SNIPPET_CHARS).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_frames_topic_with_metaphor_and_style() {
        let topic = Topic::new("Edge AI inference").unwrap();
        let prompt = ImageSynthesizer::build_prompt(&topic);
        assert!(prompt.starts_with("An abstract concept of \"Edge AI inference\". A network of"));
        assert!(prompt.ends_with("sharp focus."));
    }

    #[test]
    fn test_worker_error_prefers_json_error_field() {
        let response = HttpResponse::new(500).with_body(r#"{"error":"model overloaded"}"#);
        let err = worker_error(&response);
        assert_eq!(err.to_string(), "Worker Error: Status 500 - model overloaded...");
    }

    #[test]
    fn test_worker_error_truncates_raw_body() {
        let response = HttpResponse::new(502).with_body("<html>".repeat(50));
        match worker_error(&response) {
            PostPilotError::WorkerError { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message.chars().count(), 100);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
