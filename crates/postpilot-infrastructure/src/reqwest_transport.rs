//! reqwest-backed [`HttpTransport`].

use std::time::Duration;

use postpilot_core::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody};
use postpilot_core::{PostPilotError, Result};
use tracing::debug;

/// Backstop for requests not wrapped in a tighter deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("postpilot/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| PostPilotError::Network(err.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
    }
}

fn map_send_error(err: reqwest::Error) -> PostPilotError {
    if err.is_timeout() {
        PostPilotError::timeout("HTTP request", REQUEST_TIMEOUT.as_secs())
    } else {
        // Strip the URL so query-string credentials never reach the message.
        PostPilotError::Network(err.without_url().to_string())
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.redacted_url(), "sending HTTP request");

        let mut builder = self.client.request(method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(ref value) => {
                if request.header_value("content-type").is_none() {
                    builder = builder.header("Content-Type", "application/json");
                }
                builder.body(serde_json::to_vec(value)?)
            }
            RequestBody::Binary(bytes) => builder.body(bytes),
        };

        let response = builder.send().await.map_err(map_send_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(map_send_error)?.to_vec();

        debug!(status, bytes = body.len(), "HTTP response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
