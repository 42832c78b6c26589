//! Calls to the LinkedIn REST API through the forwarding proxy.
//!
//! The proxy understands two shapes:
//! - `{proxy}{path}` is forwarded to the LinkedIn API host.
//! - `{proxy}?url=<encoded>` is forwarded verbatim to an external host. The
//!   binary upload target lives outside the API host, so it needs this form.

use std::sync::Arc;

use postpilot_core::config::{LinkedInConfig, LinkedInSettings};
use postpilot_core::error::{RAW_ERROR_SNIPPET_CHARS, truncate_chars};
use postpilot_core::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use postpilot_core::{PostPilotError, Result};
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

/// Where a proxied request should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyTarget {
    /// A path on the LinkedIn API, e.g. `/ugcPosts`.
    ApiCall { path: String },
    /// A full URL on another host, e.g. the upload URL from asset registration.
    ExternalForward { url: String },
}

impl ProxyTarget {
    pub fn api(path: impl Into<String>) -> Self {
        Self::ApiCall { path: path.into() }
    }

    pub fn external(url: impl Into<String>) -> Self {
        Self::ExternalForward { url: url.into() }
    }
}

/// Body of a proxied request.
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyBody {
    Json(Value),
    Binary(Vec<u8>),
}

#[derive(Clone)]
pub struct LinkedInProxy {
    transport: Arc<dyn HttpTransport>,
    proxy_url: String,
    access_token: String,
    protocol_version: String,
    api_version: String,
}

impl LinkedInProxy {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        credentials: &LinkedInConfig,
        settings: &LinkedInSettings,
    ) -> Self {
        Self {
            transport,
            proxy_url: credentials.proxy_url.trim_end_matches('/').to_string(),
            access_token: credentials.access_token.clone(),
            protocol_version: settings.protocol_version.clone(),
            api_version: settings.api_version.clone(),
        }
    }

    /// The URL the proxy must be called with to reach `target`.
    pub fn resolve_url(&self, target: &ProxyTarget) -> Result<String> {
        match target {
            ProxyTarget::ApiCall { path } => Ok(format!("{}{}", self.proxy_url, path)),
            ProxyTarget::ExternalForward { url } => {
                Url::parse_with_params(&self.proxy_url, &[("url", url.as_str())])
                    .map(String::from)
                    .map_err(|err| {
                        PostPilotError::config(format!("invalid linkedin.proxy_url: {err}"))
                    })
            }
        }
    }

    /// Sends one request through the proxy.
    ///
    /// Any non-2xx status fails with the status and a best-effort detail.
    pub async fn call(
        &self,
        method: HttpMethod,
        target: &ProxyTarget,
        body: ProxyBody,
    ) -> Result<HttpResponse> {
        let url = self.resolve_url(target)?;
        let request = HttpRequest::new(method, url)
            .bearer(&self.access_token)
            .header("X-Restli-Protocol-Version", self.protocol_version.as_str())
            .header("LinkedIn-Version", self.api_version.as_str());
        let request = match body {
            ProxyBody::Json(value) => request
                .header("Content-Type", "application/json")
                .json(value),
            ProxyBody::Binary(bytes) => request
                .header("Content-Type", "application/octet-stream")
                .binary(bytes),
        };

        debug!(%method, ?target, "calling LinkedIn through proxy");
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(api_call_error(&response));
        }
        Ok(response)
    }
}

fn api_call_error(response: &HttpResponse) -> PostPilotError {
    let text = response.text();
    let detail = match serde_json::from_str::<Value>(&text) {
        Ok(json) => {
            let details = json
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| json.to_string());
            format!("Details: {details}")
        }
        Err(_) => format!(
            "Raw response: {}",
            truncate_chars(&text, RAW_ERROR_SNIPPET_CHARS)
        ),
    };
    PostPilotError::http(
        response.status,
        format!("API call failed. Status: {}. {detail}", response.status),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use postpilot_core::testing::ScriptedTransport;
    use serde_json::json;

    fn proxy(transport: Arc<ScriptedTransport>) -> LinkedInProxy {
        LinkedInProxy::new(
            transport,
            &LinkedInConfig {
                proxy_url: "https://publisher.workers.test".into(),
                access_token: "li-token".into(),
                author_urn: "urn:li:person:me".into(),
            },
            &LinkedInSettings::default(),
        )
    }

    #[test]
    fn test_api_call_appends_path() {
        let proxy = proxy(Arc::new(ScriptedTransport::new()));
        let url = proxy.resolve_url(&ProxyTarget::api("/ugcPosts")).unwrap();
        assert_eq!(url, "https://publisher.workers.test/ugcPosts");
    }

    #[test]
    fn test_trailing_slash_on_proxy_url_is_ignored() {
        let proxy = LinkedInProxy::new(
            Arc::new(ScriptedTransport::new()),
            &LinkedInConfig {
                proxy_url: "https://publisher.workers.test/".into(),
                access_token: "li-token".into(),
                author_urn: "urn:li:person:me".into(),
            },
            &LinkedInSettings::default(),
        );
        assert_eq!(
            proxy.resolve_url(&ProxyTarget::api("/ugcPosts")).unwrap(),
            "https://publisher.workers.test/ugcPosts"
        );
        assert!(
            proxy
                .resolve_url(&ProxyTarget::external("https://www.linkedin.com/x"))
                .unwrap()
                .starts_with("https://publisher.workers.test/?url=")
        );
    }

    #[test]
    fn test_external_forward_encodes_url() {
        let proxy = proxy(Arc::new(ScriptedTransport::new()));
        let url = proxy
            .resolve_url(&ProxyTarget::external(
                "https://www.linkedin.com/dms-uploads/abc?ca=vector&x=1",
            ))
            .unwrap();
        assert_eq!(
            url,
            "https://publisher.workers.test/?url=https%3A%2F%2Fwww.linkedin.com%2Fdms-uploads%2Fabc%3Fca%3Dvector%26x%3D1"
        );
        let parsed = Url::parse(&url).unwrap();
        let (_, forwarded) = parsed.query_pairs().next().unwrap();
        assert_eq!(forwarded, "https://www.linkedin.com/dms-uploads/abc?ca=vector&x=1");
    }

    #[tokio::test]
    async fn test_call_sets_linkedin_headers() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_response(HttpResponse::new(201));
        proxy(transport.clone())
            .call(HttpMethod::Post, &ProxyTarget::api("/ugcPosts"), ProxyBody::Json(json!({})))
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.header_value("authorization"), Some("Bearer li-token"));
        assert_eq!(sent.header_value("x-restli-protocol-version"), Some("2.0.0"));
        assert_eq!(sent.header_value("linkedin-version"), Some("202409"));
        assert_eq!(sent.header_value("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_json_error_carries_details() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_response(
            HttpResponse::new(401).with_json(&json!({"message": "Invalid access token", "status": 401})),
        );
        let err = proxy(transport)
            .call(HttpMethod::Post, &ProxyTarget::api("/ugcPosts"), ProxyBody::Json(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.to_string(),
            "API call failed. Status: 401. Details: Invalid access token"
        );
    }

    #[tokio::test]
    async fn test_raw_error_is_truncated() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_response(HttpResponse::new(502).with_body("x".repeat(300)));
        let err = proxy(transport)
            .call(HttpMethod::Put, &ProxyTarget::external("https://up.test/1"), ProxyBody::Binary(vec![1]))
            .await
            .unwrap_err();
        let expected = format!("API call failed. Status: 502. Raw response: {}", "x".repeat(100));
        assert_eq!(err.to_string(), expected);
    }
}
