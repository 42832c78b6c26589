//! Test doubles shared by the component test suites.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{PostPilotError, Result};
use crate::http::{HttpRequest, HttpResponse, HttpTransport};

/// One queued reply of a [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Respond(HttpResponse),
    Fail(PostPilotError),
    /// Waits (on the tokio clock) before producing the inner reply.
    Delayed(Duration, Box<ScriptedReply>),
}

/// Transport that answers from a queue and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        let transport = Self::new();
        for reply in replies {
            transport.push(reply);
        }
        transport
    }

    pub fn push(&self, reply: ScriptedReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn push_response(&self, response: HttpResponse) {
        self.push(ScriptedReply::Respond(response));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn remaining_replies(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        let mut reply = next.ok_or_else(|| {
            PostPilotError::Network(format!(
                "no scripted reply for {} {}",
                request.method,
                request.redacted_url()
            ))
        })?;

        loop {
            match reply {
                ScriptedReply::Respond(response) => return Ok(response),
                ScriptedReply::Fail(err) => return Err(err),
                ScriptedReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}
