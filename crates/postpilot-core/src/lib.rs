//! Domain types and seams for PostPilot.
//!
//! PostPilot chains four external capabilities into one workflow:
//! discover ideas, draft a post, illustrate it, publish it. This crate holds
//! what every step shares: the entities, the error taxonomy, configuration,
//! the HTTP transport seam and the deadline primitive.

pub mod config;
pub mod deadline;
pub mod error;
pub mod http;
pub mod idea;
pub mod image;
pub mod json_extract;
pub mod post;
pub mod publish;
pub mod secret;
pub mod topic;
pub mod workflow;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{ComponentOutcome, ErrorEnvelope, PostPilotError, Result};
pub use idea::{IDEA_BATCH_SIZE, Idea};
pub use image::GeneratedImage;
pub use post::DraftPost;
pub use publish::{FallbackDecision, PostHandle, PublishResult};
pub use topic::Topic;
pub use workflow::WorkflowState;

pub use tokio_util::sync::CancellationToken;
