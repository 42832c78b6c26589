//! Application layer for PostPilot.
//!
//! Coordinates the interaction clients over an explicit workflow state.

pub mod content_workflow;
pub mod publish_support;

pub use content_workflow::{ContentWorkflow, GenerationReport};
pub use publish_support::{FallbackDecider, FixedDecision, NoProgress, ProgressSink};
