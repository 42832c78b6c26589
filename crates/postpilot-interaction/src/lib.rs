//! Clients for the external capabilities PostPilot chains together.

pub mod gemini_client;
pub mod idea_source;
pub mod image_synthesizer;
pub mod linkedin_proxy;
pub mod news_client;
pub mod post_composer;
pub mod publish_coordinator;

pub use gemini_client::{GeminiClient, GenerateContentRequest};
pub use idea_source::IdeaSource;
pub use image_synthesizer::ImageSynthesizer;
pub use linkedin_proxy::{LinkedInProxy, ProxyTarget};
pub use news_client::NewsApiClient;
pub use post_composer::PostComposer;
pub use publish_coordinator::PublishCoordinator;
