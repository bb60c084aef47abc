//! Clients for the hosted model APIs the platform delegates to.

pub mod gemini;
pub mod huggingface;

pub use gemini::{ChatContent, ChatPart, GeminiClient};
pub use huggingface::{Classification, HuggingFaceClient, UpstreamStatus};
