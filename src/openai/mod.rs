//! OpenAI-compatible chat-completions collaborators
//!
//! An async client, a request builder for both calling styles, message
//! history, and a service running one function-calling round trip. The
//! registry itself never depends on this module.

pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod request;
pub mod service;

pub use client::{ChatClient, ChatProvider};
pub use config::ClientConfig;
pub use conversation::Conversation;
pub use error::ClientError;
pub use request::{CallMode, CallStyle, ChatRequestBuilder};
pub use service::FunctionCallingService;
