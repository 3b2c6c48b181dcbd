//! # parley-llm
//!
//! The chat endpoint seam: request/response wire types, an
//! OpenAI-compatible HTTP client, and a scripted mock for tests.

pub mod mock;
pub mod openai;
pub mod provider;

pub use mock::{MockEndpoint, MockResponse};
pub use openai::OpenAiEndpoint;
pub use provider::{ApiError, ChatCompletion, ChatEndpoint, ChatRequest, Choice, Usage};
