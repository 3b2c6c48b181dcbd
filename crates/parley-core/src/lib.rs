//! # parley-core
//!
//! Core types for the Parley conversation engine: turns, capability
//! descriptions, invocation modes and the shared error type. Every other crate
//! in the workspace speaks in these terms.

pub mod capability;
pub mod docs;
pub mod error;
pub mod message;
pub mod types;

pub use capability::{
    Capability, CapabilityHandler, CapabilitySchema, FnHandler, ParamType, ParameterSpec, handler_fn,
};
pub use docs::{doc_description, parse_doc_params};
pub use error::{ParleyError, Result};
pub use message::{Invocation, Role, Turn};
pub use types::{ConversationId, InvocationMode};
