//! # parley-runtime
//!
//! Conversation sessions and the dispatch chain that drives them.
//!
//! ```text
//!   Session ──────────────┐
//!    ├ MessageLog          │ respond()
//!    ├ CapabilityRegistry  ▼
//!    ├ InvocationMode   Dispatcher ──► ChatEndpoint
//!    └ PersistenceHooks    │
//!                          └─ invocation? execute → append result → repeat
//! ```

pub mod dispatch;
pub mod hooks;
pub mod log;
pub mod registry;
pub mod session;
pub mod telemetry;

pub use dispatch::{DEFAULT_MAX_DEPTH, Dispatcher};
pub use hooks::{AppendHook, LoadHook, PersistenceHooks};
pub use log::MessageLog;
pub use registry::CapabilityRegistry;
pub use session::{DEFAULT_MODEL, Session, SharedSession};
pub use telemetry::init_tracing;
