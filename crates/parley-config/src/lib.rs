//! # parley-config
//!
//! Configuration for Parley. Reads `parley.toml`, then applies environment
//! variable overrides.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{
    ConfigWarning, DispatchConfig, EndpointConfig, LoggingConfig, ParleyConfig, SessionConfig,
    WarningSeverity,
};
