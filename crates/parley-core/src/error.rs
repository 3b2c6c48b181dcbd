use thiserror::Error;

/// Unified error type for the Parley orchestration engine.
#[derive(Error, Debug)]
pub enum ParleyError {
    // ── Configuration errors ───────────────────────────────────
    #[error("configuration error: {0}")]
    Configuration(String),

    // ── Endpoint errors ────────────────────────────────────────
    #[error("transport error: {}", describe_transport(.message, .error_type.as_deref()))]
    Transport {
        message: String,
        error_type: Option<String>,
    },

    // ── Dispatch errors ────────────────────────────────────────
    #[error("dispatch depth exceeded: more than {max_depth} capability calls in one chain")]
    DispatchDepthExceeded { max_depth: u32 },

    // ── Capability errors ──────────────────────────────────────
    #[error("capability already registered: {0}")]
    DuplicateCapability(String),

    #[error("capability execution failed: {capability}: {reason}")]
    CapabilityExecution { capability: String, reason: String },

    // ── Persistence errors ─────────────────────────────────────
    #[error("persistence error: {0}")]
    Persistence(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ParleyError {
    /// A transport failure with no endpoint-supplied type.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            error_type: None,
        }
    }
}

fn describe_transport(message: &str, error_type: Option<&str>) -> String {
    match error_type {
        Some(t) => format!("{message} ({t})"),
        None => message.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ParleyError>;
