use serde::{Deserialize, Serialize};

/// Root configuration — maps to `parley.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParleyConfig {
    pub endpoint: EndpointConfig,
    pub session: SessionConfig,
    pub dispatch: DispatchConfig,
    pub logging: LoggingConfig,
}

// ── Endpoint ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL of the OpenAI-compatible API; `/chat/completions` is appended.
    pub base_url: String,
    /// Bearer credential. Falls back to `OPENAI_API_KEY` when unset.
    pub api_key: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key: None,
        }
    }
}

// ── Session ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Model identifier sent with every request.
    pub model: String,
    /// System turn appended when a fresh session is created.
    pub system_prompt: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            system_prompt: None,
        }
    }
}

// ── Dispatch ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum capability executions within one `respond` chain.
    pub max_depth: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { max_depth: 16 }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
        };
        write!(f, "{}: {}: {}", label, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl ParleyConfig {
    /// Validate the config and return a list of warnings.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Endpoint ───
        let url = &self.endpoint.base_url;
        if url.is_empty() {
            warnings.push(ConfigWarning {
                field: "endpoint.base_url".into(),
                message: "base URL is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 'https://api.openai.com/v1'".into()),
            });
        } else if !url.starts_with("http://") && !url.starts_with("https://") {
            warnings.push(ConfigWarning {
                field: "endpoint.base_url".into(),
                message: format!("'{}' is not an http(s) URL", url),
                severity: WarningSeverity::Error,
                hint: None,
            });
        } else if url.ends_with('/') {
            warnings.push(ConfigWarning {
                field: "endpoint.base_url".into(),
                message: "trailing slash will be stripped".into(),
                severity: WarningSeverity::Warning,
                hint: None,
            });
        }

        if self.endpoint.api_key.as_deref().is_none_or(str::is_empty) {
            warnings.push(ConfigWarning {
                field: "endpoint.api_key".into(),
                message: "no API key configured".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set endpoint.api_key or export OPENAI_API_KEY".into()),
            });
        }

        // ── Session model ───
        if self.session.model.trim().is_empty() {
            warnings.push(ConfigWarning {
                field: "session.model".into(),
                message: "model is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 'gpt-4o' or 'gpt-3.5-turbo'".into()),
            });
        }

        // ── Dispatch depth ───
        if self.dispatch.max_depth == 0 {
            warnings.push(ConfigWarning {
                field: "dispatch.max_depth".into(),
                message: "max_depth is 0 — every capability call will fail".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set to e.g. 16".into()),
            });
        }

        // ── Logging format ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        // ── Logging level ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
