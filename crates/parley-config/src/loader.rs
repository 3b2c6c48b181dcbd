use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use parley_core::{ParleyError, Result};

use crate::schema::ParleyConfig;

/// Loads and reloads the Parley configuration.
pub struct ConfigLoader {
    config: Arc<RwLock<ParleyConfig>>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > PARLEY_CONFIG env > ~/.parley/parley.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("PARLEY_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".parley")
            .join("parley.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            Self::read(&config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            ParleyConfig::default()
        };

        let config = Self::apply_env_overrides(config);

        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(ParleyError::Configuration(e));
            }
        }

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> ParleyConfig {
        self.config.read().clone()
    }

    /// Get a shared reference for subscription.
    pub fn shared(&self) -> Arc<RwLock<ParleyConfig>> {
        Arc::clone(&self.config)
    }

    /// Path the config was loaded from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Reload the config from disk. The current config is kept when the new
    /// file fails to parse or validate.
    pub fn reload(&self) -> Result<()> {
        if !self.config_path.exists() {
            return Err(ParleyError::Configuration(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let new_config = Self::apply_env_overrides(Self::read(&self.config_path)?);
        new_config.validate().map_err(ParleyError::Configuration)?;
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }

    fn read(path: &Path) -> Result<ParleyConfig> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str::<ParleyConfig>(&raw).map_err(|e| {
            ParleyError::Configuration(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    fn apply_env_overrides(config: ParleyConfig) -> ParleyConfig {
        Self::apply_overrides(config, |key| std::env::var(key).ok())
    }

    /// Apply overrides (PARLEY_MODEL, PARLEY_LOG_LEVEL, etc.) read through
    /// `get`, which is the process environment outside of tests.
    pub fn apply_overrides(
        mut config: ParleyConfig,
        get: impl Fn(&str) -> Option<String>,
    ) -> ParleyConfig {
        if let Some(v) = get("PARLEY_MODEL") {
            config.session.model = v;
        }
        if let Some(v) = get("PARLEY_BASE_URL") {
            config.endpoint.base_url = v;
        }
        if let Some(v) = get("PARLEY_MAX_DEPTH") {
            match v.parse::<u32>() {
                Ok(depth) => config.dispatch.max_depth = depth,
                Err(_) => warn!(value = %v, "ignoring non-numeric PARLEY_MAX_DEPTH"),
            }
        }
        if let Some(v) = get("PARLEY_LOG_LEVEL") {
            config.logging.level = v;
        }
        // Config file takes priority, env is the fallback.
        if config.endpoint.api_key.is_none() {
            config.endpoint.api_key = get("OPENAI_API_KEY");
        }
        config
    }
}
