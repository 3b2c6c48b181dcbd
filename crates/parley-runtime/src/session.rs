use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tokio::sync::Mutex as TokioMutex;
use tracing::{debug, info};
use uuid::Uuid;

use parley_config::SessionConfig;
use parley_core::{ConversationId, InvocationMode, Result, Turn};

use crate::hooks::{AppendHook, LoadHook, PersistenceHooks};
use crate::log::MessageLog;
use crate::registry::CapabilityRegistry;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

static MODEL_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^gpt-(([0-9]+)\.?([0-9]+)?)").expect("model version pattern must compile")
});

/// A session shared between tasks. Hold the lock for a whole dispatch chain.
pub type SharedSession = Arc<TokioMutex<Session>>;

/// One conversation: its history, capabilities, invocation mode and
/// persistence hooks.
#[derive(Debug)]
pub struct Session {
    conversation_id: ConversationId,
    model: String,
    log: MessageLog,
    capabilities: CapabilityRegistry,
    mode: InvocationMode,
    hooks: PersistenceHooks,
    hydrated: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh session with a random conversation id.
    pub fn new() -> Self {
        Self::with_conversation_id(Uuid::new_v4().to_string())
    }

    pub fn with_conversation_id(conversation_id: impl Into<ConversationId>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            model: DEFAULT_MODEL.to_string(),
            log: MessageLog::new(),
            capabilities: CapabilityRegistry::new(),
            mode: InvocationMode::Auto,
            hooks: PersistenceHooks::default(),
            hydrated: false,
        }
    }

    /// Build a session from config: model, then the system prompt if any.
    pub fn from_config(config: &SessionConfig, conversation_id: Option<ConversationId>) -> Result<Self> {
        let mut session = match conversation_id {
            Some(id) => Self::with_conversation_id(id),
            None => Self::new(),
        };
        session.set_model(&config.model);
        if let Some(prompt) = &config.system_prompt {
            session.push_system(prompt)?;
        }
        Ok(session)
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    // ── Model ──────────────────────────────────────────────────

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Numeric version of a `gpt-<major>[.<minor>]` model, e.g. `3.5` for
    /// `gpt-3.5-turbo`; `0.0` for anything else.
    pub fn model_version(&self) -> f64 {
        MODEL_VERSION
            .captures(&self.model)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0.0)
    }

    // ── History ────────────────────────────────────────────────

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn turns(&self) -> &[Turn] {
        self.log.all()
    }

    /// Append a turn, then hand it to the append hook. A hook failure is
    /// returned to the caller; the turn stays in the log.
    pub fn append(&mut self, turn: Turn) -> Result<()> {
        self.log.append(turn);
        if let (Some(hook), Some(turn)) = (&self.hooks.on_append, self.log.last()) {
            hook.on_append(turn, &self.conversation_id)?;
        }
        Ok(())
    }

    pub fn push_system(&mut self, text: impl Into<String>) -> Result<()> {
        self.append(Turn::system(text))
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> Result<()> {
        self.append(Turn::user(text))
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) -> Result<()> {
        self.append(Turn::assistant(text))
    }

    pub fn push_invocation(&mut self, name: impl Into<String>, arguments: impl Into<Value>) -> Result<()> {
        self.append(Turn::invocation(name, arguments))
    }

    pub fn push_capability_result(
        &mut self,
        capability: impl Into<String>,
        output: impl Into<String>,
    ) -> Result<()> {
        self.append(Turn::capability_result(capability, output))
    }

    // ── Capabilities ───────────────────────────────────────────

    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    pub fn capabilities_mut(&mut self) -> &mut CapabilityRegistry {
        &mut self.capabilities
    }

    pub fn invocation_mode(&self) -> &InvocationMode {
        &self.mode
    }

    pub fn set_invocation_mode(&mut self, mode: InvocationMode) {
        self.mode = mode;
    }

    /// Force the model to call `name` on the next requests, or pass `"auto"`
    /// to let it choose. Arguments alongside `"auto"` are rejected and leave
    /// the current mode untouched.
    pub fn force_capability(&mut self, name: &str, arguments: Option<Value>) -> Result<()> {
        self.mode = InvocationMode::from_parts(name, arguments)?;
        debug!(conversation = %self.conversation_id, mode = ?self.mode, "invocation mode changed");
        Ok(())
    }

    // ── Persistence ────────────────────────────────────────────

    /// Install an append hook closure.
    pub fn on_append<F>(&mut self, hook: F)
    where
        F: Fn(&Turn, &str) -> Result<()> + Send + Sync + 'static,
    {
        self.set_append_hook(Arc::new(hook));
    }

    pub fn set_append_hook(&mut self, hook: Arc<dyn AppendHook>) {
        self.hooks.on_append = Some(hook);
    }

    /// Install a load hook closure, hydrating immediately when `autoload`.
    pub fn on_load<F>(&mut self, hook: F, autoload: bool) -> Result<()>
    where
        F: Fn(&str) -> Result<Vec<Turn>> + Send + Sync + 'static,
    {
        self.set_load_hook(Arc::new(hook), autoload)
    }

    pub fn set_load_hook(&mut self, hook: Arc<dyn LoadHook>, autoload: bool) -> Result<()> {
        self.hooks.on_load = Some(hook);
        if autoload {
            self.hydrate()?;
        }
        Ok(())
    }

    pub fn hooks(&self) -> &PersistenceHooks {
        &self.hooks
    }

    /// Replace the history with whatever the load hook returns. Runs the hook
    /// at most once per session and never calls the append hook. Returns
    /// whether hydration happened.
    pub fn hydrate(&mut self) -> Result<bool> {
        if self.hydrated {
            debug!(conversation = %self.conversation_id, "session already hydrated");
            return Ok(false);
        }
        let Some(hook) = self.hooks.on_load.clone() else {
            return Ok(false);
        };
        let turns = hook.on_load(&self.conversation_id)?;
        info!(conversation = %self.conversation_id, turns = turns.len(), "hydrated session");
        self.log.replace(turns);
        self.hydrated = true;
        Ok(true)
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Replay every turn through the append hook. Returns how many turns
    /// were written; zero without a hook.
    pub fn save_all(&self) -> Result<usize> {
        let Some(hook) = &self.hooks.on_append else {
            return Ok(0);
        };
        for turn in self.log.all() {
            hook.on_append(turn, &self.conversation_id)?;
        }
        Ok(self.log.len())
    }

    /// Wrap for shared use across tasks.
    pub fn into_shared(self) -> SharedSession {
        Arc::new(TokioMutex::new(self))
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self.log.all()).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
