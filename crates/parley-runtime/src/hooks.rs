use std::sync::Arc;

use parley_core::{Result, Turn};

/// Persists each turn as it is appended.
pub trait AppendHook: Send + Sync {
    fn on_append(&self, turn: &Turn, conversation_id: &str) -> Result<()>;
}

/// Returns the prior history of a conversation, or an empty list for a new one.
pub trait LoadHook: Send + Sync {
    fn on_load(&self, conversation_id: &str) -> Result<Vec<Turn>>;
}

impl<F> AppendHook for F
where
    F: Fn(&Turn, &str) -> Result<()> + Send + Sync,
{
    fn on_append(&self, turn: &Turn, conversation_id: &str) -> Result<()> {
        self(turn, conversation_id)
    }
}

impl<F> LoadHook for F
where
    F: Fn(&str) -> Result<Vec<Turn>> + Send + Sync,
{
    fn on_load(&self, conversation_id: &str) -> Result<Vec<Turn>> {
        self(conversation_id)
    }
}

/// The two optional persistence slots of a session.
#[derive(Clone, Default)]
pub struct PersistenceHooks {
    pub on_append: Option<Arc<dyn AppendHook>>,
    pub on_load: Option<Arc<dyn LoadHook>>,
}

impl std::fmt::Debug for PersistenceHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceHooks")
            .field("on_append", &self.on_append.is_some())
            .field("on_load", &self.on_load.is_some())
            .finish()
    }
}
