//! The dispatch chain: request a reply, execute any capability the model
//! asks for, feed the result back, and repeat until the model answers.

use std::sync::Arc;

use tracing::{debug, info, warn};

use parley_config::ParleyConfig;
use parley_core::{Invocation, ParleyError, Result, Turn};
use parley_llm::{ChatEndpoint, ChatRequest, OpenAiEndpoint};

use crate::session::{Session, SharedSession};

pub const DEFAULT_MAX_DEPTH: u32 = 16;

/// Drives a session against a chat endpoint.
pub struct Dispatcher {
    endpoint: Arc<dyn ChatEndpoint>,
    max_depth: u32,
}

impl Dispatcher {
    pub fn new(endpoint: Arc<dyn ChatEndpoint>) -> Self {
        Self {
            endpoint,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Cap the number of capability executions within one `respond` chain.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build an OpenAI-compatible dispatcher from loaded configuration.
    pub fn from_config(config: &ParleyConfig) -> Result<Self> {
        let api_key = config
            .endpoint
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ParleyError::Configuration(
                    "no API key: set endpoint.api_key or OPENAI_API_KEY".into(),
                )
            })?;
        let endpoint = OpenAiEndpoint::new(api_key).with_base_url(&config.endpoint.base_url);
        Ok(Self::new(Arc::new(endpoint)).with_max_depth(config.dispatch.max_depth))
    }

    pub fn endpoint(&self) -> &Arc<dyn ChatEndpoint> {
        &self.endpoint
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Request the next assistant reply for `session` and resolve any
    /// capability invocations it contains.
    ///
    /// With `raw` set, an invocation in the first reply is returned without
    /// being executed. Every reply and capability result is appended to the
    /// session, so the append hook sees each of them.
    pub async fn respond(&self, session: &mut Session, raw: bool) -> Result<Turn> {
        let mut raw = raw;
        let mut depth: u32 = 0;

        loop {
            let reply = self.request_reply(session).await?;
            session.append(reply.clone())?;

            let Some(invocation) = reply.invocation.as_ref() else {
                return Ok(reply);
            };
            if raw {
                debug!(capability = %invocation.name, "returning raw invocation");
                return Ok(reply);
            }

            if depth >= self.max_depth {
                warn!(
                    conversation = %session.conversation_id(),
                    max_depth = self.max_depth,
                    capability = %invocation.name,
                    "dispatch depth exceeded"
                );
                return Err(ParleyError::DispatchDepthExceeded {
                    max_depth: self.max_depth,
                });
            }
            depth += 1;

            let output = self.execute(session, invocation).await?;
            session.push_capability_result(&invocation.name, output)?;
            raw = false;
        }
    }

    /// Append a user turn and respond to it.
    pub async fn ask(&self, session: &mut Session, text: impl Into<String>) -> Result<Turn> {
        session.push_user(text)?;
        self.respond(session, false).await
    }

    /// Like [`respond`](Self::respond), holding the session lock for the
    /// whole chain.
    pub async fn respond_shared(&self, session: &SharedSession, raw: bool) -> Result<Turn> {
        let mut guard = session.lock().await;
        self.respond(&mut guard, raw).await
    }

    /// Run one invocation. A capability that is unknown, or registered
    /// without a handler, yields the "unavailable" text instead of an error.
    pub async fn execute(&self, session: &Session, invocation: &Invocation) -> Result<String> {
        let handler = session
            .capabilities()
            .resolve(&invocation.name)
            .and_then(|c| c.handler().cloned());

        let Some(handler) = handler else {
            warn!(capability = %invocation.name, "capability unavailable");
            return Ok(unavailable(&invocation.name));
        };

        debug!(capability = %invocation.name, "executing capability");
        let output = handler.invoke(&invocation.arguments).await?;
        debug!(capability = %invocation.name, output_len = output.len(), "capability finished");
        Ok(output)
    }

    async fn request_reply(&self, session: &Session) -> Result<Turn> {
        let mut request = ChatRequest::new(session.model(), session.turns().to_vec());
        if !session.capabilities().is_empty() {
            request = request.with_functions(
                session.capabilities().to_wire_schema(),
                session.invocation_mode().clone(),
            );
        }

        info!(
            endpoint = %self.endpoint.name(),
            conversation = %session.conversation_id(),
            model = %request.model,
            messages = request.messages.len(),
            functions = request.functions.as_ref().map_or(0, Vec::len),
            "requesting reply"
        );

        self.endpoint.complete(&request).await?.into_reply()
    }
}

fn unavailable(name: &str) -> String {
    format!("Function '{name}' unavailable.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_text() {
        assert_eq!(unavailable("echo"), "Function 'echo' unavailable.");
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let config = ParleyConfig::default();
        assert!(matches!(
            Dispatcher::from_config(&config),
            Err(ParleyError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_config_applies_depth() {
        let mut config = ParleyConfig::default();
        config.endpoint.api_key = Some("sk-test".into());
        config.dispatch.max_depth = 3;
        let d = Dispatcher::from_config(&config).unwrap();
        assert_eq!(d.max_depth(), 3);
        assert_eq!(d.endpoint().name(), "openai");
    }
}
