use async_trait::async_trait;
use parley_core::{ParleyError, Result};
use tracing::{debug, info, warn};

use crate::provider::*;

/// OpenAI-compatible chat completions endpoint (OpenAI, Azure, vLLM, etc.)
///
/// No timeout and no retry: a stalled endpoint blocks the caller, and any
/// failure is returned as [`ParleyError::Transport`].
pub struct OpenAiEndpoint {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    endpoint_name: String,
}

impl OpenAiEndpoint {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".into(),
            endpoint_name: "openai".into(),
        }
    }

    /// Use a custom base URL (for Azure, Together, vLLM, etc.)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.endpoint_name = name.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatEndpoint for OpenAiEndpoint {
    fn name(&self) -> &str {
        &self.endpoint_name
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        debug!(
            endpoint = %self.endpoint_name,
            model = %request.model,
            messages = request.messages.len(),
            functions = request.functions.as_ref().map_or(0, Vec::len),
            "sending chat request"
        );

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| ParleyError::transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ParleyError::transport(e.to_string()))?;

        if !status.is_success() {
            warn!(endpoint = %self.endpoint_name, %status, "chat request failed");
            return Err(match serde_json::from_str::<ChatCompletion>(&text) {
                Ok(ChatCompletion {
                    error: Some(err), ..
                }) => err.into(),
                _ => ParleyError::transport(format!("HTTP {status}: {text}")),
            });
        }

        let completion: ChatCompletion = serde_json::from_str(&text)
            .map_err(|e| ParleyError::transport(format!("malformed response: {e}")))?;

        if let Some(usage) = &completion.usage {
            info!(
                endpoint = %self.endpoint_name,
                model = %request.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat request completed"
            );
        }

        Ok(completion)
    }
}
