use async_trait::async_trait;
use parley_core::{InvocationMode, ParleyError, Result, Turn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request to a chat endpoint, in wire shape.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Turn>,
    /// Capability definitions; omitted when no capability is registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<Value>>,
    /// Invocation mode; sent only together with `functions`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<InvocationMode>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Turn>) -> Self {
        Self {
            model: model.into(),
            messages,
            functions: None,
            function_call: None,
        }
    }

    /// Attach capability definitions and the mode governing them.
    pub fn with_functions(mut self, functions: Vec<Value>, mode: InvocationMode) -> Self {
        self.functions = Some(functions);
        self.function_call = Some(mode);
        self
    }
}

/// A parsed chat completion body. Success bodies carry `choices`, error
/// bodies carry `error`; neither is guaranteed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<Turn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// The `error` object of an endpoint response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl ChatCompletion {
    /// A completion holding a single reply turn.
    pub fn from_reply(reply: Turn) -> Self {
        Self {
            choices: vec![Choice {
                message: Some(reply),
                finish_reason: None,
            }],
            ..Default::default()
        }
    }

    /// Extract `choices[0].message`. A missing reply becomes a transport
    /// error carrying the endpoint's own `error.message` and `error.type`.
    pub fn into_reply(self) -> Result<Turn> {
        if let Some(reply) = self.choices.into_iter().next().and_then(|c| c.message) {
            return Ok(reply);
        }
        Err(match self.error {
            Some(err) => err.into(),
            None => ParleyError::transport("endpoint response contained no reply"),
        })
    }
}

impl From<ApiError> for ParleyError {
    fn from(err: ApiError) -> Self {
        ParleyError::Transport {
            message: err
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "endpoint returned an error without a message".into()),
            error_type: err.error_type,
        }
    }
}

/// Trait implemented by each chat endpoint (OpenAI-compatible HTTP, mock).
#[async_trait]
pub trait ChatEndpoint: Send + Sync {
    /// Human-readable name, e.g. "openai".
    fn name(&self) -> &str;

    /// Send one request and return the parsed body.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion>;
}
