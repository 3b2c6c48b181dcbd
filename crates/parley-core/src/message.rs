use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry in the conversation history, in the chat endpoint's wire shape.
///
/// The model's contract is that either `content` or `invocation` carries the
/// meaning of a turn, but both may be present on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    /// Text of the turn. Always serialized, `null` when absent.
    #[serde(default)]
    pub content: Option<String>,
    /// Capability the assistant asks to run.
    #[serde(
        rename = "function_call",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub invocation: Option<Invocation>,
    /// Which capability produced this turn (capability-result turns only).
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Output of an executed capability.
    #[serde(rename = "function")]
    CapabilityResult,
}

/// A request from the model to run a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub name: String,
    /// Raw argument payload exactly as the endpoint supplied it. Usually a
    /// JSON-encoded string; never parsed or validated here.
    #[serde(default)]
    pub arguments: Value,
}

impl Turn {
    fn new(role: Role, content: Option<String>) -> Self {
        Self {
            role,
            content,
            invocation: None,
            capability: None,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, Some(text.into()))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, Some(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, Some(text.into()))
    }

    /// An assistant turn that invokes a capability instead of answering.
    pub fn invocation(name: impl Into<String>, arguments: impl Into<Value>) -> Self {
        Self {
            invocation: Some(Invocation {
                name: name.into(),
                arguments: arguments.into(),
            }),
            ..Self::new(Role::Assistant, None)
        }
    }

    /// The result of running `capability`, fed back to the model.
    pub fn capability_result(capability: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            capability: Some(capability.into()),
            ..Self::new(Role::CapabilityResult, Some(output.into()))
        }
    }

    /// Text content, or the empty string.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    pub fn is_invocation(&self) -> bool {
        self.invocation.is_some()
    }
}
