use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::error::{ParleyError, Result};

/// Opaque, stable key under which a conversation is persisted.
pub type ConversationId = String;

/// How the model may invoke capabilities on the next request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InvocationMode {
    /// The model decides whether and which capability to call.
    #[default]
    Auto,
    /// The model must call exactly this capability.
    Forced {
        name: String,
        arguments: Option<Value>,
    },
}

impl InvocationMode {
    /// Build a mode from a capability name, where the name `"auto"` selects
    /// [`InvocationMode::Auto`]. Supplying arguments together with `"auto"` is
    /// a configuration error.
    pub fn from_parts(name: &str, arguments: Option<Value>) -> Result<Self> {
        if name == "auto" {
            if arguments.as_ref().is_some_and(has_content) {
                return Err(ParleyError::Configuration(
                    "arguments must not be set when the invocation mode is 'auto'".into(),
                ));
            }
            return Ok(InvocationMode::Auto);
        }
        Ok(InvocationMode::Forced {
            name: name.to_string(),
            arguments,
        })
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, InvocationMode::Auto)
    }

    /// Wire form: `"auto"` or `{"name": .., "arguments": ..}`.
    pub fn to_wire(&self) -> Value {
        match self {
            InvocationMode::Auto => json!("auto"),
            InvocationMode::Forced { name, arguments } => {
                let mut v = json!({ "name": name });
                if let Some(args) = arguments {
                    v["arguments"] = args.clone();
                }
                v
            }
        }
    }
}

impl Serialize for InvocationMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

/// `null`, `{}`, `[]` and `""` count as "no arguments".
fn has_content(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Object(m) => !m.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_with_arguments_is_rejected() {
        let err = InvocationMode::from_parts("auto", Some(json!({"x": 1}))).unwrap_err();
        assert!(matches!(err, ParleyError::Configuration(_)));
    }

    #[test]
    fn test_auto_with_empty_arguments_is_fine() {
        assert_eq!(InvocationMode::from_parts("auto", Some(json!({}))).unwrap(), InvocationMode::Auto);
        assert_eq!(InvocationMode::from_parts("auto", None).unwrap(), InvocationMode::Auto);
    }

    #[test]
    fn test_forced_wire_form() {
        let mode = InvocationMode::from_parts("echo", Some(json!({"x": "hi"}))).unwrap();
        assert_eq!(
            serde_json::to_value(&mode).unwrap(),
            json!({"name": "echo", "arguments": {"x": "hi"}})
        );
        let bare = InvocationMode::from_parts("echo", None).unwrap();
        assert_eq!(bare.to_wire(), json!({"name": "echo"}));
        assert_eq!(InvocationMode::Auto.to_wire(), json!("auto"));
    }
}
