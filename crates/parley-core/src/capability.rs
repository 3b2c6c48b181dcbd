use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{ParleyError, Result};

/// JSON-schema type tags the chat endpoint understands for parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Parse a lowercase type tag such as `"string"`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(ParamType::String),
            "number" => Some(ParamType::Number),
            "integer" => Some(ParamType::Integer),
            "boolean" => Some(ParamType::Boolean),
            "array" => Some(ParamType::Array),
            "object" => Some(ParamType::Object),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parameter of a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub description: String,
    /// Element schema; present iff `param_type` is `Array`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
    #[serde(default)]
    pub required: bool,
}

impl ParameterSpec {
    /// A required parameter.
    pub fn required(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            items: None,
            required: true,
        }
    }

    /// An optional parameter.
    pub fn optional(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    /// Attach the element schema of an array parameter.
    pub fn with_items(mut self, items: Value) -> Self {
        self.items = Some(items);
        self
    }

    /// Check the items/array pairing.
    pub fn validate(&self) -> Result<()> {
        match (self.param_type, &self.items) {
            (ParamType::Array, None) => Err(ParleyError::Configuration(format!(
                "parameter '{}' is an array but has no items schema",
                self.name
            ))),
            (t, Some(_)) if t != ParamType::Array => Err(ParleyError::Configuration(format!(
                "parameter '{}' has an items schema but type {}",
                self.name, t
            ))),
            (_, Some(items)) => check_items(&self.name, items),
            _ => Ok(()),
        }
    }
}

/// Nested array element schemas need their own `items` too.
fn check_items(param: &str, items: &Value) -> Result<()> {
    if items.get("type").and_then(Value::as_str) != Some("array") {
        return Ok(());
    }
    match items.get("items") {
        Some(inner) => check_items(param, inner),
        None => Err(ParleyError::Configuration(format!(
            "parameter '{param}' has a nested array without an items schema"
        ))),
    }
}

/// Name, description and parameters of a capability: everything the model sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl CapabilitySchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: vec![],
        }
    }

    pub fn with_parameter(mut self, param: ParameterSpec) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ParleyError::Configuration("capability name is empty".into()));
        }
        let mut seen = HashSet::new();
        for param in &self.parameters {
            if param.name.trim().is_empty() {
                return Err(ParleyError::Configuration(format!(
                    "capability '{}' has a parameter with an empty name",
                    self.name
                )));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(ParleyError::Configuration(format!(
                    "capability '{}' declares parameter '{}' more than once",
                    self.name, param.name
                )));
            }
            param.validate()?;
        }
        Ok(())
    }

    /// The function-definition object sent to the chat endpoint.
    ///
    /// Properties keep declaration order; `required` lists only required
    /// parameters, also in declaration order.
    pub fn to_wire(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.parameters {
            let mut property = json!({
                "type": param.param_type,
                "description": param.description,
            });
            if let Some(items) = &param.items {
                property["items"] = items.clone();
            }
            properties.insert(param.name.clone(), property);
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }

        json!({
            "name": self.name,
            "description": self.description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        })
    }
}

/// Executable side of a capability.
///
/// Receives the raw argument payload exactly as the model produced it and
/// returns the text fed back into the conversation. Errors are not caught by
/// the dispatcher.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    async fn invoke(&self, arguments: &Value) -> Result<String>;
}

/// Adapter turning a plain closure into a [`CapabilityHandler`].
pub struct FnHandler<F>(F);

/// Wrap a synchronous closure as a capability handler.
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&Value) -> Result<String> + Send + Sync + 'static,
{
    FnHandler(f)
}

#[async_trait]
impl<F> CapabilityHandler for FnHandler<F>
where
    F: Fn(&Value) -> Result<String> + Send + Sync + 'static,
{
    async fn invoke(&self, arguments: &Value) -> Result<String> {
        (self.0)(arguments)
    }
}

/// A registered capability: its schema plus, when it came from a callable,
/// the handler that runs it. Descriptor-only capabilities have no handler.
#[derive(Clone)]
pub struct Capability {
    pub schema: CapabilitySchema,
    handler: Option<Arc<dyn CapabilityHandler>>,
}

impl Capability {
    /// A capability backed by an executable handler.
    pub fn callable(schema: CapabilitySchema, handler: impl CapabilityHandler + 'static) -> Self {
        Self {
            schema,
            handler: Some(Arc::new(handler)),
        }
    }

    /// A capability advertised to the model with nothing bound to run it.
    pub fn descriptor(schema: CapabilitySchema) -> Self {
        Self {
            schema,
            handler: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn handler(&self) -> Option<&Arc<dyn CapabilityHandler>> {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("schema", &self.schema)
            .field("callable", &self.handler.is_some())
            .finish()
    }
}
