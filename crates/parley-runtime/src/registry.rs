use serde_json::Value;
use tracing::debug;

use parley_core::{Capability, CapabilityHandler, CapabilitySchema, ParleyError, Result, handler_fn};

/// The capabilities a session exposes to the model, in registration order.
///
/// Names are unique: registering a name twice is rejected. Capabilities
/// cannot be removed.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: Vec<Capability>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability after validating its schema.
    pub fn register(&mut self, capability: Capability) -> Result<()> {
        capability.schema.validate()?;
        if self.resolve(capability.name()).is_some() {
            return Err(ParleyError::DuplicateCapability(capability.name().to_string()));
        }
        debug!(
            capability = %capability.name(),
            parameters = capability.schema.parameters.len(),
            callable = capability.handler().is_some(),
            "registered capability"
        );
        self.capabilities.push(capability);
        Ok(())
    }

    /// Register a callable with an explicit parameter specification.
    pub fn register_callable(
        &mut self,
        schema: CapabilitySchema,
        handler: impl CapabilityHandler + 'static,
    ) -> Result<()> {
        self.register(Capability::callable(schema, handler))
    }

    /// Register a synchronous closure.
    pub fn register_fn<F>(&mut self, schema: CapabilitySchema, f: F) -> Result<()>
    where
        F: Fn(&Value) -> Result<String> + Send + Sync + 'static,
    {
        self.register_callable(schema, handler_fn(f))
    }

    /// Register a bare descriptor. The model sees it, but invoking it yields
    /// the "unavailable" result.
    pub fn register_descriptor(&mut self, schema: CapabilitySchema) -> Result<()> {
        self.register(Capability::descriptor(schema))
    }

    /// Register a callable whose parameters come from `@param` documentation.
    /// See [`parley_core::docs`].
    pub fn register_documented(
        &mut self,
        name: &str,
        doc: &str,
        defaults: &[&str],
        handler: impl CapabilityHandler + 'static,
    ) -> Result<()> {
        self.register(Capability::from_documented(name, doc, defaults, handler)?)
    }

    pub fn resolve(&self, name: &str) -> Option<&Capability> {
        self.capabilities.iter().find(|c| c.name() == name)
    }

    /// Function definitions for the chat request, in registration order.
    pub fn to_wire_schema(&self) -> Vec<Value> {
        self.capabilities.iter().map(|c| c.schema.to_wire()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.capabilities.iter().map(Capability::name).collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{ParamType, ParameterSpec};
    use serde_json::json;

    fn schema(name: &str) -> CapabilitySchema {
        CapabilitySchema::new(name, format!("{name} capability"))
    }

    #[test]
    fn test_wire_schema_in_registration_order() {
        let mut reg = CapabilityRegistry::new();
        reg.register_descriptor(
            schema("a")
                .with_parameter(ParameterSpec::required("p", ParamType::String, "p"))
                .with_parameter(ParameterSpec::optional("q", ParamType::Boolean, "q")),
        )
        .unwrap();
        reg.register_fn(
            schema("b").with_parameter(ParameterSpec::required("r", ParamType::Number, "r")),
            |_| Ok(String::new()),
        )
        .unwrap();

        let wire = reg.to_wire_schema();
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0]["name"], "a");
        assert_eq!(wire[1]["name"], "b");
        assert_eq!(wire[0]["parameters"]["required"], json!(["p"]));
        assert_eq!(wire[1]["parameters"]["required"], json!(["r"]));
        assert_eq!(reg.names(), ["a", "b"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut reg = CapabilityRegistry::new();
        reg.register_descriptor(schema("echo")).unwrap();
        let err = reg.register_fn(schema("echo"), |_| Ok("x".into())).unwrap_err();
        assert!(matches!(err, ParleyError::DuplicateCapability(ref n) if n == "echo"));
        assert_eq!(reg.len(), 1);
        assert!(reg.resolve("echo").unwrap().handler().is_none());
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let mut reg = CapabilityRegistry::new();
        let bad = schema("list").with_parameter(ParameterSpec::required("xs", ParamType::Array, "xs"));
        assert!(reg.register_descriptor(bad).is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_repeated_parameter_name_rejected() {
        let mut reg = CapabilityRegistry::new();
        let twice = schema("f")
            .with_parameter(ParameterSpec::required("x", ParamType::String, "x"))
            .with_parameter(ParameterSpec::required("x", ParamType::Integer, "x"));
        assert!(matches!(reg.register_descriptor(twice), Err(ParleyError::Configuration(_))));

        let err = reg
            .register_documented(
                "python",
                "@param string code a\n@param string code b",
                &[],
                handler_fn(|_| Ok(String::new())),
            )
            .unwrap_err();
        assert!(matches!(err, ParleyError::Configuration(_)));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_empty_parameter_name_rejected() {
        let mut reg = CapabilityRegistry::new();
        let blank = schema("f").with_parameter(ParameterSpec::required("", ParamType::String, "x"));
        assert!(matches!(reg.register_descriptor(blank), Err(ParleyError::Configuration(_))));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_documented_nested_array_registers() {
        let mut reg = CapabilityRegistry::new();
        reg.register_documented(
            "g",
            "@param array<array<string>> grid cells",
            &[],
            handler_fn(|_| Ok(String::new())),
        )
        .unwrap();
        let wire = reg.to_wire_schema();
        assert_eq!(
            wire[0]["parameters"]["properties"]["grid"]["items"],
            json!({"type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn test_resolve_missing() {
        let reg = CapabilityRegistry::new();
        assert!(reg.resolve("nope").is_none());
    }

    #[test]
    fn test_register_documented() {
        let mut reg = CapabilityRegistry::new();
        reg.register_documented(
            "greet",
            "Greets someone.\n@param string name Who to greet\n@param string greeting Opening word",
            &["greeting"],
            handler_fn(|_| Ok("hello".into())),
        )
        .unwrap();
        let wire = reg.to_wire_schema();
        assert_eq!(wire[0]["description"], "Greets someone.");
        assert_eq!(wire[0]["parameters"]["required"], json!(["name"]));
    }
}
