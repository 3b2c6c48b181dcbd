//! Compatibility shim: derive parameter specs from `@param` documentation.
//!
//! Rust callables carry no runtime signature, so the caller supplies the
//! documentation text and the names of parameters that have defaults. Each
//! line of the form
//!
//! ```text
//! @param <type> <name> <description...>
//! ```
//!
//! becomes one [`ParameterSpec`]. Parameters without such a line are left out
//! of the schema entirely; nothing checks the documented names against the
//! handler. `array<elem>` declares an array of `elem`.

use serde_json::{Value, json};

use crate::capability::{Capability, CapabilityHandler, CapabilitySchema, ParamType, ParameterSpec};
use crate::error::{ParleyError, Result};

const PARAM_TAG: &str = "@param";

/// Parse every `@param` line of `doc`. A parameter is required unless its
/// name appears in `defaults`.
pub fn parse_doc_params(doc: &str, defaults: &[&str]) -> Result<Vec<ParameterSpec>> {
    let mut params = Vec::new();
    for line in doc.lines() {
        let Some(rest) = line
            .trim_start()
            .strip_prefix(PARAM_TAG)
            .filter(|r| r.starts_with(char::is_whitespace))
        else {
            continue;
        };
        let mut parts = rest.split_whitespace();
        let (Some(type_tag), Some(name)) = (parts.next(), parts.next()) else {
            continue;
        };
        let description = parts.collect::<Vec<_>>().join(" ");

        let mut spec = ParameterSpec::required(name, parse_type(type_tag, name)?, description);
        spec.required = !defaults.contains(&name);
        if let Some(elem) = array_element(type_tag) {
            spec.items = Some(items_schema(elem, name)?);
        }
        params.push(spec);
    }
    Ok(params)
}

/// The prose part of `doc`: every non-empty line that is not a `@param` line.
pub fn doc_description(doc: &str) -> String {
    doc.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with(PARAM_TAG))
        .collect::<Vec<_>>()
        .join(" ")
}

fn array_element(tag: &str) -> Option<&str> {
    tag.strip_prefix("array<")?.strip_suffix('>')
}

/// Element schema for `array<tag>`, descending through nested arrays.
fn items_schema(tag: &str, param: &str) -> Result<Value> {
    let elem_type = parse_type(tag, param)?;
    let mut schema = json!({ "type": elem_type });
    if let Some(inner) = array_element(tag) {
        schema["items"] = items_schema(inner, param)?;
    }
    Ok(schema)
}

fn parse_type(tag: &str, param: &str) -> Result<ParamType> {
    if array_element(tag).is_some() {
        return Ok(ParamType::Array);
    }
    match ParamType::parse(tag) {
        Some(ParamType::Array) => Err(ParleyError::Configuration(format!(
            "parameter '{param}': write array<type> to declare the element type"
        ))),
        Some(t) => Ok(t),
        None => Err(ParleyError::Configuration(format!(
            "parameter '{param}': unknown type '{tag}'"
        ))),
    }
}

impl Capability {
    /// Build a callable capability from its documentation text.
    pub fn from_documented(
        name: impl Into<String>,
        doc: &str,
        defaults: &[&str],
        handler: impl CapabilityHandler + 'static,
    ) -> Result<Self> {
        let schema = CapabilitySchema {
            name: name.into(),
            description: doc_description(doc),
            parameters: parse_doc_params(doc, defaults)?,
        };
        Ok(Capability::callable(schema, handler))
    }
}
