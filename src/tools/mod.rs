//! Tool catalog data model and registry
//!
//! A `ToolRegistry` owns the wire-ready descriptors (in registration order,
//! which is also `tools/list` order) and the name-keyed async handlers.
//! Argument validation always runs against the registered descriptor's
//! schema, the same value `list()` serializes, so what clients see is what
//! gets enforced.

pub mod catalog;

use crate::canvas::CanvasClient;
use crate::error::{CanvasMcpError, Result};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Wire-ready description of one tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// One tool invocation as requested by a caller
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

fn empty_arguments() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Outcome of dispatching one tool call. `Failure` is a normal, reportable
/// result, not a protocol error.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(Value),
    Failure(String),
}

/// Boxed async handler. The Canvas client arrives per call so the registry
/// itself stays a pure catalog.
pub type ToolHandler =
    Box<dyn Fn(Arc<CanvasClient>, Value) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Box an async closure into a [`ToolHandler`]
pub fn handler<F, Fut>(f: F) -> ToolHandler
where
    F: Fn(Arc<CanvasClient>, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Box::new(move |client, arguments| Box::pin(f(client, arguments)))
}

/// Ordered tool catalog with name-keyed handlers
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Rejects duplicate names and schemas that could never
    /// be satisfied by any arguments.
    pub fn register(&mut self, descriptor: ToolDescriptor, handler: ToolHandler) -> Result<()> {
        validate_schema(&descriptor)?;
        if self.handlers.contains_key(&descriptor.name) {
            return Err(CanvasMcpError::DuplicateTool(descriptor.name));
        }
        self.handlers.insert(descriptor.name.clone(), handler);
        self.tools.push(descriptor);
        Ok(())
    }

    /// Descriptors in registration order
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Find the handler for a tool name
    pub fn lookup(&self, name: &str) -> Result<&ToolHandler> {
        self.handlers
            .get(name)
            .ok_or_else(|| CanvasMcpError::UnknownTool(name.to_string()))
    }

    /// Check arguments against the registered schema for `name`. The error
    /// message lists every problem, each naming its parameter.
    pub fn validate(&self, name: &str, arguments: &Value) -> Result<()> {
        let descriptor = self
            .tools
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| CanvasMcpError::UnknownTool(name.to_string()))?;

        let issues = validate_arguments(&descriptor.input_schema, arguments);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(CanvasMcpError::Validation {
                tool: name.to_string(),
                issues: issues.join("; "),
            })
        }
    }
}

/// Check an argument object against an input schema. Returns one message per
/// problem. Required parameters must be present with a compatible type;
/// declared optional parameters are type-checked when present; undeclared
/// parameters pass through untouched.
pub fn validate_arguments(schema: &Value, arguments: &Value) -> Vec<String> {
    let mut issues = Vec::new();

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let properties = schema.get("properties").and_then(Value::as_object);
    let args = arguments.as_object();

    for name in &required {
        if args.and_then(|a| a.get(*name)).is_none() {
            issues.push(format!("missing required parameter '{}'", name));
        }
    }

    if let (Some(properties), Some(args)) = (properties, args) {
        for (name, value) in args {
            let Some(declared) = properties.get(name) else {
                continue;
            };
            if let Some(expected) = declared.get("type").and_then(Value::as_str) {
                if !type_matches(expected, value) {
                    issues.push(format!(
                        "parameter '{}' must be a {}, got {}",
                        name,
                        expected,
                        json_type_name(value)
                    ));
                }
            }
        }
    }

    issues
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

const SUPPORTED_TYPES: &[&str] = &[
    "number", "integer", "string", "boolean", "object", "array", "null",
];

/// A descriptor is registrable only if its schema is an object schema, every
/// required name is declared in properties, and every declared type is one
/// the validator knows how to check.
fn validate_schema(descriptor: &ToolDescriptor) -> Result<()> {
    let schema = &descriptor.input_schema;
    let invalid = |reason: String| CanvasMcpError::InvalidSchema {
        tool: descriptor.name.clone(),
        reason,
    };

    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Err(invalid("root type must be \"object\"".to_string()));
    }

    let properties = schema.get("properties").and_then(Value::as_object);

    if let Some(required) = schema.get("required") {
        let names = required
            .as_array()
            .ok_or_else(|| invalid("\"required\" must be an array".to_string()))?;
        for name in names {
            let name = name
                .as_str()
                .ok_or_else(|| invalid("\"required\" entries must be strings".to_string()))?;
            if properties.and_then(|p| p.get(name)).is_none() {
                return Err(invalid(format!(
                    "required parameter '{}' is not declared in properties",
                    name
                )));
            }
        }
    }

    if let Some(properties) = properties {
        for (name, declared) in properties {
            if let Some(declared_type) = declared.get("type").and_then(Value::as_str) {
                if !SUPPORTED_TYPES.contains(&declared_type) {
                    return Err(invalid(format!(
                        "parameter '{}' has unsupported type '{}'",
                        name, declared_type
                    )));
                }
            }
        }
    }

    Ok(())
}
