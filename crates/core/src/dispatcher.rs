// crates/core/src/dispatcher.rs

//! Routes model-emitted tool calls to the local tool functions.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::ai_client::{AiClient, ChatToolCall};
use crate::tools::{self, AgeArgs, Tool, WeatherArgs};

/// A parsed tool call: function name plus its decoded JSON arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub function_name: String,
    pub arguments: Map<String, Value>,
}

impl ToolCallRequest {
    /// Decode the JSON-encoded argument string of a chat tool call.
    ///
    /// An empty string counts as no arguments.
    pub fn from_chat(tc: &ChatToolCall) -> Result<Self, serde_json::Error> {
        let raw = tc.function.arguments.trim();
        let arguments = if raw.is_empty() {
            Map::new()
        } else {
            serde_json::from_str::<Map<String, Value>>(raw)?
        };
        Ok(Self {
            function_name: tc.function.name.clone(),
            arguments,
        })
    }
}

/// Output of one tool call, ready to attach to a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub name: String,
    pub value: String,
    pub is_error: bool,
}

/// Closed dispatch over [`Tool`]. Every outcome is a string; nothing here
/// fails the surrounding turn.
pub struct ToolDispatcher<'a, C: AiClient> {
    client: &'a C,
}

impl<'a, C: AiClient> ToolDispatcher<'a, C> {
    /// `client` backs the tools that call the model themselves.
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Run `function_name` with `arguments` and return its result as text.
    pub fn dispatch(&self, function_name: &str, arguments: &Map<String, Value>) -> String {
        let Some(tool) = Tool::from_name(function_name) else {
            tracing::warn!(function = function_name, "model requested an unknown function");
            return unknown_function(function_name);
        };

        if let Err(e) = tool.spec().validate(arguments) {
            tracing::warn!(function = function_name, error = %e, "rejected tool arguments");
            return invalid_arguments(function_name, e);
        }

        match tool {
            Tool::GenerateJoke => tools::generate_joke(self.client),
            Tool::GetCurrentWeather => match decode::<WeatherArgs>(arguments) {
                Ok(args) => {
                    let report = tools::get_current_weather(&args.location, args.unit.as_deref());
                    serde_json::to_string(&report)
                        .unwrap_or_else(|e| invalid_arguments(function_name, e))
                }
                Err(e) => invalid_arguments(function_name, e),
            },
            Tool::CalculateAge => match decode::<AgeArgs>(arguments) {
                Ok(args) => match tools::calculate_age(args.birth_year) {
                    Some(age) => age.to_string(),
                    None => invalid_arguments(
                        function_name,
                        format_args!("birth_year {} is out of range", args.birth_year),
                    ),
                },
                Err(e) => invalid_arguments(function_name, e),
            },
        }
    }

    /// Decode and dispatch a raw chat tool call.
    pub fn dispatch_call(&self, tc: &ChatToolCall) -> ToolResult {
        let name = tc.function.name.clone();
        let value = match ToolCallRequest::from_chat(tc) {
            Ok(req) => self.dispatch(&req.function_name, &req.arguments),
            Err(e) => format!("Error: Could not parse arguments for {}: {}", name, e),
        };
        let is_error = is_sentinel(&value);
        ToolResult {
            name,
            value,
            is_error,
        }
    }
}

fn decode<T: DeserializeOwned>(arguments: &Map<String, Value>) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(arguments.clone()))
}

fn unknown_function(name: &str) -> String {
    format!("Unknown function: {}", name)
}

fn invalid_arguments(name: &str, reason: impl std::fmt::Display) -> String {
    format!("Error: Invalid arguments for {}: {}", name, reason)
}

fn is_sentinel(value: &str) -> bool {
    value.starts_with("Unknown function: ") || value.starts_with("Error: ")
}
