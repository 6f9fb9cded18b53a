// crates/host/src/agents/assistant/mod.rs

//! Function-calling assistant: one model request per query, local tool
//! dispatch, and a span recorded for every turn.

mod prompts;
mod tool_defs;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use toolcall_eval_core::ai_client::{AiClient, ChatMessage, ChatRequest};
use toolcall_eval_core::dispatcher::{ToolDispatcher, ToolResult};
use toolcall_eval_core::trace_store::TraceStore;
use toolcall_eval_core::types::{attr, SpanContext, SpanRecord, StatusCode};

use crate::log::{self, Agent as LogAgent};

pub const SPAN_NAME: &str = "ChatCompletion";

/// Outcome of one assistant turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub output: String,
    pub tool_results: Vec<ToolResult>,
    pub span: SpanRecord,
}

pub struct Assistant<'a, C: AiClient> {
    client: &'a C,
    store: &'a dyn TraceStore,
}

impl<'a, C: AiClient> Assistant<'a, C> {
    pub fn new(client: &'a C, store: &'a dyn TraceStore) -> Self {
        Self { client, store }
    }

    /// Answer `query`, calling tools if the model asks for them.
    ///
    /// The span is exported even when the model call fails; a failed export
    /// is logged and does not fail the turn.
    pub fn run(&self, query: &str) -> Result<Turn> {
        let start = Utc::now();
        let messages = vec![
            json!({ "role": "system", "content": prompts::ASSISTANT_PROMPT }),
            json!({ "role": "user", "content": query }),
        ];

        log::step(LogAgent::Assistant, "chat request", messages.len());
        let request =
            ChatRequest::new(messages).with_tools(tool_defs::assistant_tool_definitions());

        let msg = match self.request(request) {
            Ok(msg) => msg,
            Err(e) => {
                let mut span = self.span(start, query, None);
                span.status_code = StatusCode::Error;
                span.status_message = Some(format!("{e:#}"));
                self.export(&span);
                return Err(e);
            }
        };

        let mut attributes = Map::new();
        let mut tool_results = Vec::new();

        let output = match msg.tool_calls.as_deref() {
            Some(calls) if !calls.is_empty() => {
                if let Some(first) = calls.first() {
                    attributes.insert(attr::TOOL_NAME.into(), json!(first.function.name));
                    attributes.insert(
                        attr::TOOL_PARAMETERS.into(),
                        json!(first.function.arguments),
                    );
                }

                let dispatcher = ToolDispatcher::new(self.client);
                for tc in calls {
                    log::tool_call(LogAgent::Assistant, &tc.function.name, &tc.function.arguments);
                    let result = dispatcher.dispatch_call(tc);
                    log::tool_result(LogAgent::Assistant, &result.name, &result.value, result.is_error);
                    tool_results.push(result);
                }

                tool_results
                    .iter()
                    .map(|r| r.value.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            _ => {
                let content = msg
                    .content
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| "<no content>".to_string());
                log::response(LogAgent::Assistant, &content);
                content
            }
        };

        let mut span = self.span(start, query, Some(&output));
        span.status_code = StatusCode::Ok;
        span.attributes.extend(attributes);
        self.export(&span);

        log::done(LogAgent::Assistant, format!("span {}", span.span_id()));
        Ok(Turn {
            output,
            tool_results,
            span,
        })
    }

    fn request(&self, request: ChatRequest) -> Result<ChatMessage> {
        let response = self.client.chat(request)?;
        response
            .first_message()
            .cloned()
            .context("no choices in chat response")
    }

    fn span(&self, start: DateTime<Utc>, query: &str, output: Option<&str>) -> SpanRecord {
        let mut attributes = Map::new();
        attributes.insert(attr::SPAN_KIND.into(), json!("LLM"));
        attributes.insert(attr::INPUT_VALUE.into(), json!(query));
        attributes.insert(attr::MODEL_NAME.into(), json!(self.client.model_name()));
        if let Some(out) = output {
            attributes.insert(attr::OUTPUT_VALUE.into(), Value::String(out.to_string()));
        }

        SpanRecord {
            context: SpanContext::new_root(),
            parent_id: None,
            name: SPAN_NAME.to_string(),
            span_kind: "LLM".to_string(),
            status_code: StatusCode::Unset,
            status_message: None,
            start_time: start,
            end_time: Utc::now(),
            attributes,
        }
    }

    fn export(&self, span: &SpanRecord) {
        if let Err(e) = self.store.export_span(span) {
            log::error(LogAgent::Assistant, format!("failed to export span: {e:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use toolcall_eval_core::ai_client::ChatResponse;
    use toolcall_eval_core::tools::JOKE_ERROR;
    use toolcall_eval_core::trace_store::MemoryTraceStore;

    /// Replays canned replies in order; `None` simulates an upstream failure.
    struct ScriptedClient {
        replies: RefCell<VecDeque<Option<Value>>>,
        requests: RefCell<Vec<ChatRequest>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Option<Value>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl AiClient for ScriptedClient {
        fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
            self.requests.borrow_mut().push(request);
            match self.replies.borrow_mut().pop_front().flatten() {
                Some(v) => Ok(serde_json::from_value(v)?),
                None => anyhow::bail!("upstream unavailable"),
            }
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn text_reply(text: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": text}}]})
    }

    fn tool_reply(calls: &[(&str, &str)]) -> Value {
        let calls: Vec<Value> = calls
            .iter()
            .enumerate()
            .map(|(i, (name, args))| {
                json!({
                    "id": format!("call_{i}"),
                    "type": "function",
                    "function": {"name": name, "arguments": args}
                })
            })
            .collect();
        json!({"choices": [{"message": {"role": "assistant", "content": null, "tool_calls": calls}}]})
    }

    #[test]
    fn test_tool_call_turn_records_span() {
        let client = ScriptedClient::new(vec![Some(tool_reply(&[(
            "get_current_weather",
            r#"{"location": "Paris"}"#,
        )]))]);
        let store = MemoryTraceStore::new("default");
        let turn = Assistant::new(&client, &store)
            .run("What's the weather in Paris?")
            .unwrap();

        let weather: Value = serde_json::from_str(&turn.output).unwrap();
        assert_eq!(weather["location"], "Paris");

        let requests = client.requests.borrow();
        assert_eq!(requests[0].tools.len(), 3);
        assert_eq!(requests[0].tool_choice.as_deref(), Some("auto"));

        let spans = store.fetch_spans("default").unwrap();
        assert_eq!(spans.len(), 1);
        let span = &spans[0];
        assert_eq!(span.status_code, StatusCode::Ok);
        assert_eq!(span.input(), Some("What's the weather in Paris?"));
        assert_eq!(span.output(), Some(turn.output.as_str()));
        assert_eq!(span.tool_name(), Some("get_current_weather"));
        assert_eq!(span.attribute(attr::MODEL_NAME), Some("scripted"));
    }

    #[test]
    fn test_multiple_tool_calls_join_results() {
        // The joke tool makes its own model call, which fails here.
        let client = ScriptedClient::new(vec![
            Some(tool_reply(&[
                ("calculate_age", r#"{"birth_year": 2000}"#),
                ("generate_joke", "{}"),
                ("get_stock_price", "{}"),
            ])),
            None,
        ]);
        let store = MemoryTraceStore::new("default");
        let turn = Assistant::new(&client, &store).run("mixed").unwrap();

        let lines: Vec<&str> = turn.output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], JOKE_ERROR);
        assert_eq!(lines[2], "Unknown function: get_stock_price");
        assert!(!turn.tool_results[0].is_error);
        assert!(turn.tool_results[2].is_error);
        assert_eq!(turn.span.tool_name(), Some("calculate_age"));
    }

    #[test]
    fn test_plain_answer_without_tools() {
        let client = ScriptedClient::new(vec![Some(text_reply("Hello there."))]);
        let store = MemoryTraceStore::new("default");
        let turn = Assistant::new(&client, &store).run("hi").unwrap();

        assert_eq!(turn.output, "Hello there.");
        assert!(turn.tool_results.is_empty());
        assert_eq!(turn.span.tool_name(), None);
    }

    #[test]
    fn test_upstream_failure_records_error_span() {
        let client = ScriptedClient::new(vec![None]);
        let store = MemoryTraceStore::new("default");
        let err = Assistant::new(&client, &store).run("hi").unwrap_err();
        assert!(err.to_string().contains("upstream unavailable"));

        let spans = store.fetch_spans("default").unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].status_code, StatusCode::Error);
        assert!(spans[0].output().is_none());
    }

    #[test]
    fn test_empty_choices_is_an_error() {
        let client = ScriptedClient::new(vec![Some(json!({"choices": []}))]);
        let store = MemoryTraceStore::new("default");
        let err = Assistant::new(&client, &store).run("hi").unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }
}
