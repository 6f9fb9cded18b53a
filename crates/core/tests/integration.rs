use std::time::Duration;

use mockito::Matcher;
use serde_json::{json, Value};

use toolcall_eval_core::ai_client::{AiClient, ChatRequest};
use toolcall_eval_core::dispatcher::ToolDispatcher;
use toolcall_eval_core::label::{extract_label, Label};
use toolcall_eval_core::openai_client::OpenAiClient;
use toolcall_eval_core::tools::{tool_definitions, JOKE_ERROR};
use toolcall_eval_core::trace_store::{PhoenixTraceStore, TraceStore};
use toolcall_eval_core::types::{Evaluation, SpanContext, SpanRecord, StatusCode};

fn client(server: &mockito::ServerGuard) -> OpenAiClient {
    OpenAiClient::new(&server.url(), "gpt-test", "sk-test", Duration::from_secs(5)).unwrap()
}

#[test]
fn test_model_tool_call_is_dispatched() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({"tool_choice": "auto"})))
        .with_status(200)
        .with_body(
            json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_abc",
                            "type": "function",
                            "function": {
                                "name": "get_current_weather",
                                "arguments": "{\"location\": \"Paris\", \"unit\": \"celsius\"}"
                            }
                        }]
                    }
                }]
            })
            .to_string(),
        )
        .create();

    let client = client(&server);
    let resp = client
        .chat(ChatRequest::user("Weather in Paris?").with_tools(tool_definitions()))
        .unwrap();
    let calls = resp.first_message().unwrap().tool_calls.clone().unwrap();

    let dispatcher = ToolDispatcher::new(&client);
    let result = dispatcher.dispatch_call(&calls[0]);

    assert!(!result.is_error);
    let weather: Value = serde_json::from_str(&result.value).unwrap();
    assert_eq!(weather["location"], "Paris");
    assert_eq!(weather["unit"], "celsius");
}

#[test]
fn test_joke_tool_degrades_on_upstream_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("overloaded")
        .create();

    let client = client(&server);
    let dispatcher = ToolDispatcher::new(&client);
    assert_eq!(
        dispatcher.dispatch("generate_joke", &serde_json::Map::new()),
        JOKE_ERROR
    );
}

#[test]
fn test_joke_tool_returns_model_text() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(
            r#"{"choices":[{"message":{"role":"assistant","content":"I used to be a banker, but I lost interest."}}]}"#,
        )
        .create();

    let client = client(&server);
    let out = ToolDispatcher::new(&client).dispatch("generate_joke", &serde_json::Map::new());
    assert_eq!(out, "I used to be a banker, but I lost interest.");
}

#[test]
fn test_judge_reply_label_uploaded() {
    let mut server = mockito::Server::new();
    let upload = server
        .mock("POST", "/v1/span_annotations")
        .match_body(Matcher::PartialJson(json!({
            "data": [{"span_id": "0123456789abcdef", "result": {"label": "VALID", "score": 1.0}}]
        })))
        .with_status(200)
        .create();

    let span = SpanRecord {
        context: SpanContext {
            trace_id: "0123456789abcdef0123456789abcdef".into(),
            span_id: "0123456789abcdef".into(),
        },
        parent_id: None,
        name: "ChatCompletion".into(),
        span_kind: "LLM".into(),
        status_code: StatusCode::Ok,
        status_message: None,
        start_time: chrono::Utc::now(),
        end_time: chrono::Utc::now(),
        attributes: serde_json::Map::new(),
    };

    let judged = extract_label("The weather tool fits the question.\nLABEL: VALID").unwrap();
    assert_eq!(judged.label, Label::Valid);
    let eval = Evaluation::new(&span, "Tool Calling Eval", judged);

    let store =
        PhoenixTraceStore::new(&server.url(), "default", None, Duration::from_secs(5)).unwrap();
    store.log_evaluations(&[eval]).unwrap();
    upload.assert();
}
