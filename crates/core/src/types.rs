// crates/core/src/types.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::label::{JudgeResponse, Label};

/// OpenInference attribute keys used on recorded spans.
pub mod attr {
    pub const INPUT_VALUE: &str = "input.value";
    pub const OUTPUT_VALUE: &str = "output.value";
    pub const MODEL_NAME: &str = "llm.model_name";
    pub const TOOL_NAME: &str = "tool.name";
    pub const TOOL_PARAMETERS: &str = "tool.parameters";
    pub const SPAN_KIND: &str = "openinference.span.kind";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanContext {
    pub trace_id: String,
    pub span_id: String,
}

impl SpanContext {
    /// Fresh ids: 32 hex chars for the trace, 16 for the span.
    pub fn new_root() -> Self {
        let trace_id = uuid::Uuid::new_v4().simple().to_string();
        let span_id = uuid::Uuid::new_v4().simple().to_string()[..16].to_string();
        Self { trace_id, span_id }
    }
}

/// Status of a recorded span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusCode {
    #[default]
    Unset,
    Ok,
    Error,
}

/// One recorded unit of traced work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub context: SpanContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub name: String,
    #[serde(default = "default_span_kind")]
    pub span_kind: String,
    #[serde(default)]
    pub status_code: StatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

fn default_span_kind() -> String {
    "LLM".to_string()
}

impl SpanRecord {
    pub fn span_id(&self) -> &str {
        &self.context.span_id
    }

    /// String attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }

    pub fn input(&self) -> Option<&str> {
        self.attribute(attr::INPUT_VALUE)
    }

    pub fn output(&self) -> Option<&str> {
        self.attribute(attr::OUTPUT_VALUE)
    }

    pub fn tool_name(&self) -> Option<&str> {
        self.attribute(attr::TOOL_NAME)
    }
}

/// A judged span: the label uploaded back to the trace store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub span_id: String,
    pub trace_id: String,
    pub name: String,
    pub explanation: String,
    pub label: Label,
    pub score: f64,
}

impl Evaluation {
    pub fn new(span: &SpanRecord, name: &str, judged: JudgeResponse) -> Self {
        Self {
            span_id: span.context.span_id.clone(),
            trace_id: span.context.trace_id.clone(),
            name: name.to_string(),
            explanation: judged.explanation,
            score: judged.label.score(),
            label: judged.label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_root_ids() {
        let a = SpanContext::new_root();
        let b = SpanContext::new_root();
        assert_eq!(a.trace_id.len(), 32);
        assert_eq!(a.span_id.len(), 16);
        assert!(a.trace_id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a.span_id, b.span_id);
    }

    #[test]
    fn test_span_deserializes_with_defaults() {
        let raw = r#"{
            "context": {"trace_id": "t1", "span_id": "s1"},
            "name": "ChatCompletion",
            "start_time": "2024-05-01T12:00:00Z",
            "end_time": "2024-05-01T12:00:01Z",
            "attributes": {"input.value": "hi", "output.value": 42}
        }"#;
        let span: SpanRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(span.span_kind, "LLM");
        assert_eq!(span.status_code, StatusCode::Unset);
        assert_eq!(span.input(), Some("hi"));
        // Non-string attributes are not treated as text.
        assert_eq!(span.output(), None);
    }

    #[test]
    fn test_evaluation_score_follows_label() {
        let span = SpanRecord {
            context: SpanContext {
                trace_id: "t".into(),
                span_id: "s".into(),
            },
            parent_id: None,
            name: "turn".into(),
            span_kind: "LLM".into(),
            status_code: StatusCode::Ok,
            status_message: None,
            start_time: Utc::now(),
            end_time: Utc::now(),
            attributes: Map::new(),
        };
        let valid = Evaluation::new(
            &span,
            "eval",
            JudgeResponse {
                explanation: "fine".into(),
                label: Label::Valid,
            },
        );
        assert_eq!(valid.score, 1.0);
        assert_eq!(valid.span_id, "s");

        let invalid = Evaluation::new(
            &span,
            "eval",
            JudgeResponse {
                explanation: "no".into(),
                label: Label::Invalid,
            },
        );
        assert_eq!(invalid.score, 0.0);
    }
}
