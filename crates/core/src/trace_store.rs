// crates/core/src/trace_store.rs

//! Where spans go after a turn and where evaluation labels are uploaded.

use std::cell::RefCell;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::Config;
use crate::types::{Evaluation, SpanRecord};

/// Page size used when listing spans.
const PAGE_LIMIT: usize = 100;

/// External tracing backend.
pub trait TraceStore {
    /// Record a finished span under the store's project.
    fn export_span(&self, span: &SpanRecord) -> Result<()>;

    /// All spans recorded for `project`.
    fn fetch_spans(&self, project: &str) -> Result<Vec<SpanRecord>>;

    /// Attach evaluation results to their spans.
    fn log_evaluations(&self, evaluations: &[Evaluation]) -> Result<()>;
}

/// Pick the backend from config: HTTP collector if an endpoint is set,
/// otherwise spans stay in memory for the life of the process.
pub fn from_config(config: &Config) -> Result<Box<dyn TraceStore>> {
    match &config.collector_endpoint {
        Some(endpoint) => {
            tracing::info!(%endpoint, project = %config.project, "exporting spans to collector");
            Ok(Box::new(PhoenixTraceStore::new(
                endpoint,
                &config.project,
                config.collector_api_key.as_deref(),
                config.timeout,
            )?))
        }
        None => {
            tracing::info!("no collector endpoint configured, keeping spans in memory");
            Ok(Box::new(MemoryTraceStore::new(&config.project)))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryTraceStore {
    project: String,
    spans: RefCell<Vec<SpanRecord>>,
    evaluations: RefCell<Vec<Evaluation>>,
}

impl MemoryTraceStore {
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            ..Self::default()
        }
    }

    /// Snapshot of uploaded evaluations.
    pub fn evaluations(&self) -> Vec<Evaluation> {
        self.evaluations.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.spans.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.borrow().is_empty()
    }
}

impl TraceStore for MemoryTraceStore {
    fn export_span(&self, span: &SpanRecord) -> Result<()> {
        self.spans.borrow_mut().push(span.clone());
        Ok(())
    }

    fn fetch_spans(&self, project: &str) -> Result<Vec<SpanRecord>> {
        if project != self.project {
            return Ok(Vec::new());
        }
        Ok(self.spans.borrow().clone())
    }

    fn log_evaluations(&self, evaluations: &[Evaluation]) -> Result<()> {
        let known = self.spans.borrow();
        if let Some(orphan) = evaluations
            .iter()
            .find(|e| !known.iter().any(|s| s.span_id() == e.span_id))
        {
            anyhow::bail!("evaluation refers to unknown span {}", orphan.span_id);
        }

        let mut stored = self.evaluations.borrow_mut();
        for eval in evaluations {
            // Re-judging a span replaces its previous label of the same name.
            stored.retain(|e| !(e.span_id == eval.span_id && e.name == eval.name));
            stored.push(eval.clone());
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Phoenix REST
// ─────────────────────────────────────────────────────────────────────────────

/// Client for a Phoenix-style tracing server.
///
/// - `POST /v1/projects/{project}/spans` exports spans
/// - `GET /v1/projects/{project}/spans` lists them, following `next_cursor`
/// - `POST /v1/span_annotations` uploads labels keyed by span id
pub struct PhoenixTraceStore {
    client: Client,
    endpoint: String,
    project: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct SpanPage {
    #[serde(default)]
    data: Vec<SpanRecord>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Serialize)]
struct SpanAnnotation<'a> {
    span_id: &'a str,
    name: &'a str,
    annotator_kind: &'static str,
    result: AnnotationResult<'a>,
}

#[derive(Serialize)]
struct AnnotationResult<'a> {
    label: &'static str,
    score: f64,
    explanation: &'a str,
}

impl PhoenixTraceStore {
    pub fn new(
        endpoint: &str,
        project: &str,
        api_key: Option<&str>,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project: project.to_string(),
            api_key: api_key.map(str::to_string),
        })
    }

    fn spans_url(&self, project: &str) -> String {
        format!(
            "{}/v1/projects/{}/spans",
            self.endpoint,
            urlencoding::encode(project)
        )
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    fn send(&self, req: RequestBuilder, what: &str) -> Result<reqwest::blocking::Response> {
        let resp = self
            .authorize(req)
            .send()
            .with_context(|| format!("{what} request failed"))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            let preview: String = body.chars().take(500).collect();
            anyhow::bail!("{what} failed: HTTP {} - {}", status, preview);
        }
        Ok(resp)
    }
}

impl TraceStore for PhoenixTraceStore {
    fn export_span(&self, span: &SpanRecord) -> Result<()> {
        let req = self
            .client
            .post(self.spans_url(&self.project))
            .json(&json!({ "data": [span] }));
        self.send(req, "span export")?;
        tracing::debug!(span_id = span.span_id(), "exported span");
        Ok(())
    }

    fn fetch_spans(&self, project: &str) -> Result<Vec<SpanRecord>> {
        let url = self.spans_url(project);
        let mut spans = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut req = self
                .client
                .get(&url)
                .query(&[("limit", PAGE_LIMIT.to_string())]);
            if let Some(c) = &cursor {
                req = req.query(&[("cursor", c)]);
            }

            let page: SpanPage = self
                .send(req, "span listing")?
                .json()
                .context("failed to parse span listing")?;
            spans.extend(page.data);

            match page.next_cursor {
                Some(next) if !next.is_empty() && cursor.as_ref() != Some(&next) => {
                    cursor = Some(next)
                }
                Some(next) if !next.is_empty() => {
                    tracing::warn!(cursor = %next, "span listing repeated its cursor, stopping");
                    break;
                }
                _ => break,
            }
        }

        tracing::debug!(project, count = spans.len(), "fetched spans");
        Ok(spans)
    }

    fn log_evaluations(&self, evaluations: &[Evaluation]) -> Result<()> {
        if evaluations.is_empty() {
            return Ok(());
        }

        let data: Vec<SpanAnnotation> = evaluations
            .iter()
            .map(|e| SpanAnnotation {
                span_id: &e.span_id,
                name: &e.name,
                annotator_kind: "LLM",
                result: AnnotationResult {
                    label: e.label.as_str(),
                    score: e.score,
                    explanation: &e.explanation,
                },
            })
            .collect();

        let req = self
            .client
            .post(format!("{}/v1/span_annotations", self.endpoint))
            .json(&json!({ "data": data }));
        self.send(req, "annotation upload")?;
        tracing::info!(count = evaluations.len(), "uploaded evaluations");
        Ok(())
    }
}
