// crates/host/src/agents/judge/mod.rs

//! LLM-as-judge: labels recorded spans VALID/INVALID and uploads the labels.

mod prompts;

use anyhow::{Context, Result};

use toolcall_eval_core::ai_client::{AiClient, ChatRequest};
use toolcall_eval_core::label::extract_label;
use toolcall_eval_core::trace_store::TraceStore;
use toolcall_eval_core::types::{attr, Evaluation, SpanRecord, StatusCode};

use crate::log::{self, Agent as LogAgent};

/// A span the judge could not label.
#[derive(Debug, Clone)]
pub struct EvalFailure {
    pub span_id: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct EvalReport {
    pub evaluations: Vec<Evaluation>,
    pub failures: Vec<EvalFailure>,
    /// Spans without a question/answer pair to judge.
    pub skipped: usize,
}

impl EvalReport {
    pub fn valid_count(&self) -> usize {
        self.evaluations.iter().filter(|e| e.score > 0.0).count()
    }
}

pub struct Judge<'a, C: AiClient> {
    client: &'a C,
    name: String,
}

impl<'a, C: AiClient> Judge<'a, C> {
    /// `name` is the annotation name the labels are uploaded under.
    pub fn new(client: &'a C, name: &str) -> Self {
        Self {
            client,
            name: name.to_string(),
        }
    }

    /// Judge one span.
    pub fn evaluate_span(&self, span: &SpanRecord) -> Result<Evaluation> {
        let question = span.input().context("span has no input.value")?;
        let output = span.output().context("span has no output.value")?;
        let tool_call = span
            .tool_name()
            .map(|name| (name, span.attribute(attr::TOOL_PARAMETERS).unwrap_or("{}")));

        let prompt = prompts::build_judge_prompt(question, tool_call, output);
        log::step(LogAgent::Judge, "judge request", 1);

        let response = self
            .client
            .chat(ChatRequest::user(&prompt).with_temperature(0.0))
            .context("judge request failed")?;
        let text = response.text().context("judge returned no content")?;

        let judged = extract_label(text)?;
        log::label(span.span_id(), judged.label, &judged.explanation);
        Ok(Evaluation::new(span, &self.name, judged))
    }

    /// Judge every eligible span. Failures are collected, never fatal.
    pub fn evaluate_all(&self, spans: &[SpanRecord]) -> EvalReport {
        let mut report = EvalReport::default();

        for span in spans {
            if !is_judgeable(span) {
                report.skipped += 1;
                continue;
            }
            match self.evaluate_span(span) {
                Ok(eval) => report.evaluations.push(eval),
                Err(e) => {
                    log::error(LogAgent::Judge, format!("span {}: {e:#}", span.span_id()));
                    report.failures.push(EvalFailure {
                        span_id: span.span_id().to_string(),
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        report
    }

    /// Fetch a project's spans, judge them and upload the labels.
    pub fn evaluate_project(&self, store: &dyn TraceStore, project: &str) -> Result<EvalReport> {
        let spans = store
            .fetch_spans(project)
            .with_context(|| format!("failed to fetch spans for project '{project}'"))?;
        let report = self.evaluate_all(&spans);
        store
            .log_evaluations(&report.evaluations)
            .context("failed to upload evaluations")?;

        log::done(
            LogAgent::Judge,
            format!(
                "{} labelled ({} valid), {} failed, {} skipped",
                report.evaluations.len(),
                report.valid_count(),
                report.failures.len(),
                report.skipped
            ),
        );
        Ok(report)
    }
}

fn is_judgeable(span: &SpanRecord) -> bool {
    span.status_code != StatusCode::Error && span.input().is_some() && span.output().is_some()
}
