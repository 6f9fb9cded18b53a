// crates/host/src/log.rs

//! Per-agent log helpers on top of `tracing`.

use std::fmt::Display;

use tracing_subscriber::EnvFilter;

/// Agent type for log context.
#[derive(Debug, Clone, Copy)]
pub enum Agent {
    Assistant,
    Judge,
}

impl Agent {
    fn name(&self) -> &'static str {
        match self {
            Agent::Assistant => "assistant",
            Agent::Judge => "judge",
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` overrides the default `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Log a model request.
pub fn step(agent: Agent, what: &str, context_size: usize) {
    tracing::info!(agent = agent.name(), ctx = context_size, "{what}");
}

/// Log a tool call.
pub fn tool_call(agent: Agent, name: &str, args: &str) {
    tracing::info!(agent = agent.name(), tool = name, args = %truncate(args, 100), "tool call");
}

/// Log a tool result.
pub fn tool_result(agent: Agent, name: &str, result: &str, is_error: bool) {
    let preview = truncate(result, 150);
    if is_error {
        tracing::warn!(agent = agent.name(), tool = name, result = %preview, "tool failed");
    } else {
        tracing::info!(agent = agent.name(), tool = name, result = %preview, "tool result");
    }
}

/// Log agent text response.
pub fn response(agent: Agent, text: &str) {
    tracing::info!(agent = agent.name(), text = %truncate(text, 200), "response");
}

/// Log a judged span.
pub fn label(span_id: &str, label: impl Display, explanation: &str) {
    tracing::info!(
        agent = Agent::Judge.name(),
        span_id,
        label = %label,
        explanation = %truncate(explanation, 120),
        "labelled span"
    );
}

/// Log agent completion.
pub fn done(agent: Agent, message: impl Display) {
    tracing::info!(agent = agent.name(), "done: {message}");
}

/// Log an error.
pub fn error(agent: Agent, message: impl Display) {
    tracing::error!(agent = agent.name(), "{message}");
}

/// Truncate and clean string for display.
pub fn truncate(s: &str, max: usize) -> String {
    let clean: String = s
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let trimmed = clean.trim();
    if trimmed.chars().count() > max {
        let head: String = trimmed.chars().take(max).collect();
        format!("{}...", head)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_cleans_and_shortens() {
        assert_eq!(truncate("  a\nb  ", 10), "a b");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
    }
}
