// crates/core/src/openai_client.rs

//! OpenAI-compatible chat completions client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Serialize;

use crate::ai_client::{AiClient, ChatRequest, ChatResponse};
use crate::config::Config;

/// Blocking client for `POST {base_url}/chat/completions`.
///
/// Every request is bounded by the configured timeout. Failures are returned
/// to the caller as-is; there is no retry.
pub struct OpenAiClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, model: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            url,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        tracing::info!(model = %config.model, url = %config.base_url, "using chat completions endpoint");
        Self::new(&config.base_url, &config.model, &config.api_key, config.timeout)
    }
}

/// Request body: the generic request plus the model name.
#[derive(Serialize)]
struct CompletionsRequest<'a> {
    model: &'a str,
    #[serde(flatten)]
    request: &'a ChatRequest,
}

impl AiClient for OpenAiClient {
    fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let body = CompletionsRequest {
            model: &self.model,
            request: &request,
        };

        tracing::debug!(
            url = %self.url,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "sending chat request"
        );

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("chat request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            let preview: String = body.chars().take(500).collect();
            anyhow::bail!("chat request failed: HTTP {} - {}", status, preview);
        }

        let raw_text = resp.text().context("failed to read chat response body")?;
        let parsed: ChatResponse =
            serde_json::from_str(&raw_text).context("failed to parse chat response")?;

        Ok(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
