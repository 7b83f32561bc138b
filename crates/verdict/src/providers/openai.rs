//! OpenAI-compatible chat completions provider.
//!
//! Speaks the `/v1/chat/completions` wire format with bearer-token auth,
//! including the streaming (SSE) variant. Any service exposing that format
//! works by pointing `OPENAI_HOST` at it.

use std::io;
use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;

use super::CompletionProvider;
use crate::agent::ToolCapability;
use crate::engine::{ChunkStream, EngineError, Usage};
use crate::model::ModelConfig;

pub const OPEN_AI_DEFAULT_HOST: &str = "https://api.openai.com";
pub const OPEN_AI_DEFAULT_BASE_PATH: &str = "v1/chat/completions";
const DEFAULT_TIMEOUT_SECS: u64 = 600;

pub struct OpenAiProvider {
    client: Client,
    host: String,
    base_path: String,
    api_key: String,
}

impl OpenAiProvider {
    pub fn new(
        host: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(EngineError::from)?;
        Ok(Self {
            client,
            host: host.into(),
            base_path: OPEN_AI_DEFAULT_BASE_PATH.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Construct from environment: `OPENAI_API_KEY` (required),
    /// `OPENAI_HOST`, `OPENAI_BASE_PATH`, `OPENAI_TIMEOUT` (seconds).
    pub fn from_env() -> Result<Self, EngineError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| EngineError::Authentication("OPENAI_API_KEY is not set".to_string()))?;
        let host =
            std::env::var("OPENAI_HOST").unwrap_or_else(|_| OPEN_AI_DEFAULT_HOST.to_string());
        let timeout_secs = std::env::var("OPENAI_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let mut provider = Self::new(host, api_key, Duration::from_secs(timeout_secs))?;
        if let Ok(base_path) = std::env::var("OPENAI_BASE_PATH") {
            provider.base_path = base_path;
        }
        Ok(provider)
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    fn url(&self) -> String {
        format!("{}/{}", self.host.trim_end_matches('/'), self.base_path)
    }

    async fn post_raw(&self, payload: &Value) -> Result<reqwest::Response, EngineError> {
        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, &body))
    }

    async fn post(&self, payload: &Value) -> Result<Value, EngineError> {
        let response = self.post_raw(payload).await?;
        response
            .json()
            .await
            .map_err(|e| EngineError::ResponseFormat(e.to_string()))
    }
}

fn classify_status(status: StatusCode, body: &str) -> EngineError {
    let detail = error_message(body).unwrap_or_else(|| body.to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => EngineError::Authentication(detail),
        StatusCode::TOO_MANY_REQUESTS => EngineError::RateLimitExceeded(detail),
        s if s.is_server_error() => EngineError::ServerError(format!("{}: {}", s, detail)),
        s => EngineError::RequestFailed(format!("{}: {}", s, detail)),
    }
}

/// Pull the `error.message` field out of an OpenAI-style error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

fn create_request(
    model: &ModelConfig,
    system: &str,
    user: &str,
    tools: &[ToolCapability],
) -> Value {
    let mut payload = json!({
        "model": model.model_name,
        "messages": [
            {"role": "system", "content": system},
            {"role": "user", "content": user},
        ],
    });

    if let Some(temperature) = model.temperature {
        payload["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = model.max_tokens {
        payload["max_tokens"] = json!(max_tokens);
    }
    if let Some(effort) = model.reasoning_effort {
        payload["reasoning_effort"] = json!(effort.as_str());
    } else if tools.contains(&ToolCapability::Reasoning) {
        payload["reasoning_effort"] = json!("medium");
    }
    if tools.contains(&ToolCapability::WebSearch) {
        payload["web_search_options"] = json!({});
    }

    payload
}

fn response_to_text(response: &Value) -> Result<String, EngineError> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            EngineError::ResponseFormat("response carries no message content".to_string())
        })
}

fn get_usage(response: &Value) -> Usage {
    let field = |name: &str| response["usage"][name].as_i64().map(|v| v as i32);
    Usage::new(
        field("prompt_tokens"),
        field("completion_tokens"),
        field("total_tokens"),
    )
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        model: &ModelConfig,
        system: &str,
        user: &str,
        tools: &[ToolCapability],
    ) -> Result<(String, Usage), EngineError> {
        let payload = create_request(model, system, user, tools);
        tracing::debug!(model = %model.model_name, "issuing completion request");

        let response = self.post(&payload).await?;
        let text = response_to_text(&response)?;
        Ok((text, get_usage(&response)))
    }

    async fn stream(
        &self,
        model: &ModelConfig,
        system: &str,
        user: &str,
        tools: &[ToolCapability],
    ) -> Result<ChunkStream, EngineError> {
        let mut payload = create_request(model, system, user, tools);
        payload["stream"] = Value::Bool(true);
        tracing::debug!(model = %model.model_name, "issuing streaming completion request");

        let response = self.post_raw(&payload).await?;
        let bytes = response.bytes_stream().map_err(io::Error::other);
        let mut lines = FramedRead::new(StreamReader::new(Box::pin(bytes)), LinesCodec::new());

        Ok(Box::pin(try_stream! {
            while let Some(line) = lines.next().await {
                let line = line.map_err(|e| EngineError::ResponseFormat(e.to_string()))?;
                let Some(data) = line.strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim();
                if data.is_empty() {
                    continue;
                }
                if data == "[DONE]" {
                    break;
                }

                let value: Value = serde_json::from_str(data)
                    .map_err(|e| EngineError::ResponseFormat(e.to_string()))?;
                if let Some(delta) = value["choices"][0]["delta"]["content"].as_str() {
                    if !delta.is_empty() {
                        yield delta.to_string();
                    }
                }
            }
        }))
    }
}
