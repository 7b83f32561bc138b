//! Model configuration shared by member agents and the judge.

use serde::{Deserialize, Serialize};

/// Default model for the judge synthesis call.
pub const DEFAULT_JUDGE_MODEL: &str = "gpt-5";
/// Default model for member agent calls.
pub const DEFAULT_MEMBER_MODEL: &str = "gpt-5-mini";

/// Reasoning effort requested from models that support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

/// Per-call model configuration. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl ModelConfig {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            temperature: None,
            max_tokens: None,
            reasoning_effort: None,
        }
    }

    /// The judge's default configuration: high reasoning effort.
    pub fn judge_default() -> Self {
        Self::new(DEFAULT_JUDGE_MODEL).with_reasoning_effort(ReasoningEffort::High)
    }

    pub fn member_default() -> Self {
        Self::new(DEFAULT_MEMBER_MODEL)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }
}
