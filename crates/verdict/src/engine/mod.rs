//! The engine seam between the coordinator and whatever runs the panel.
//!
//! A [`Team`](crate::team::Team) never talks to a model directly. It hands a
//! [`DeliberationRequest`] to an [`Engine`] and gets back either one complete
//! [`RunResult`] or an ordered stream of output chunks. The contract is
//! deliberately narrow (two operations) so a test double can stand in for
//! the production engine without a network dependency.

pub mod deliberation;
mod errors;

pub use deliberation::{DeliberationEngine, DeliberationRecord};
pub use errors::EngineError;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::team::TeamConfig;

/// Lazy, finite, non-restartable sequence of output chunks.
///
/// Chunks are yielded in the engine's emission order. Dropping the stream
/// stops consumption but is not assumed to cancel the remote computation.
pub type ChunkStream = BoxStream<'static, Result<String, EngineError>>;

/// One deliberation request, constructed per invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliberationRequest {
    /// The topic under deliberation, verbatim as the caller supplied it.
    pub topic: String,
    /// The fully formatted synthesis request, topic already embedded.
    pub request_text: String,
    /// The team configuration the engine should honor.
    pub config: TeamConfig,
}

/// One member agent's collected output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberReport {
    pub persona: String,
    pub content: String,
}

impl MemberReport {
    pub fn new(persona: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            content: content.into(),
        }
    }
}

/// Token accounting summed across the calls an engine issues for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }

    /// Accumulate another call's usage into this one.
    pub fn add(&mut self, other: &Usage) {
        let sum = |a: Option<i32>, b: Option<i32>| match (a, b) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(0) + b.unwrap_or(0)),
        };
        self.input_tokens = sum(self.input_tokens, other.input_tokens);
        self.output_tokens = sum(self.output_tokens, other.output_tokens);
        self.total_tokens = sum(self.total_tokens, other.total_tokens);
    }
}

/// The synthesized outcome of one deliberation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// The judge's synthesis. Absent if the engine produced no content.
    pub content: Option<String>,
    /// Model that produced the synthesis.
    pub model: String,
    pub usage: Usage,
    /// Populated only when the team asks for member responses to be shown.
    pub member_reports: Vec<MemberReport>,
}

/// The orchestration collaborator: run all members, then synthesize.
///
/// Implementations own scheduling, tool use, and model access entirely;
/// the coordinator passes configuration through and performs no retries.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Run the panel to completion and return one synthesized result.
    async fn invoke(&self, request: &DeliberationRequest) -> Result<RunResult, EngineError>;

    /// Run the panel, streaming output chunks as they become available.
    async fn invoke_stream(&self, request: &DeliberationRequest)
        -> Result<ChunkStream, EngineError>;
}
