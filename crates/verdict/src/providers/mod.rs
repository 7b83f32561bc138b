//! Model providers.
//!
//! A provider turns one (system, user) prompt pair into model output, either
//! complete or streamed. The deliberation engine drives every member and
//! judge call through this trait.

pub mod openai;

pub use openai::OpenAiProvider;

use async_trait::async_trait;

use crate::agent::ToolCapability;
use crate::engine::{ChunkStream, EngineError, Usage};
use crate::model::ModelConfig;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    /// One blocking completion call.
    async fn complete(
        &self,
        model: &ModelConfig,
        system: &str,
        user: &str,
        tools: &[ToolCapability],
    ) -> Result<(String, Usage), EngineError>;

    /// One streaming completion call; chunks arrive in emission order.
    async fn stream(
        &self,
        model: &ModelConfig,
        system: &str,
        user: &str,
        tools: &[ToolCapability],
    ) -> Result<ChunkStream, EngineError>;
}
