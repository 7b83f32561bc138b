//! verdict - multi-perspective AI deliberation
//!
//! A panel of persona-steered agents (Optimist, Pessimist, Historian,
//! Forecaster, with Skeptic available) each report on a topic, and a Judge
//! synthesizes their reports into one balanced assessment.
//!
//! # Architecture
//!
//! - [`personas`]: the fixed persona instruction registry.
//! - [`agent`]: member agent configuration (persona + model + tools).
//! - [`team`]: the coordinator. Formats the assessment request and
//!   delegates the run to an engine.
//! - [`engine`]: the narrow engine contract plus the production
//!   [`DeliberationEngine`] that fans out to members and synthesizes.
//! - [`providers`]: model access over an OpenAI-compatible API.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use verdict::{judge_team, DeliberationEngine, OpenAiProvider, PromptLibrary};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(OpenAiProvider::from_env()?);
//! let engine = Arc::new(DeliberationEngine::new(provider));
//! let library = PromptLibrary::default();
//!
//! let team = judge_team(&library, engine)?;
//! let result = team.run("The future of renewable energy").await?;
//! if let Some(content) = result.content {
//!     println!("{content}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod engine;
pub mod error;
pub mod model;
pub mod personas;
pub mod providers;
pub mod team;

pub use agent::{AgentConfig, ToolCapability};
pub use engine::{
    ChunkStream, DeliberationEngine, DeliberationRequest, Engine, EngineError, MemberReport,
    RunResult, Usage,
};
pub use error::TeamError;
pub use model::{ModelConfig, ReasoningEffort};
pub use personas::{Persona, PersonaProfile, PersonaStyle, PromptLibrary};
pub use providers::{CompletionProvider, OpenAiProvider};
pub use team::{judge_team, Team, TeamBehavior, TeamConfig};
