//! Member agent configuration.
//!
//! An agent performs no inference of its own. It packages a persona profile
//! together with the model and tool configuration the engine will use to
//! drive the actual call.

use serde::{Deserialize, Serialize};

use crate::error::TeamError;
use crate::model::ModelConfig;
use crate::personas::{Persona, PersonaProfile, PromptLibrary};

/// Capabilities an agent may request from the engine.
///
/// `WebSearch` asks the provider to ground responses with a hosted search
/// tool; `Reasoning` asks for an explicit reasoning pass. Both are passed
/// through to the provider as request options, never executed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCapability {
    WebSearch,
    Reasoning,
}

/// One member agent's complete configuration. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub profile: PersonaProfile,
    pub model: ModelConfig,
    pub tools: Vec<ToolCapability>,
    pub reasoning: bool,
}

impl AgentConfig {
    /// Build an agent for a persona, resolving instructions from the library.
    pub fn for_persona(library: &PromptLibrary, persona: Persona, model: ModelConfig) -> Self {
        Self {
            profile: library.profile(persona).clone(),
            model,
            tools: Vec::new(),
            reasoning: false,
        }
    }

    /// Build an agent from a persona name.
    ///
    /// The only failure mode is an unknown name, propagated from the
    /// registry lookup.
    pub fn from_name(
        library: &PromptLibrary,
        name: &str,
        model: ModelConfig,
    ) -> Result<Self, TeamError> {
        let persona = name
            .parse::<Persona>()
            .map_err(|_| TeamError::UnknownPersona(name.to_string()))?;
        Ok(Self::for_persona(library, persona, model))
    }

    pub fn with_tools(mut self, tools: Vec<ToolCapability>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_reasoning(mut self, reasoning: bool) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn name(&self) -> &'static str {
        self.profile.name()
    }
}
