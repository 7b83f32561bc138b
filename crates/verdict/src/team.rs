//! The synthesis coordinator.
//!
//! A [`Team`] holds member agent configurations, the judge's instructions,
//! and an [`Engine`]. On each run it formats the fixed assessment request
//! around the caller's topic and delegates the whole deliberation to the
//! engine. One outbound request per run, no retries, no recovery.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agent::{AgentConfig, ToolCapability};
use crate::engine::{ChunkStream, DeliberationRequest, Engine, RunResult};
use crate::error::TeamError;
use crate::model::ModelConfig;
use crate::personas::{Persona, PromptLibrary};

/// Named behavior options for a team run.
///
/// Each option has one documented effect in the engine:
/// - `show_member_responses`: copy member reports into the final
///   [`RunResult`].
/// - `share_member_interactions`: run members sequentially, each seeing the
///   reports produced so far, instead of in parallel.
/// - `delegate_to_all`: fan the request out to every member before the
///   judge synthesis; when off, the judge runs alone.
/// - `expose_member_info`: label each report with its persona name in the
///   judge's synthesis prompt.
/// - `stream_intermediate_steps`: in streaming mode, emit each member
///   report as a chunk ahead of the judge's synthesis.
/// - `store_member_responses`: retain the last run's reports in the
///   engine's in-memory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamBehavior {
    pub show_member_responses: bool,
    pub share_member_interactions: bool,
    pub delegate_to_all: bool,
    pub expose_member_info: bool,
    pub stream_intermediate_steps: bool,
    pub store_member_responses: bool,
}

impl Default for TeamBehavior {
    fn default() -> Self {
        Self {
            show_member_responses: false,
            share_member_interactions: false,
            delegate_to_all: true,
            expose_member_info: false,
            stream_intermediate_steps: false,
            store_member_responses: false,
        }
    }
}

impl TeamBehavior {
    pub fn with_show_member_responses(mut self, on: bool) -> Self {
        self.show_member_responses = on;
        self
    }

    pub fn with_share_member_interactions(mut self, on: bool) -> Self {
        self.share_member_interactions = on;
        self
    }

    pub fn with_delegate_to_all(mut self, on: bool) -> Self {
        self.delegate_to_all = on;
        self
    }

    pub fn with_expose_member_info(mut self, on: bool) -> Self {
        self.expose_member_info = on;
        self
    }

    pub fn with_stream_intermediate_steps(mut self, on: bool) -> Self {
        self.stream_intermediate_steps = on;
        self
    }

    pub fn with_store_member_responses(mut self, on: bool) -> Self {
        self.store_member_responses = on;
        self
    }
}

/// Complete team configuration. Immutable once the team is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamConfig {
    pub name: String,
    pub members: Vec<AgentConfig>,
    pub judge_instructions: String,
    pub model: ModelConfig,
    pub tools: Vec<ToolCapability>,
    pub behavior: TeamBehavior,
    /// Ask the judge to format its synthesis in Markdown.
    pub markdown: bool,
}

/// Coordinates one deliberation per `run` call.
pub struct Team {
    config: TeamConfig,
    engine: Arc<dyn Engine>,
}

impl std::fmt::Debug for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Team")
            .field("config", &self.config)
            .field("engine", &"<dyn Engine>")
            .finish()
    }
}

fn assessment_request(topic: &str) -> String {
    format!(
        "Based on the reports from all agents, provide a comprehensive and balanced final assessment on the topic: {topic}"
    )
}

impl Team {
    /// Build a team over a configuration and an engine.
    ///
    /// A team without members cannot deliberate, so an empty member list is
    /// rejected here rather than at run time.
    pub fn new(config: TeamConfig, engine: Arc<dyn Engine>) -> Result<Self, TeamError> {
        if config.members.is_empty() {
            return Err(TeamError::InvalidRequest(
                "a team needs at least one member".to_string(),
            ));
        }
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &TeamConfig {
        &self.config
    }

    /// Replace the behavior options before first use.
    pub fn with_behavior(mut self, behavior: TeamBehavior) -> Self {
        self.config.behavior = behavior;
        self
    }

    fn request_for(&self, topic: &str) -> Result<DeliberationRequest, TeamError> {
        if topic.trim().is_empty() {
            return Err(TeamError::InvalidRequest(
                "topic must not be empty".to_string(),
            ));
        }
        Ok(DeliberationRequest {
            topic: topic.to_string(),
            request_text: assessment_request(topic),
            config: self.config.clone(),
        })
    }

    /// Run the panel to completion and return the synthesized assessment.
    pub async fn run(&self, topic: &str) -> Result<RunResult, TeamError> {
        let request = self.request_for(topic)?;
        info!(team = %self.config.name, topic, "starting deliberation");
        Ok(self.engine.invoke(&request).await?)
    }

    /// Run the panel, surfacing output chunks in the engine's emission
    /// order. Dropping the stream early is safe; it does not cancel the
    /// underlying computation.
    pub async fn run_stream(&self, topic: &str) -> Result<ChunkStream, TeamError> {
        let request = self.request_for(topic)?;
        info!(team = %self.config.name, topic, "starting streamed deliberation");
        Ok(self.engine.invoke_stream(&request).await?)
    }
}

/// The default panel: Optimist, Pessimist, Historian, and Forecaster
/// reporting to a Judge with web search and reasoning enabled.
pub fn judge_team(library: &PromptLibrary, engine: Arc<dyn Engine>) -> Result<Team, TeamError> {
    let member_model = ModelConfig::member_default();
    let members = [
        Persona::Optimist,
        Persona::Pessimist,
        Persona::Historian,
        Persona::Forecaster,
    ]
    .into_iter()
    .map(|persona| {
        AgentConfig::for_persona(library, persona, member_model.clone())
            .with_tools(vec![ToolCapability::WebSearch])
    })
    .collect();

    let config = TeamConfig {
        name: "News and Weather Team".to_string(),
        members,
        judge_instructions: library.profile(Persona::Judge).instructions.clone(),
        model: ModelConfig::judge_default(),
        tools: vec![ToolCapability::Reasoning, ToolCapability::WebSearch],
        behavior: TeamBehavior::default(),
        markdown: true,
    };

    Team::new(config, engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, MemberReport, Usage};
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockEngine {
        calls: AtomicUsize,
        failure: Option<EngineError>,
    }

    impl MockEngine {
        fn echo() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failure: None,
            }
        }

        fn failing(failure: EngineError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failure: Some(failure),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Engine for MockEngine {
        async fn invoke(&self, request: &DeliberationRequest) -> Result<RunResult, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(failure) = &self.failure {
                return Err(failure.clone());
            }
            Ok(RunResult {
                content: Some(request.request_text.clone()),
                model: "mock-model".to_string(),
                usage: Usage::new(Some(10), Some(20), Some(30)),
                member_reports: vec![MemberReport::new("Optimist", "all good")],
            })
        }

        async fn invoke_stream(
            &self,
            _request: &DeliberationRequest,
        ) -> Result<ChunkStream, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(failure) = &self.failure {
                return Err(failure.clone());
            }
            let chunks = ["A", "B", "C"]
                .into_iter()
                .map(|c| Ok(c.to_string()))
                .collect::<Vec<_>>();
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    fn test_team(engine: Arc<MockEngine>) -> Team {
        let library = PromptLibrary::default();
        judge_team(&library, engine).unwrap()
    }

    #[tokio::test]
    async fn run_embeds_topic_in_fixed_template() {
        let engine = Arc::new(MockEngine::echo());
        let team = test_team(engine.clone());

        let result = team.run("The future of renewable energy").await.unwrap();
        let content = result.content.unwrap();
        assert!(content.starts_with("Based on the reports from all agents"));
        assert!(content.contains("The future of renewable energy"));
        assert_eq!(engine.call_count(), 1);
    }

    #[tokio::test]
    async fn empty_topic_fails_before_the_engine_is_reached() {
        let engine = Arc::new(MockEngine::echo());
        let team = test_team(engine.clone());

        for topic in ["", "   "] {
            let err = team.run(topic).await.unwrap_err();
            assert!(matches!(err, TeamError::InvalidRequest(_)));
        }
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn engine_errors_propagate_without_retry() {
        let engine = Arc::new(MockEngine::failing(EngineError::NetworkError(
            "connection refused".to_string(),
        )));
        let team = test_team(engine.clone());

        let err = team.run("anything").await.unwrap_err();
        match err {
            TeamError::Engine(EngineError::NetworkError(msg)) => {
                assert!(msg.contains("connection refused"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(engine.call_count(), 1);
    }

    #[tokio::test]
    async fn streaming_preserves_chunk_order() {
        let engine = Arc::new(MockEngine::echo());
        let team = test_team(engine);

        let stream = team.run_stream("chunk order").await.unwrap();
        let chunks: Vec<String> = stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn partial_stream_consumption_is_safe() {
        let engine = Arc::new(MockEngine::echo());
        let team = test_team(engine);

        let mut stream = team.run_stream("partial").await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, "A");
        drop(stream);
    }

    #[tokio::test]
    async fn empty_member_list_is_rejected_at_construction() {
        let library = PromptLibrary::default();
        let config = TeamConfig {
            name: "empty".to_string(),
            members: Vec::new(),
            judge_instructions: library.profile(Persona::Judge).instructions.clone(),
            model: ModelConfig::judge_default(),
            tools: Vec::new(),
            behavior: TeamBehavior::default(),
            markdown: false,
        };
        let err = Team::new(config, Arc::new(MockEngine::echo())).unwrap_err();
        assert!(matches!(err, TeamError::InvalidRequest(_)));
    }

    #[test]
    fn judge_team_assembles_the_default_panel() {
        let library = PromptLibrary::default();
        let team = judge_team(&library, Arc::new(MockEngine::echo())).unwrap();

        let config = team.config();
        assert_eq!(config.name, "News and Weather Team");
        let names: Vec<&str> = config.members.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["Optimist", "Pessimist", "Historian", "Forecaster"]);
        assert_eq!(config.model.model_name, crate::model::DEFAULT_JUDGE_MODEL);
        assert!(config.markdown);
        assert!(config.behavior.delegate_to_all);
        assert_eq!(
            config.judge_instructions,
            library.profile(Persona::Judge).instructions
        );
    }
}
