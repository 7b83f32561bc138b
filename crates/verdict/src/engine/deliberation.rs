//! The production engine: fan the request out to member agents, then run
//! the judge synthesis over their reports.

use std::sync::Arc;
use std::time::Duration;

use async_stream::try_stream;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use futures::StreamExt;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    ChunkStream, DeliberationRequest, Engine, EngineError, MemberReport, RunResult, Usage,
};
use crate::agent::AgentConfig;
use crate::providers::CompletionProvider;
use crate::team::TeamConfig;

const DEFAULT_MEMBER_TIMEOUT: Duration = Duration::from_secs(120);

/// The reports retained from the most recent run, when the team asks for
/// member responses to be stored.
#[derive(Debug, Clone)]
pub struct DeliberationRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub reports: Vec<MemberReport>,
}

pub struct DeliberationEngine {
    provider: Arc<dyn CompletionProvider>,
    member_timeout: Duration,
    store: RwLock<Option<DeliberationRecord>>,
}

impl DeliberationEngine {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            member_timeout: DEFAULT_MEMBER_TIMEOUT,
            store: RwLock::new(None),
        }
    }

    pub fn with_member_timeout(mut self, member_timeout: Duration) -> Self {
        self.member_timeout = member_timeout;
        self
    }

    /// The record stored by the last run, if any run asked for storage.
    pub async fn stored_reports(&self) -> Option<DeliberationRecord> {
        self.store.read().await.clone()
    }

    async fn member_call(
        provider: Arc<dyn CompletionProvider>,
        agent: AgentConfig,
        prompt: String,
        member_timeout: Duration,
    ) -> Result<(MemberReport, Usage), EngineError> {
        let call = provider.complete(&agent.model, &agent.profile.instructions, &prompt, &agent.tools);
        let (content, usage) = timeout(member_timeout, call)
            .await
            .map_err(|_| EngineError::Timeout(member_timeout.as_secs()))??;

        if content.trim().is_empty() {
            return Err(EngineError::ResponseFormat(format!(
                "empty response from {}",
                agent.name()
            )));
        }
        Ok((MemberReport::new(agent.name(), content), usage))
    }

    /// Gather reports from every member.
    ///
    /// Members run in parallel unless interactions are shared, in which
    /// case they run in order and each sees the reports produced so far.
    /// A failed or timed-out member is skipped; the run only fails if no
    /// member produced a report.
    async fn gather_reports(
        &self,
        request: &DeliberationRequest,
    ) -> Result<(Vec<MemberReport>, Usage), EngineError> {
        let members = &request.config.members;
        let mut reports = Vec::new();
        let mut usage = Usage::default();
        let mut first_error: Option<EngineError> = None;

        if request.config.behavior.share_member_interactions {
            for agent in members {
                let prompt = member_prompt(&request.topic, &reports);
                match Self::member_call(
                    Arc::clone(&self.provider),
                    agent.clone(),
                    prompt,
                    self.member_timeout,
                )
                .await
                {
                    Ok((report, call_usage)) => {
                        debug!(persona = %report.persona, "collected member report");
                        usage.add(&call_usage);
                        reports.push(report);
                    }
                    Err(e) => {
                        warn!(persona = agent.name(), error = %e, "member failed, skipping");
                        first_error.get_or_insert(e);
                    }
                }
            }
        } else {
            let tasks: Vec<_> = members
                .iter()
                .map(|agent| {
                    let provider = Arc::clone(&self.provider);
                    let agent = agent.clone();
                    let prompt = member_prompt(&request.topic, &[]);
                    let member_timeout = self.member_timeout;
                    tokio::spawn(Self::member_call(provider, agent, prompt, member_timeout))
                })
                .collect();

            for (idx, joined) in join_all(tasks).await.into_iter().enumerate() {
                match joined {
                    Ok(Ok((report, call_usage))) => {
                        debug!(persona = %report.persona, "collected member report");
                        usage.add(&call_usage);
                        reports.push(report);
                    }
                    Ok(Err(e)) => {
                        warn!(persona = members[idx].name(), error = %e, "member failed, skipping");
                        first_error.get_or_insert(e);
                    }
                    Err(e) => {
                        warn!(persona = members[idx].name(), error = %e, "member task failed");
                        first_error.get_or_insert(EngineError::ExecutionError(e.to_string()));
                    }
                }
            }
        }

        if reports.is_empty() {
            if let Some(error) = first_error {
                return Err(error);
            }
        }
        Ok((reports, usage))
    }

    async fn store_if_requested(&self, config: &TeamConfig, reports: &[MemberReport]) {
        if config.behavior.store_member_responses {
            let mut store = self.store.write().await;
            *store = Some(DeliberationRecord {
                id: Uuid::new_v4().to_string(),
                created_at: Utc::now(),
                reports: reports.to_vec(),
            });
        }
    }
}

/// The prompt each member receives. With shared interactions, prior
/// reports ride along so later members can respond to them.
fn member_prompt(topic: &str, prior: &[MemberReport]) -> String {
    let mut prompt = format!(
        "Analyze the following topic from your perspective and provide your report.\n\nTopic: {topic}"
    );
    if !prior.is_empty() {
        prompt.push_str("\n\nReports shared so far:\n");
        for report in prior {
            prompt.push_str(&format!("\n{}:\n{}\n", report.persona, report.content));
        }
    }
    prompt
}

fn judge_system(config: &TeamConfig) -> String {
    if config.markdown {
        format!(
            "{}\n\nFormat your response in Markdown.",
            config.judge_instructions
        )
    } else {
        config.judge_instructions.clone()
    }
}

fn judge_prompt(request_text: &str, reports: &[MemberReport], expose_member_info: bool) -> String {
    if reports.is_empty() {
        return request_text.to_string();
    }

    let mut prompt = String::from("Member agent reports:\n");
    for (idx, report) in reports.iter().enumerate() {
        if expose_member_info {
            prompt.push_str(&format!("\n{} report:\n{}\n", report.persona, report.content));
        } else {
            prompt.push_str(&format!("\nReport {}:\n{}\n", idx + 1, report.content));
        }
    }
    prompt.push_str(&format!("\n{request_text}"));
    prompt
}

#[async_trait::async_trait]
impl Engine for DeliberationEngine {
    async fn invoke(&self, request: &DeliberationRequest) -> Result<RunResult, EngineError> {
        let config = &request.config;
        info!(team = %config.name, members = config.members.len(), "starting deliberation run");

        let (reports, mut usage) = if config.behavior.delegate_to_all {
            self.gather_reports(request).await?
        } else {
            (Vec::new(), Usage::default())
        };

        self.store_if_requested(config, &reports).await;

        let system = judge_system(config);
        let prompt = judge_prompt(
            &request.request_text,
            &reports,
            config.behavior.expose_member_info,
        );
        let (content, judge_usage) = self
            .provider
            .complete(&config.model, &system, &prompt, &config.tools)
            .await?;
        usage.add(&judge_usage);

        info!(team = %config.name, reports = reports.len(), "deliberation complete");

        Ok(RunResult {
            content: Some(content),
            model: config.model.model_name.clone(),
            usage,
            member_reports: if config.behavior.show_member_responses {
                reports
            } else {
                Vec::new()
            },
        })
    }

    async fn invoke_stream(
        &self,
        request: &DeliberationRequest,
    ) -> Result<ChunkStream, EngineError> {
        let config = request.config.clone();
        info!(team = %config.name, members = config.members.len(), "starting streamed deliberation run");

        let (reports, _usage) = if config.behavior.delegate_to_all {
            self.gather_reports(request).await?
        } else {
            (Vec::new(), Usage::default())
        };

        self.store_if_requested(&config, &reports).await;

        let system = judge_system(&config);
        let prompt = judge_prompt(
            &request.request_text,
            &reports,
            config.behavior.expose_member_info,
        );
        let mut judge = self
            .provider
            .stream(&config.model, &system, &prompt, &config.tools)
            .await?;

        let intermediate = config.behavior.stream_intermediate_steps;
        Ok(Box::pin(try_stream! {
            if intermediate {
                for report in &reports {
                    yield format!("[{}]\n{}\n\n", report.persona, report.content);
                }
            }
            while let Some(chunk) = judge.next().await {
                yield chunk?;
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ToolCapability;
    use crate::model::ModelConfig;
    use crate::personas::{Persona, PromptLibrary};
    use crate::team::TeamBehavior;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call and answers with a numbered canned response.
    #[derive(Default)]
    struct ScriptedProvider {
        calls: Mutex<Vec<(String, String, String)>>,
        fail_for: Option<&'static str>,
    }

    impl ScriptedProvider {
        fn failing_for(persona_marker: &'static str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_for: Some(persona_marker),
            }
        }

        fn calls(&self) -> Vec<(String, String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            model: &ModelConfig,
            system: &str,
            user: &str,
            _tools: &[ToolCapability],
        ) -> Result<(String, Usage), EngineError> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((model.model_name.clone(), system.to_string(), user.to_string()));
                calls.len() - 1
            };
            if let Some(marker) = self.fail_for {
                if system.contains(marker) {
                    return Err(EngineError::ServerError("scripted failure".to_string()));
                }
            }
            Ok((
                format!("canned response {index}"),
                Usage::new(Some(1), Some(2), Some(3)),
            ))
        }

        async fn stream(
            &self,
            model: &ModelConfig,
            system: &str,
            user: &str,
            _tools: &[ToolCapability],
        ) -> Result<ChunkStream, EngineError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.model_name.clone(), system.to_string(), user.to_string()));
            let chunks = vec![Ok("S1".to_string()), Ok("S2".to_string())];
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    fn request_with(behavior: TeamBehavior, markdown: bool) -> DeliberationRequest {
        let library = PromptLibrary::default();
        let members = vec![
            crate::agent::AgentConfig::for_persona(
                &library,
                Persona::Optimist,
                ModelConfig::member_default(),
            ),
            crate::agent::AgentConfig::for_persona(
                &library,
                Persona::Pessimist,
                ModelConfig::member_default(),
            ),
        ];
        let config = TeamConfig {
            name: "test panel".to_string(),
            members,
            judge_instructions: library.profile(Persona::Judge).instructions.clone(),
            model: ModelConfig::judge_default(),
            tools: Vec::new(),
            behavior,
            markdown,
        };
        DeliberationRequest {
            topic: "solar adoption".to_string(),
            request_text:
                "Based on the reports from all agents, provide a comprehensive and balanced final assessment on the topic: solar adoption"
                    .to_string(),
            config,
        }
    }

    #[tokio::test]
    async fn invoke_gathers_reports_then_synthesizes() {
        let provider = Arc::new(ScriptedProvider::default());
        let engine = DeliberationEngine::new(provider.clone());
        let request = request_with(
            TeamBehavior::default().with_show_member_responses(true),
            false,
        );

        let result = engine.invoke(&request).await.unwrap();

        assert_eq!(result.member_reports.len(), 2);
        assert_eq!(result.member_reports[0].persona, "Optimist");
        assert_eq!(result.member_reports[1].persona, "Pessimist");
        assert_eq!(result.model, crate::model::DEFAULT_JUDGE_MODEL);

        // Two member calls plus the judge call, usage summed across all three.
        let calls = provider.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(result.usage.input_tokens, Some(3));
        assert_eq!(result.usage.total_tokens, Some(9));

        // The judge sees every member report embedded in its prompt.
        let judge_user = &calls[2].2;
        assert!(judge_user.contains("canned response 0"));
        assert!(judge_user.contains("canned response 1"));
        assert!(judge_user.contains("Based on the reports from all agents"));
    }

    #[tokio::test]
    async fn member_reports_are_hidden_unless_requested() {
        let provider = Arc::new(ScriptedProvider::default());
        let engine = DeliberationEngine::new(provider);
        let request = request_with(TeamBehavior::default(), false);

        let result = engine.invoke(&request).await.unwrap();
        assert!(result.member_reports.is_empty());
    }

    #[tokio::test]
    async fn delegate_to_all_off_skips_member_fanout() {
        let provider = Arc::new(ScriptedProvider::default());
        let engine = DeliberationEngine::new(provider.clone());
        let request = request_with(TeamBehavior::default().with_delegate_to_all(false), false);

        let result = engine.invoke(&request).await.unwrap();
        assert!(result.member_reports.is_empty());
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn expose_member_info_labels_reports() {
        let provider = Arc::new(ScriptedProvider::default());
        let engine = DeliberationEngine::new(provider.clone());
        let request = request_with(TeamBehavior::default().with_expose_member_info(true), false);

        engine.invoke(&request).await.unwrap();
        let judge_user = provider.calls().last().unwrap().2.clone();
        assert!(judge_user.contains("Optimist report:"));
        assert!(judge_user.contains("Pessimist report:"));
    }

    #[tokio::test]
    async fn anonymous_reports_are_numbered() {
        let provider = Arc::new(ScriptedProvider::default());
        let engine = DeliberationEngine::new(provider.clone());
        let request = request_with(TeamBehavior::default(), false);

        engine.invoke(&request).await.unwrap();
        let judge_user = provider.calls().last().unwrap().2.clone();
        assert!(judge_user.contains("Report 1:"));
        assert!(!judge_user.contains("Optimist report:"));
    }

    #[tokio::test]
    async fn shared_interactions_run_members_in_sequence() {
        let provider = Arc::new(ScriptedProvider::default());
        let engine = DeliberationEngine::new(provider.clone());
        let request = request_with(
            TeamBehavior::default().with_share_member_interactions(true),
            false,
        );

        engine.invoke(&request).await.unwrap();
        let calls = provider.calls();
        // The second member's prompt carries the first member's report.
        assert!(calls[1].2.contains("canned response 0"));
        assert!(calls[1].2.contains("Reports shared so far"));
    }

    #[tokio::test]
    async fn stored_reports_survive_the_run() {
        let provider = Arc::new(ScriptedProvider::default());
        let engine = DeliberationEngine::new(provider);
        let request = request_with(
            TeamBehavior::default().with_store_member_responses(true),
            false,
        );

        assert!(engine.stored_reports().await.is_none());
        engine.invoke(&request).await.unwrap();

        let record = engine.stored_reports().await.unwrap();
        assert_eq!(record.reports.len(), 2);
        assert!(!record.id.is_empty());
    }

    #[tokio::test]
    async fn failed_member_is_skipped_and_run_succeeds() {
        let provider = Arc::new(ScriptedProvider::failing_for("Pessimist Agent"));
        let engine = DeliberationEngine::new(provider.clone());
        let request = request_with(
            TeamBehavior::default().with_show_member_responses(true),
            false,
        );

        let result = engine.invoke(&request).await.unwrap();
        assert_eq!(result.member_reports.len(), 1);
        assert_eq!(result.member_reports[0].persona, "Optimist");
    }

    #[tokio::test]
    async fn run_fails_when_every_member_fails() {
        // Both member system prompts mention the reasoning system, so this
        // marker fails them all while leaving no judge call to reach.
        let provider = Arc::new(ScriptedProvider::failing_for("multi-agent reasoning system"));
        let engine = DeliberationEngine::new(provider);
        let request = request_with(TeamBehavior::default(), false);

        let err = engine.invoke(&request).await.unwrap_err();
        assert!(matches!(err, EngineError::ServerError(_)));
    }

    #[tokio::test]
    async fn markdown_directive_reaches_the_judge_system_prompt() {
        let provider = Arc::new(ScriptedProvider::default());
        let engine = DeliberationEngine::new(provider.clone());
        let request = request_with(TeamBehavior::default(), true);

        engine.invoke(&request).await.unwrap();
        let judge_system = provider.calls().last().unwrap().1.clone();
        assert!(judge_system.contains("Format your response in Markdown."));
    }

    #[tokio::test]
    async fn streaming_emits_member_sections_when_requested() {
        let provider = Arc::new(ScriptedProvider::default());
        let engine = DeliberationEngine::new(provider);
        let request = request_with(
            TeamBehavior::default().with_stream_intermediate_steps(true),
            false,
        );

        let stream = engine.invoke_stream(&request).await.unwrap();
        let chunks: Vec<String> = stream.map(|c| c.unwrap()).collect().await;

        assert_eq!(chunks.len(), 4);
        assert!(chunks[0].starts_with("[Optimist]"));
        assert!(chunks[1].starts_with("[Pessimist]"));
        assert_eq!(chunks[2], "S1");
        assert_eq!(chunks[3], "S2");
    }

    #[tokio::test]
    async fn streaming_defaults_to_judge_output_only() {
        let provider = Arc::new(ScriptedProvider::default());
        let engine = DeliberationEngine::new(provider);
        let request = request_with(TeamBehavior::default(), false);

        let stream = engine.invoke_stream(&request).await.unwrap();
        let chunks: Vec<String> = stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks, vec!["S1", "S2"]);
    }
}
