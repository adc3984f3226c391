//! The travel crew
//!
//! Runs identify → gather → plan in order. Each task sees the results of the
//! tasks before it; the plan task's answer is the crew's result.

use super::roles::{AgentSpec, TaskSpec};
use super::{CrewInputs, Orchestrator};
use crate::config::LlmConfig;
use crate::llm::{build_provider, ChatMessage, ModelSelection, SharedProvider};
use crate::relay::TextSink;
use crate::{Result, TrippyError};

/// Sequential three-agent crew backed by an LLM provider
pub struct TravelCrew {
    llm: LlmConfig,

    /// Fixed provider; when unset one is built per run from the model selection
    provider: Option<SharedProvider>,

    verbose: bool,
}

impl TravelCrew {
    pub fn new(llm: LlmConfig) -> Self {
        Self {
            llm,
            provider: None,
            verbose: true,
        }
    }

    /// Always use `provider`, ignoring the run's model selection
    pub fn with_provider(mut self, provider: SharedProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Print agent/task banners into the output (on by default)
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn provider_for(&self, inputs: &CrewInputs) -> Result<SharedProvider> {
        if let Some(provider) = &self.provider {
            return Ok(provider.clone());
        }
        let selection = ModelSelection::parse(&inputs.model)?;
        Ok(build_provider(&self.llm, &selection)?)
    }

    fn tasks(inputs: &CrewInputs) -> Vec<TaskSpec> {
        vec![
            TaskSpec::identify(AgentSpec::city_selector(), inputs),
            TaskSpec::gather(AgentSpec::local_expert(), inputs),
            TaskSpec::plan(AgentSpec::travel_concierge(), inputs),
        ]
    }
}

impl Orchestrator for TravelCrew {
    fn kickoff(&self, inputs: &CrewInputs, output: &mut dyn TextSink) -> Result<String> {
        let provider = self.provider_for(inputs)?;
        tracing::info!(
            provider = provider.id(),
            model = provider.model(),
            "Crew kickoff"
        );

        let mut context: Vec<String> = Vec::new();

        for task in Self::tasks(inputs) {
            if self.verbose {
                output.write(&format!("# Agent: {}\n", task.agent.role));
                output.write(&format!("## Task: {}\n\n", first_line(&task.description)));
                output.write("## Final Answer:\n");
            }

            let messages = vec![
                ChatMessage::system(task.agent.system_prompt()),
                ChatMessage::user(task.prompt(&context)),
            ];
            let answer = provider.chat(&messages, output)?;

            if self.verbose {
                output.write("\n\n");
            }
            tracing::debug!(agent = %task.agent.role, chars = answer.len(), "Task finished");
            context.push(answer);
        }

        output.flush();
        context
            .pop()
            .filter(|plan| !plan.trim().is_empty())
            .ok_or_else(|| TrippyError::orchestration("the crew produced an empty plan"))
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}
