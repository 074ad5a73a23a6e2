//! Static agent descriptor.

use bon::Builder;

use crate::config::PlannerConfig;
use crate::models::GeminiModel;
use crate::tools::ToolSpec;
use crate::types::GenerationSettings;

use super::persona;

/// Everything the runner needs to drive the hosted agent.
#[derive(Debug, Clone, Builder, PartialEq)]
pub struct AgentDefinition {
    #[builder(into)]
    pub name: String,
    #[builder(default)]
    pub model: GeminiModel,
    #[builder(into, default)]
    pub description: String,
    /// System instruction (the persona).
    #[builder(into)]
    pub instruction: String,
    #[builder(default)]
    pub tools: Vec<ToolSpec>,
    #[builder(default)]
    pub settings: GenerationSettings,
}

impl AgentDefinition {
    /// The tourism recommendation agent for the configured country and model.
    pub fn trip_planner(config: &PlannerConfig) -> Self {
        Self::builder()
            .name(persona::AGENT_NAME)
            .model(config.model().clone())
            .description(persona::description(config.country()))
            .instruction(persona::instruction(config.country()))
            .tools(vec![ToolSpec::GoogleSearch])
            .build()
    }

    pub fn has_tool(&self, tool: ToolSpec) -> bool {
        self.tools.contains(&tool)
    }
}
