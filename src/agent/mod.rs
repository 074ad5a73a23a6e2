//! Agent definition and its process-wide instance.

mod definition;
pub mod persona;

pub use definition::AgentDefinition;

use std::sync::{Arc, OnceLock};

use tracing::info;

use crate::config::PlannerConfig;

static ROOT_AGENT: OnceLock<Arc<AgentDefinition>> = OnceLock::new();

/// Get (or build) the process-wide trip planner agent.
///
/// Only the first call's configuration is used; later calls return the
/// cached definition.
pub fn boot(config: &PlannerConfig) -> Arc<AgentDefinition> {
    ROOT_AGENT
        .get_or_init(|| {
            let agent = AgentDefinition::trip_planner(config);
            info!(agent = %agent.name, model = %agent.model, "agent ready");
            Arc::new(agent)
        })
        .clone()
}
