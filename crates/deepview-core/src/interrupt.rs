use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::transcript::lenient_entries;

/// A proposed action the agent paused on, awaiting human review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Which decisions the reviewer may take for one named action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(rename = "actionName", alias = "action_name", default)]
    pub action_name: String,
    #[serde(rename = "allowedDecisions", alias = "allowed_decisions", default)]
    pub allowed_decisions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingInterrupt {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub action_requests: Vec<ActionRequest>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub review_configs: Vec<ReviewConfig>,
}

/// Name-keyed lookups over a pending interrupt. Only the final turn of a
/// transcript is ever handed one of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterruptProjection {
    pub actions: BTreeMap<String, ActionRequest>,
    pub review_configs: BTreeMap<String, ReviewConfig>,
}

impl InterruptProjection {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.review_configs.is_empty()
    }

    pub fn action(&self, name: &str) -> Option<&ActionRequest> {
        self.actions.get(name)
    }

    pub fn review_config(&self, name: &str) -> Option<&ReviewConfig> {
        self.review_configs.get(name)
    }
}

/// Repeated names overwrite earlier entries.
pub fn project_interrupt(interrupt: Option<&PendingInterrupt>) -> InterruptProjection {
    let Some(interrupt) = interrupt else {
        return InterruptProjection::default();
    };

    let actions = interrupt
        .action_requests
        .iter()
        .map(|request| (request.name.clone(), request.clone()))
        .collect();
    let review_configs = interrupt
        .review_configs
        .iter()
        .map(|config| (config.action_name.clone(), config.clone()))
        .collect();

    InterruptProjection {
        actions,
        review_configs,
    }
}
