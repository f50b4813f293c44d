//! Winner selection result

use serde::{Deserialize, Serialize};

/// How a decision was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMethod {
    /// The reasoning model picked the vendor
    Model,
    /// The deterministic reply-count heuristic picked the vendor
    Fallback,
}

/// Outcome of the decision step, returned to the caller and never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// Winning vendor; `None` only when no vendors were offered
    pub selected_vendor: Option<String>,

    /// Short explanation of the choice
    pub rationale: String,

    /// Model output kept verbatim when it could not be used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_model_output: Option<String>,

    /// Which path produced the decision
    pub method: DecisionMethod,
}

impl Decision {
    /// Whether the heuristic was used instead of the model
    pub fn is_fallback(&self) -> bool {
        self.method == DecisionMethod::Fallback
    }
}
