//! Winner selection

use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::parser::parse_vendor_choice;
use crate::prompt::DecisionPromptBuilder;
use std::sync::Arc;
use tenderline_domain::traits::ChatProvider;
use tenderline_domain::{AttributedReply, CorrelationToken, Decision, DecisionMethod};
use tokio::time::timeout;
use tracing::{info, warn};

/// Picks a winning vendor from attributed replies
pub struct DecisionEngine {
    llm: Arc<dyn ChatProvider>,
    config: WorkflowConfig,
}

impl DecisionEngine {
    /// Create a new engine
    pub fn new(llm: Arc<dyn ChatProvider>, config: WorkflowConfig) -> Self {
        Self { llm, config }
    }

    /// Select one vendor from `vendor_names`
    ///
    /// Asks the reasoning model first. Any failure (error, timeout, output
    /// that does not name a candidate) resolves to [`fallback_decision`];
    /// this method itself never fails.
    pub async fn decide(
        &self,
        token: &CorrelationToken,
        vendor_names: &[String],
        replies: &[AttributedReply],
    ) -> Decision {
        if vendor_names.is_empty() {
            return fallback_decision(vendor_names, replies, None);
        }

        let request = DecisionPromptBuilder::new(token, vendor_names, replies)
            .with_excerpt_chars(self.config.reply_excerpt_chars)
            .build();

        let content = match timeout(self.config.decision_timeout(), self.llm.chat(&request)).await {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => {
                let failure = WorkflowError::from(e);
                warn!(token = %token, error = %failure, "winner selection unavailable");
                return fallback_decision(vendor_names, replies, None);
            }
            Err(_) => {
                warn!(
                    token = %token,
                    timeout_secs = self.config.decision_timeout_secs,
                    "winner selection timed out"
                );
                return fallback_decision(vendor_names, replies, None);
            }
        };

        match parse_vendor_choice(&content, vendor_names) {
            Ok(choice) => {
                info!(token = %token, vendor = %choice.vendor, "winner selected by model");
                Decision {
                    selected_vendor: Some(choice.vendor),
                    rationale: choice.reason,
                    raw_model_output: None,
                    method: DecisionMethod::Model,
                }
            }
            Err(e) => {
                warn!(token = %token, error = %e, "unusable model output");
                fallback_decision(vendor_names, replies, Some(content))
            }
        }
    }
}

/// Deterministic selection by reply count
///
/// The vendor with the most attributed replies wins; ties go to the earliest
/// vendor in `vendor_names`, so with no replies at all the first vendor is
/// chosen. `raw_model_output` is carried through unchanged.
pub fn fallback_decision(
    vendor_names: &[String],
    replies: &[AttributedReply],
    raw_model_output: Option<String>,
) -> Decision {
    let mut best: Option<(&String, usize)> = None;
    for vendor in vendor_names {
        let count = replies.iter().filter(|r| r.is_from(vendor)).count();
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((vendor, count)),
        }
    }

    let (selected_vendor, rationale) = match best {
        Some((vendor, count)) => (
            Some(vendor.clone()),
            format!(
                "Selected by fallback heuristic based on reply counts ({} {}).",
                count,
                if count == 1 { "reply" } else { "replies" }
            ),
        ),
        None => (
            None,
            "No vendors to evaluate; fallback heuristic selected nobody.".to_string(),
        ),
    };

    Decision {
        selected_vendor,
        rationale,
        raw_model_output,
        method: DecisionMethod::Fallback,
    }
}
