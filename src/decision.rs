use serde::{Deserialize, Serialize};

use crate::types::{RiskLevel, ScreeningResult};

/// Whether a screened address should be refused.
///
/// Sanctions hits and high or critical risk block. PEP and watchlist hits on their own
/// are advisory and never block, and neither does a risk label outside the known bands.
pub fn should_block(result: &ScreeningResult) -> bool {
    result.details.sanctions_hit
        || matches!(result.risk_level, RiskLevel::High | RiskLevel::Critical)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreeningDecision {
    /// Transaction should be blocked
    Block { reason: String },
    /// Advisory flags only, worth a manual look
    Review { reason: String },
    /// Transaction is clear to proceed
    Clear,
}

impl ScreeningDecision {
    pub fn is_block(&self) -> bool {
        matches!(self, ScreeningDecision::Block { .. })
    }
}

/// Expands [`should_block`] into a decision with a reason attached.
pub fn decide(result: &ScreeningResult) -> ScreeningDecision {
    let details = &result.details;

    if details.sanctions_hit {
        return ScreeningDecision::Block {
            reason: format!("Address {} matches a sanctions list", result.resolved_address),
        };
    }
    if should_block(result) {
        return ScreeningDecision::Block {
            reason: format!(
                "Address {} has {} risk (score {})",
                result.resolved_address, result.risk_level, result.score
            ),
        };
    }

    let advisory: Vec<&str> = [(details.pep_hit, "PEP"), (details.watchlist_hit, "watchlist")]
        .into_iter()
        .filter_map(|(hit, name)| hit.then_some(name))
        .collect();

    if advisory.is_empty() {
        ScreeningDecision::Clear
    } else {
        ScreeningDecision::Review {
            reason: format!(
                "Address {} has advisory {} hit",
                result.resolved_address,
                advisory.join(" and ")
            ),
        }
    }
}

impl ScreeningResult {
    pub fn should_block(&self) -> bool {
        should_block(self)
    }

    pub fn decision(&self) -> ScreeningDecision {
        decide(self)
    }
}
