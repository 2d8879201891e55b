use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{Family, HardRules, PenaltyWeights, Roster};

/// Request to compute an assignment for an ad-hoc roster
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignRequest {
    #[validate(length(min = 1))]
    pub families: Vec<Family>,
    /// Overrides the server's configured weights
    #[serde(default)]
    #[validate(nested)]
    pub weights: Option<PenaltyWeights>,
    /// Overrides the server's configured hard rules
    #[serde(default)]
    pub rules: Option<HardRules>,
}

impl AssignRequest {
    pub fn roster(&self) -> Roster {
        Roster::new(self.families.clone())
    }

    /// Names listed across all families, an upper bound on participants
    pub fn headcount(&self) -> usize {
        self.families.iter().map(Family::headcount).sum()
    }
}
