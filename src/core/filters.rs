use std::collections::HashSet;

use crate::core::relationships::{PersonId, RelationshipModel};
use crate::models::HardRules;

/// Hard rules with names resolved against a relationship model
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    forbid_parent_child: bool,
    /// (giver, receiver)
    pairs: HashSet<(PersonId, PersonId)>,
}

impl Exclusions {
    /// Resolve `rules` against `model`; pairs naming unknown people are dropped
    pub fn resolve(rules: &HardRules, model: &RelationshipModel) -> Self {
        let pairs = rules
            .forbidden_pairs
            .iter()
            .filter_map(|pair| {
                match (model.id_of(&pair.giver), model.id_of(&pair.receiver)) {
                    (Some(giver), Some(receiver)) => Some((giver, receiver)),
                    _ => {
                        tracing::warn!(
                            "Ignoring forbidden pair {} -> {}: not in roster",
                            pair.giver,
                            pair.receiver
                        );
                        None
                    }
                }
            })
            .collect();

        Self {
            forbid_parent_child: rules.forbid_parent_child,
            pairs,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.forbid_parent_child && self.pairs.is_empty()
    }

    /// True when `candidate` must never give to `receiver`
    #[inline]
    pub fn excludes(
        &self,
        model: &RelationshipModel,
        receiver: PersonId,
        candidate: PersonId,
    ) -> bool {
        if self.forbid_parent_child
            && (model.is_parent_of(candidate, receiver) || model.is_parent_of(receiver, candidate))
        {
            return true;
        }

        self.pairs.contains(&(candidate, receiver))
    }
}

/// Structural pre-filter: nobody gives to themselves, children never give
#[inline]
pub fn is_eligible_giver(model: &RelationshipModel, receiver: PersonId, candidate: PersonId) -> bool {
    candidate != receiver && !model.is_child(candidate)
}

/// Candidates for `receiver`, in eligible-giver order
pub fn candidate_givers<'a>(
    model: &'a RelationshipModel,
    exclusions: &'a Exclusions,
    receiver: PersonId,
) -> impl Iterator<Item = PersonId> + 'a {
    model
        .eligible_givers()
        .iter()
        .copied()
        .filter(move |&candidate| is_eligible_giver(model, receiver, candidate))
        .filter(move |&candidate| !exclusions.excludes(model, receiver, candidate))
}
