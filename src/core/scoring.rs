use crate::core::relationships::{PersonId, RelationshipModel};
use crate::core::state::PartialAssignment;
use crate::models::PenaltyWeights;

/// Penalty score for `candidate` giving to `receiver` (lower is better)
///
/// Rules are additive and independent:
///
/// | condition                                             | weight                       |
/// |-------------------------------------------------------|------------------------------|
/// | parent of the other                                   | `parent_child`               |
/// | shared grandparent, grandparent and child             | `grandparent_grandchild`     |
/// | shared grandparent, any other pairing                 | `shared_grandparents`        |
/// | both grandparents                                     | `grandparent_to_grandparent` |
/// | load >= `max_ideal_gifts`                             | `too_many_gifts`             |
/// | load == 0                                             | `first_gift_bonus`           |
/// | load == 1, previous receiver and receiver both adults | `two_adults`                 |
/// | load == 1, both children                              | `two_children`               |
/// | load == 1, one child and one adult                    | `mixed_bonus`                |
pub fn score_candidate(
    model: &RelationshipModel,
    receiver: PersonId,
    candidate: PersonId,
    state: &PartialAssignment,
    weights: &PenaltyWeights,
) -> i32 {
    relationship_penalty(model, receiver, candidate, weights)
        + load_penalty(model, receiver, candidate, state, weights)
}

/// Part of the score that depends only on the roster
#[inline]
pub fn relationship_penalty(
    model: &RelationshipModel,
    receiver: PersonId,
    candidate: PersonId,
    weights: &PenaltyWeights,
) -> i32 {
    let mut score = 0;

    if model.is_parent_of(candidate, receiver) || model.is_parent_of(receiver, candidate) {
        score += weights.parent_child;
    }

    if model.share_grandparent(candidate, receiver) {
        let grandparent_and_child = (model.is_grandparent(candidate) && model.is_child(receiver))
            || (model.is_child(candidate) && model.is_grandparent(receiver));
        score += if grandparent_and_child {
            weights.grandparent_grandchild
        } else {
            weights.shared_grandparents
        };
    }

    if model.is_grandparent(candidate) && model.is_grandparent(receiver) {
        score += weights.grandparent_to_grandparent;
    }

    score
}

/// Part of the score that depends on the candidate's current gifts
#[inline]
pub fn load_penalty(
    model: &RelationshipModel,
    receiver: PersonId,
    candidate: PersonId,
    state: &PartialAssignment,
    weights: &PenaltyWeights,
) -> i32 {
    let load = state.load(candidate);
    let mut score = 0;

    if load >= weights.max_ideal_gifts {
        score += weights.too_many_gifts;
    }

    if load == 0 {
        score += weights.first_gift_bonus;
    }

    if load == 1 {
        if let Some(&previous) = state.receivers_of(candidate).first() {
            if model.is_adult(previous) && model.is_adult(receiver) {
                score += weights.two_adults;
            }
            if model.is_child(previous) && model.is_child(receiver) {
                score += weights.two_children;
            }
            if (model.is_adult(previous) && model.is_child(receiver))
                || (model.is_child(previous) && model.is_adult(receiver))
            {
                score += weights.mixed_bonus;
            }
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Family, Roster};

    fn create_test_model() -> RelationshipModel {
        RelationshipModel::build(&Roster::new(vec![
            Family::new(["Lea"], ["Arie", "Mila"], ["Dov", "Michele"]),
            Family::new(["Ofir"], ["Emma"], ["Dov", "Michele"]),
            Family::new(["Jonas"], ["Saul"], ["Roland"]),
        ]))
    }

    fn score(model: &RelationshipModel, receiver: &str, candidate: &str, state: &PartialAssignment) -> i32 {
        score_candidate(
            model,
            model.id_of(receiver).unwrap(),
            model.id_of(candidate).unwrap(),
            state,
            &PenaltyWeights::default(),
        )
    }

    #[test]
    fn test_parent_to_own_child() {
        let model = create_test_model();
        let state = PartialAssignment::new(model.len());
        // parent/child 25 + shared grandparents 20 + first gift -5
        assert_eq!(score(&model, "Arie", "Lea", &state), 40);
    }

    #[test]
    fn test_grandparent_to_grandchild() {
        let model = create_test_model();
        let state = PartialAssignment::new(model.len());
        assert_eq!(score(&model, "Arie", "Dov", &state), 20);
    }

    #[test]
    fn test_grandparent_couple() {
        let model = create_test_model();
        let state = PartialAssignment::new(model.len());
        // each grandparent's ancestor set holds only themselves
        assert_eq!(score(&model, "Michele", "Dov", &state), 10);
    }

    #[test]
    fn test_grandparent_pair_sharing_an_ancestor() {
        let model = RelationshipModel::build(&Roster::new(vec![
            Family::new(["Dov"], Vec::<String>::new(), ["Great"]),
            Family::new(["Lea"], Vec::<String>::new(), ["Dov"]),
        ]));
        let state = PartialAssignment::new(model.len());
        // shared grandparents 20 + grandparent pair 15 + first gift -5
        assert_eq!(score(&model, "Dov", "Great", &state), 30);
    }

    #[test]
    fn test_unrelated_grandparents() {
        let model = create_test_model();
        let state = PartialAssignment::new(model.len());
        assert_eq!(score(&model, "Roland", "Dov", &state), 10);
    }

    #[test]
    fn test_aunt_to_nephew_shares_grandparents() {
        let model = create_test_model();
        let state = PartialAssignment::new(model.len());
        assert_eq!(score(&model, "Emma", "Lea", &state), 15);
    }

    #[test]
    fn test_unrelated_first_gift_bonus() {
        let model = create_test_model();
        let state = PartialAssignment::new(model.len());
        assert_eq!(score(&model, "Saul", "Lea", &state), -5);
    }

    #[test]
    fn test_second_gift_mix_rules() {
        let model = create_test_model();
        let id = |name: &str| model.id_of(name).unwrap();

        let mut state = PartialAssignment::new(model.len());
        state.commit(id("Jonas"), id("Lea"));
        // adult then child: mixed bonus
        assert_eq!(score(&model, "Saul", "Lea", &state), -5);
        // adult then adult
        assert_eq!(score(&model, "Roland", "Lea", &state), 100);

        let mut state = PartialAssignment::new(model.len());
        state.commit(id("Saul"), id("Ofir"));
        // unrelated child then cousin-of-own-child: two children + shared grandparents
        assert_eq!(score(&model, "Arie", "Ofir", &state), 30);
    }

    #[test]
    fn test_overloaded_giver() {
        let model = create_test_model();
        let id = |name: &str| model.id_of(name).unwrap();

        let mut state = PartialAssignment::new(model.len());
        state.commit(id("Jonas"), id("Lea"));
        state.commit(id("Saul"), id("Lea"));
        assert_eq!(score(&model, "Roland", "Lea", &state), 40);
    }

    #[test]
    fn test_custom_weights() {
        let model = create_test_model();
        let state = PartialAssignment::new(model.len());
        let weights = PenaltyWeights {
            first_gift_bonus: 0,
            parent_child: 1000,
            ..PenaltyWeights::default()
        };
        let lea = model.id_of("Lea").unwrap();
        let arie = model.id_of("Arie").unwrap();
        assert_eq!(score_candidate(&model, arie, lea, &state, &weights), 1020);
    }
}
