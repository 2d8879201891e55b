use thiserror::Error;

use crate::core::{
    filters::{candidate_givers, Exclusions},
    relationships::{PersonId, RelationshipModel},
    scoring::score_candidate,
    state::PartialAssignment,
};
use crate::models::{Assignment, GiftPair, HardRules, PenaltyWeights, Roster};

/// Commit budget used when none is configured
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// Errors that can occur while searching for an assignment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("No valid solution found")]
    NoSolutionFound,

    #[error("Search stopped after {0} commits without a solution")]
    StepLimitReached(usize),
}

/// Result of a successful search
#[derive(Debug, Clone)]
pub struct AssignmentResult {
    pub assignment: Assignment,
    /// Number of tentative commits made
    pub explored: usize,
    /// Number of commits undone
    pub rollbacks: usize,
}

#[derive(Debug, Default)]
struct SearchStats {
    explored: usize,
    rollbacks: usize,
}

/// Ranked candidates for one receiver and how far through them the search is
struct Frame {
    receiver: PersonId,
    ranked: Vec<(i32, PersonId)>,
    next: usize,
    committed: bool,
}

/// Backtracking search over receivers in participant order
///
/// For each receiver every remaining candidate is scored against the
/// partial assignment, sorted best-first (ties keep eligible-giver order)
/// and tried in turn. A candidate whose subtree fails is rolled back before
/// the next one is tried. Receivers are tracked on an explicit stack, so
/// roster size does not bound call depth.
#[derive(Debug, Clone)]
pub struct Assigner {
    weights: PenaltyWeights,
    rules: HardRules,
    max_steps: usize,
}

impl Assigner {
    pub fn new(weights: PenaltyWeights, rules: HardRules) -> Self {
        Self {
            weights,
            rules,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(PenaltyWeights::default(), HardRules::default())
    }

    /// Cap the number of commits a single search may make
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn weights(&self) -> &PenaltyWeights {
        &self.weights
    }

    pub fn rules(&self) -> &HardRules {
        &self.rules
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Assign a giver to every participant in `roster`
    pub fn assign(&self, roster: &Roster) -> Result<AssignmentResult, AssignmentError> {
        let model = RelationshipModel::build(roster);
        self.assign_model(&model)
    }

    /// Same as [`Assigner::assign`] for an already built model
    pub fn assign_model(&self, model: &RelationshipModel) -> Result<AssignmentResult, AssignmentError> {
        let exclusions = Exclusions::resolve(&self.rules, model);

        // Exclusions do not depend on the partial assignment, so a receiver
        // nobody may give to fails every branch of the search.
        if let Some(receiver) = model
            .participants()
            .find(|&receiver| candidate_givers(model, &exclusions, receiver).next().is_none())
        {
            tracing::warn!("No eligible giver for {}", model.name(receiver));
            return Err(AssignmentError::NoSolutionFound);
        }

        let mut state = PartialAssignment::new(model.len());
        let mut stats = SearchStats::default();

        if !self.search(model, &exclusions, &mut state, 0, &mut stats)? {
            tracing::warn!(
                "No assignment for {} participants after {} commits",
                model.len(),
                stats.explored
            );
            return Err(AssignmentError::NoSolutionFound);
        }
        debug_assert!(state.is_complete());

        let pairs = model
            .participants()
            .filter_map(|receiver| {
                let giver = state.giver_of(receiver)?;
                Some(GiftPair {
                    receiver: model.name(receiver).to_string(),
                    giver: model.name(giver).to_string(),
                    receiver_role: model.person(receiver).role(),
                })
            })
            .collect();

        tracing::info!(
            "Assigned {} receivers ({} commits, {} rollbacks)",
            model.len(),
            stats.explored,
            stats.rollbacks
        );

        Ok(AssignmentResult {
            assignment: Assignment::from_pairs(pairs),
            explored: stats.explored,
            rollbacks: stats.rollbacks,
        })
    }

    /// Extend `state` from receiver `index` onward
    ///
    /// Receivers before `index` must already be committed. Unless the
    /// search succeeds, `state` is left exactly as it was passed in.
    pub fn complete_from(
        &self,
        model: &RelationshipModel,
        state: &mut PartialAssignment,
        index: usize,
    ) -> Result<bool, AssignmentError> {
        let exclusions = Exclusions::resolve(&self.rules, model);
        let mut stats = SearchStats::default();
        self.search(model, &exclusions, state, index, &mut stats)
    }

    fn search(
        &self,
        model: &RelationshipModel,
        exclusions: &Exclusions,
        state: &mut PartialAssignment,
        start: usize,
        stats: &mut SearchStats,
    ) -> Result<bool, AssignmentError> {
        let mut frames: Vec<Frame> = Vec::new();
        let mut index = start;

        loop {
            if index >= model.len() {
                return Ok(true);
            }
            frames.push(self.rank(model, exclusions, state, PersonId(index)));

            // Move the deepest receiver on to its next candidate, popping
            // receivers whose candidates are exhausted.
            loop {
                let Some(frame) = frames.last_mut() else {
                    return Ok(false);
                };

                if frame.committed {
                    state.rollback(frame.receiver);
                    frame.committed = false;
                    stats.rollbacks += 1;
                    tracing::debug!("Rolled back {}", model.name(frame.receiver));
                }

                let Some(&(score, giver)) = frame.ranked.get(frame.next) else {
                    frames.pop();
                    continue;
                };

                if stats.explored >= self.max_steps {
                    unwind(state, &frames);
                    tracing::warn!("Search stopped after {} commits", stats.explored);
                    return Err(AssignmentError::StepLimitReached(stats.explored));
                }

                let receiver = frame.receiver;
                tracing::trace!(
                    "{} <- {} (score {})",
                    model.name(receiver),
                    model.name(giver),
                    score
                );

                frame.next += 1;
                frame.committed = true;
                state.commit(receiver, giver);
                stats.explored += 1;

                index = receiver.0 + 1;
                break;
            }
        }
    }

    fn rank(
        &self,
        model: &RelationshipModel,
        exclusions: &Exclusions,
        state: &PartialAssignment,
        receiver: PersonId,
    ) -> Frame {
        let mut ranked: Vec<(i32, PersonId)> = candidate_givers(model, exclusions, receiver)
            .map(|candidate| {
                (
                    score_candidate(model, receiver, candidate, state, &self.weights),
                    candidate,
                )
            })
            .collect();

        // Stable: equal scores keep eligible-giver order
        ranked.sort_by_key(|&(score, _)| score);

        Frame {
            receiver,
            ranked,
            next: 0,
            committed: false,
        }
    }
}

/// Undo every commit still held by `frames`
fn unwind(state: &mut PartialAssignment, frames: &[Frame]) {
    for frame in frames.iter().rev().filter(|frame| frame.committed) {
        state.rollback(frame.receiver);
    }
}

impl Default for Assigner {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Compute an assignment for `roster` with the default weights and no hard rules
pub fn compute_assignment(roster: &Roster) -> Result<Assignment, AssignmentError> {
    Assigner::with_default_weights()
        .assign(roster)
        .map(|result| result.assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Family, ForbiddenPair};

    fn no_one() -> Vec<String> {
        Vec::new()
    }

    #[test]
    fn test_prefers_unrelated_giver_for_child() {
        let roster = Roster::new(vec![
            Family::new(["A"], ["B"], no_one()),
            Family::new(["C"], no_one(), no_one()),
        ]);

        let assignment = compute_assignment(&roster).unwrap();

        assert_eq!(assignment.giver_of("A"), Some("C"));
        assert_eq!(assignment.giver_of("B"), Some("C"));
        assert_eq!(assignment.giver_of("C"), Some("A"));
    }

    #[test]
    fn test_single_parent_and_child_has_no_solution() {
        let roster = Roster::new(vec![Family::new(["A"], ["B"], no_one())]);
        assert_eq!(compute_assignment(&roster), Err(AssignmentError::NoSolutionFound));
    }

    #[test]
    fn test_empty_roster_is_trivially_assigned() {
        let assignment = compute_assignment(&Roster::default()).unwrap();
        assert!(assignment.is_empty());
    }

    #[test]
    fn test_soft_rules_never_backtrack() {
        let roster = Roster::new(vec![
            Family::new(["Lea"], ["Arie", "Mila"], ["Dov", "Michele"]),
            Family::new(["Jonas", "Solenne"], no_one(), ["Roland", "Valerie"]),
        ]);

        let result = Assigner::default().assign(&roster).unwrap();

        assert_eq!(result.rollbacks, 0);
        assert_eq!(result.explored, result.assignment.len());
    }

    #[test]
    fn test_child_limited_to_own_parents_fails() {
        // K's only candidates are its own parents
        let roster = Roster::new(vec![Family::new(["P1", "P2"], ["K"], no_one())]);
        let assigner = Assigner::new(
            PenaltyWeights::default(),
            HardRules { forbid_parent_child: true, forbidden_pairs: vec![] },
        );

        let err = assigner.assign(&roster).unwrap_err();
        assert_eq!(err, AssignmentError::NoSolutionFound);
    }

    #[test]
    fn test_failed_subtree_restores_state() {
        let roster = Roster::new(vec![Family::new(["P1", "P2"], ["K"], no_one())]);
        let model = RelationshipModel::build(&roster);
        let p1 = model.id_of("P1").unwrap();
        let p2 = model.id_of("P2").unwrap();
        let assigner = Assigner::new(
            PenaltyWeights::default(),
            HardRules { forbid_parent_child: true, forbidden_pairs: vec![] },
        );

        let mut state = PartialAssignment::new(model.len());
        state.commit(p1, p2);
        let snapshot = state.clone();

        assert!(!assigner.complete_from(&model, &mut state, 1).unwrap());
        assert_eq!(state, snapshot);
        assert_eq!(state.loads(), vec![0, 1, 0]);
    }

    #[test]
    fn test_forbidden_pair_reroutes_gift() {
        let roster = Roster::new(vec![
            Family::new(["A"], ["B"], no_one()),
            Family::new(["C"], no_one(), no_one()),
            Family::new(["D"], no_one(), no_one()),
        ]);
        let assigner = Assigner::new(
            PenaltyWeights::default(),
            HardRules {
                forbid_parent_child: false,
                forbidden_pairs: vec![ForbiddenPair { giver: "C".into(), receiver: "B".into() }],
            },
        );

        let assignment = assigner.assign(&roster).unwrap().assignment;
        assert_ne!(assignment.giver_of("B"), Some("C"));
    }

    fn isolated_child_roster() -> (Roster, HardRules) {
        let mut families = vec![Family::new(["A12"], ["K"], no_one())];
        families.extend((1..12).map(|i| Family::new([format!("A{}", i)], no_one(), no_one())));
        let forbidden_pairs = (1..=12)
            .map(|i| ForbiddenPair { giver: format!("A{}", i), receiver: "K".into() })
            .collect();
        (
            Roster::new(families),
            HardRules { forbid_parent_child: false, forbidden_pairs },
        )
    }

    #[test]
    fn test_receiver_without_candidates_fails_before_searching() {
        let (roster, rules) = isolated_child_roster();

        // No commit is allowed, so failing with NoSolutionFound proves the
        // search never started
        let assigner = Assigner::new(PenaltyWeights::default(), rules.clone()).with_max_steps(0);
        assert_eq!(assigner.assign(&roster).unwrap_err(), AssignmentError::NoSolutionFound);

        let assigner = Assigner::new(PenaltyWeights::default(), rules);
        assert_eq!(assigner.assign(&roster).unwrap_err(), AssignmentError::NoSolutionFound);
    }

    #[test]
    fn test_step_limit_stops_search() {
        let roster = Roster::new(vec![
            Family::new(["A"], ["B"], no_one()),
            Family::new(["C"], no_one(), no_one()),
        ]);
        let assigner = Assigner::default().with_max_steps(2);

        assert_eq!(
            assigner.assign(&roster).unwrap_err(),
            AssignmentError::StepLimitReached(2)
        );
        assert!(Assigner::default().with_max_steps(3).assign(&roster).is_ok());
    }

    #[test]
    fn test_step_limit_restores_state() {
        let roster = Roster::new(vec![
            Family::new(["A"], ["B"], no_one()),
            Family::new(["C"], no_one(), no_one()),
        ]);
        let model = RelationshipModel::build(&roster);
        let assigner = Assigner::default().with_max_steps(1);

        let mut state = PartialAssignment::new(model.len());
        let err = assigner.complete_from(&model, &mut state, 0).unwrap_err();

        assert_eq!(err, AssignmentError::StepLimitReached(1));
        assert_eq!(state, PartialAssignment::new(model.len()));
    }

    #[test]
    fn test_long_roster_does_not_grow_call_stack() {
        let children: Vec<String> = (0..20_000).map(|i| format!("K{}", i)).collect();
        let roster = Roster::new(vec![Family::new(["P1", "P2"], children, no_one())]);

        // Run on a small stack so depth proportional to roster size would overflow
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || compute_assignment(&roster).map(|assignment| assignment.len()))
            .unwrap();

        assert_eq!(handle.join().unwrap(), Ok(20_002));
    }
}
