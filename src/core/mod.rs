// Core algorithm exports
pub mod assigner;
pub mod filters;
pub mod relationships;
pub mod scoring;
pub mod state;

pub use assigner::{compute_assignment, Assigner, AssignmentError, AssignmentResult, DEFAULT_MAX_STEPS};
pub use filters::{candidate_givers, is_eligible_giver, Exclusions};
pub use relationships::{Person, PersonId, RelationshipModel};
pub use scoring::{load_penalty, relationship_penalty, score_candidate};
pub use state::PartialAssignment;
