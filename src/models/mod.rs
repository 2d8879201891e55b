// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Assignment, Family, ForbiddenPair, GiftPair, HardRules, PenaltyWeights, Role, Roster};
pub use requests::AssignRequest;
pub use responses::{AssignmentResponse, ErrorResponse, HealthResponse};
