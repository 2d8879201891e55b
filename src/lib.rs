//! Family Santa - deterministic gift-exchange assignment for families
//!
//! Builds a relationship model from a roster of families, scores every
//! possible giver for each receiver and runs a backtracking search that
//! commits the best-scoring giver per receiver.

pub mod config;
pub mod core;
pub mod models;
pub mod report;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{compute_assignment, Assigner, AssignmentError, RelationshipModel};
pub use crate::models::{Assignment, Family, HardRules, PenaltyWeights, Roster};
pub use crate::report::AssignmentReport;
