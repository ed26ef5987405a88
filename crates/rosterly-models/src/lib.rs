//! # Rosterly Models
//!
//! Shared domain types for the Rosterly API:
//!
//! - [`ids`]: strongly-typed UUID newtypes per entity
//! - [`roles`]: the closed [`roles::Role`] enumeration and its static
//!   permission table
//! - [`status`]: enrollment, assignment, and fee status enumerations

pub mod ids;
pub mod roles;
pub mod status;

pub use roles::Role;
pub use status::{AssignmentStatus, EnrollmentStatus, FeeStatus};
