//! # Rosterly API
//!
//! A school administration REST API built with Rust, Axum, and PostgreSQL.
//! It implements role-based access control for administrators, teachers,
//! and students.
//!
//! ## Overview
//!
//! Rosterly covers the day-to-day records of a single school:
//!
//! - **Authentication**: JWT sessions with server-side revocation and
//!   login throttling
//! - **Role-Based Access Control**: a closed role set with a static
//!   permission table per role
//! - **Academic structure**: academic years, classes, and subjects
//! - **People**: teacher and student profiles layered over user accounts
//! - **Enrollments**: a per-year subject enrollment lifecycle
//! - **Fees**: additive fee payments with a derived settlement status
//!
//! ## Architecture
//!
//! The codebase follows a modular architecture:
//!
//! ```text
//! src/
//! ├── cli/              # CLI commands (create-superadmin)
//! ├── config/           # Configuration modules (JWT, database, CORS)
//! ├── middleware/       # Auth middleware and permission extractors
//! ├── modules/          # Feature modules
//! │   ├── auth/            # Login, logout, session checks
//! │   ├── users/           # User account management
//! │   ├── students/        # Student profiles, transfers, fees
//! │   ├── teachers/        # Teacher profiles and assignments
//! │   ├── classes/         # Class management
//! │   ├── subjects/        # Subject catalogue
//! │   ├── academic_years/  # Academic year lifecycle
//! │   ├── enrollments/     # Enrollment lifecycle
//! │   └── dashboard/       # Role-specific dashboards
//! └── utils/            # Shared utilities
//! ```
//!
//! Each feature module follows a consistent structure:
//!
//! - `mod.rs`: Module exports
//! - `controller.rs`: HTTP handlers (routes)
//! - `service.rs`: Business logic
//! - `model.rs`: Data models, DTOs, database structs
//! - `router.rs`: Axum router configuration

pub mod cli;
pub mod config;
pub mod docs;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

// Re-export workspace crates.
pub use rosterly_core;
pub use rosterly_models;
