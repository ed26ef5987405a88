//! # Rosterly Core
//!
//! Foundational types shared across the Rosterly API:
//!
//! - [`errors`]: application error type with HTTP response conversion
//! - [`pagination`]: pagination parameters and response metadata
//! - [`password`]: bcrypt password hashing and verification
//! - [`permissions`]: permission name constants

pub mod errors;
pub mod pagination;
pub mod password;
pub mod permissions;

pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
