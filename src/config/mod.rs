//! Application configuration, loaded from environment variables.
//!
//! - [`cors`]: allowed origins for the HTTP layer
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`jwt`]: token secret and expiries
//! - [`lockout`]: failed-login lockout policy
//! - [`rate_limit`]: IP-based request rate limits

pub mod cors;
pub mod database;
pub mod jwt;
pub mod lockout;
pub mod rate_limit;
