use std::env;

/// Failed-login lockout policy.
///
/// After `max_attempts` failures for the same `lower(email)|ip` key within
/// the decay window, further login attempts are rejected with a 429 until
/// the window expires. Every failed hit restarts the decay timer.
#[derive(Clone, Debug)]
pub struct LockoutConfig {
    pub max_attempts: i64,
    pub decay_seconds: i64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            decay_seconds: 900,
        }
    }
}

impl LockoutConfig {
    pub fn from_env() -> Self {
        Self {
            max_attempts: env::var("LOGIN_LOCKOUT_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            decay_seconds: env::var("LOGIN_LOCKOUT_DECAY_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
        }
    }
}
