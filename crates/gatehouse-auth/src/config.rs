//! Authentication configuration.

use chrono::Duration;

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session lifetime in days, applied at creation and on renewal (default: 7).
    pub session_duration_days: i64,
    /// Trailing window before expiry in which a verified session is renewed
    /// (default: 24 hours).
    pub renewal_window_hours: i64,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Argon2id memory cost in KiB (default: 19456 = 19 MiB).
    pub argon2_memory_kib: u32,
    /// Argon2id iteration count (default: 2).
    pub argon2_iterations: u32,
    /// Argon2id parallelism (default: 1).
    pub argon2_parallelism: u32,
    /// Mark session cookies `Secure` (default: true; disable for local HTTP).
    pub secure_cookies: bool,
}

impl AuthConfig {
    pub fn session_duration(&self) -> Duration {
        Duration::days(self.session_duration_days)
    }

    pub fn renewal_window(&self) -> Duration {
        Duration::hours(self.renewal_window_hours)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_duration_days: 7,
            renewal_window_hours: 24,
            pepper: None,
            // OWASP ASVS: m=19456 (19 MiB), t=2, p=1
            argon2_memory_kib: 19456,
            argon2_iterations: 2,
            argon2_parallelism: 1,
            secure_cookies: true,
        }
    }
}
