//! Gatehouse Auth: password credentials, sliding-expiration sessions,
//! tenant registration and sign-in.
//!
//! Everything here is generic over
//! [`AuthRepository`](gatehouse_core::repository::AuthRepository), so the
//! auth layer has no dependency on a storage engine.

pub mod actions;
pub mod authentication;
pub mod clock;
pub mod config;
pub mod cookie;
pub mod error;
pub mod normalize;
pub mod password;
pub mod registration;
pub mod service;
pub mod session;
pub mod token;

pub use actions::SignOutOutcome;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AuthConfig;
pub use cookie::{CookieError, CookieJar, MemoryCookieJar, SESSION_COOKIE, SameSite, SessionCookie};
pub use error::{AuthError, AuthResult};
pub use password::CredentialVerifier;
pub use registration::{NoopHook, RegisterTenant, Registered, RegistrationHook};
pub use service::AuthService;
pub use session::{SessionManager, VerifiedSession};
