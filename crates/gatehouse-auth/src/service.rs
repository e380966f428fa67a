//! Authentication service. Wires the credential verifier, session
//! manager and repository together.
//!
//! The operations live next to their concerns: registration in
//! [`crate::registration`], credential checks in
//! [`crate::authentication`], and the cookie-level sign-up/sign-in/
//! sign-out flows in [`crate::actions`].

use std::sync::Arc;

use gatehouse_core::repository::AuthRepository;

use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::error::AuthResult;
use crate::password::CredentialVerifier;
use crate::registration::{NoopHook, RegistrationHook};
use crate::session::SessionManager;

/// Authentication service.
///
/// Generic over the repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<R: AuthRepository, C: Clock = SystemClock> {
    pub(crate) repo: R,
    pub(crate) verifier: CredentialVerifier,
    pub(crate) sessions: SessionManager<R, C>,
    pub(crate) hook: Arc<dyn RegistrationHook>,
    pub(crate) config: AuthConfig,
}

impl<R: AuthRepository + Clone> AuthService<R, SystemClock> {
    pub fn new(repo: R, config: AuthConfig) -> AuthResult<Self> {
        Self::with_clock(repo, SystemClock, config)
    }
}

impl<R: AuthRepository + Clone, C: Clock> AuthService<R, C> {
    pub fn with_clock(repo: R, clock: C, config: AuthConfig) -> AuthResult<Self> {
        Ok(Self {
            verifier: CredentialVerifier::new(&config)?,
            sessions: SessionManager::new(repo.clone(), clock, &config),
            repo,
            hook: Arc::new(NoopHook),
            config,
        })
    }
}

impl<R: AuthRepository, C: Clock> AuthService<R, C> {
    /// Replace the post-registration hook.
    pub fn with_hook(mut self, hook: Arc<dyn RegistrationHook>) -> Self {
        self.hook = hook;
        self
    }

    pub fn sessions(&self) -> &SessionManager<R, C> {
        &self.sessions
    }
}
