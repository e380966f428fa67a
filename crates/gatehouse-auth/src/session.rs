//! Session lifecycle: issuance, sliding-expiration verification and
//! invalidation.
//!
//! A session is either active or gone. Expiry is never stored as a state;
//! it is decided at verification time by comparing `expires_at` with the
//! clock. A session verified within the renewal window before its expiry
//! is pushed out to a full lifetime from now, so active users stay signed
//! in while idle sessions still lapse on schedule.

use chrono::{DateTime, Duration, Utc};
use gatehouse_core::models::{
    session::{CreateSession, Session, SessionPlatform},
    tenant::Tenant,
    user::User,
};
use gatehouse_core::repository::AuthRepository;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::token;

/// A session together with the identity it authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    pub session: Session,
    pub user: User,
    pub tenant: Tenant,
    /// `true` when this verification extended the session's expiry.
    pub renewed: bool,
}

pub struct SessionManager<R, C> {
    repo: R,
    clock: C,
    duration: Duration,
    renewal_window: Duration,
}

impl<R: AuthRepository, C: Clock> SessionManager<R, C> {
    pub fn new(repo: R, clock: C, config: &AuthConfig) -> Self {
        Self {
            repo,
            clock,
            duration: config.session_duration(),
            renewal_window: config.renewal_window(),
        }
    }

    /// Issue a session with the configured lifetime.
    pub async fn create(&self, user_id: Uuid, platform: SessionPlatform) -> AuthResult<Session> {
        self.create_with_duration(user_id, platform, self.duration)
            .await
    }

    /// Issue a session lasting `duration`. The user must exist.
    pub async fn create_with_duration(
        &self,
        user_id: Uuid,
        platform: SessionPlatform,
        duration: Duration,
    ) -> AuthResult<Session> {
        if duration <= Duration::zero() {
            return Err(AuthError::SessionCreation(format!(
                "non-positive session lifetime: {duration}"
            )));
        }

        let user = self.repo.get_user_by_id(user_id).await.map_err(|e| {
            error!(user_id = %user_id, error = %e, "Failed to look up session owner");
            AuthError::SessionCreation(e.to_string())
        })?;
        if user.is_none() {
            warn!(user_id = %user_id, "Refusing session for unknown user");
            return Err(AuthError::SessionCreation(format!(
                "user {user_id} does not exist"
            )));
        }

        let expires_at = self.clock.now() + duration;
        let session = self
            .repo
            .create_session(CreateSession {
                user_id,
                token: token::generate_session_token(),
                expires_at,
                platform,
            })
            .await
            .map_err(|e| {
                error!(user_id = %user_id, error = %e, "Failed to persist session");
                AuthError::SessionCreation(e.to_string())
            })?;

        info!(
            session_id = %session.id,
            user_id = %user_id,
            platform = %platform,
            expires_at = %session.expires_at,
            "Session created"
        );
        Ok(session)
    }

    /// Whether a session expiring at `expires_at` is due for renewal at `now`.
    ///
    /// The window is closed at both ends: exactly `expires_at - window`
    /// and exactly `expires_at` both renew.
    pub fn in_renewal_window(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now >= expires_at - self.renewal_window && now <= expires_at
    }

    /// Resolve a token to its session, user and tenant.
    ///
    /// Unknown, expired and orphaned sessions all yield `Ok(None)`; being
    /// unauthenticated is not an error. A failed renewal is logged and the
    /// session is still returned with its old expiry.
    pub async fn verify(&self, token: &str) -> AuthResult<Option<VerifiedSession>> {
        if token.is_empty() {
            return Ok(None);
        }

        let Some(mut session) = self.repo.get_session(token).await? else {
            return Ok(None);
        };

        let now = self.clock.now();
        if now > session.expires_at {
            debug!(session_id = %session.id, "Session expired");
            return Ok(None);
        }

        let mut renewed = false;
        if self.in_renewal_window(session.expires_at, now) {
            let expires_at = now + self.duration;
            match self.repo.extend_session(session.id, expires_at).await {
                Ok(()) => {
                    debug!(session_id = %session.id, expires_at = %expires_at, "Session renewed");
                    session.expires_at = expires_at;
                    renewed = true;
                }
                Err(e) => {
                    warn!(session_id = %session.id, error = %e, "Session renewal failed");
                }
            }
        }

        let Some(user) = self.repo.get_user_by_id(session.user_id).await? else {
            warn!(
                session_id = %session.id,
                user_id = %session.user_id,
                "Session references a missing user"
            );
            return Ok(None);
        };

        let Some(tenant) = self.repo.get_tenant(user.tenant_id).await? else {
            warn!(
                session_id = %session.id,
                tenant_id = %user.tenant_id,
                "Session user references a missing tenant"
            );
            return Ok(None);
        };

        Ok(Some(VerifiedSession {
            session,
            user,
            tenant,
            renewed,
        }))
    }

    /// Delete the session. Returns `false` if it was already gone.
    pub async fn invalidate(&self, token: &str) -> AuthResult<bool> {
        let removed = self.repo.delete_session(token).await?;
        debug!(removed, "Session invalidated");
        Ok(removed)
    }
}
