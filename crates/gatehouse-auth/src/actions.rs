//! Cookie-level sign-up, sign-in and sign-out.
//!
//! These are the only entry points whose failures leave the process, and
//! they leave it as an [`ErrorCode`] alone. The full [`AuthError`] is
//! logged here before it is reduced.

use gatehouse_core::error::ErrorCode;
use gatehouse_core::models::{session::SessionPlatform, user::User};
use gatehouse_core::repository::AuthRepository;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::cookie::{CookieJar, SESSION_COOKIE, SessionCookie};
use crate::error::{AuthError, AuthResult};
use crate::registration::RegisterTenant;
use crate::service::AuthService;
use crate::session::VerifiedSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutOutcome {
    Success,
    /// There was no live session to end.
    Unauthorized,
}

fn report(action: &'static str, err: AuthError) -> ErrorCode {
    let code = err.code();
    match code {
        ErrorCode::UnknownError
        | ErrorCode::SessionCreationFailed
        | ErrorCode::CookieSetFailed => {
            error!(action, code = %code, error = %err, "Action failed");
        }
        _ => {
            warn!(action, code = %code, error = %err, "Action rejected");
        }
    }
    code
}

impl<R: AuthRepository, C: Clock> AuthService<R, C> {
    /// Register a tenant and sign its first user in.
    ///
    /// A failure after the registration committed (session or cookie)
    /// is reported with its own code; the tenant stays registered.
    pub async fn sign_up(
        &self,
        jar: &mut dyn CookieJar,
        input: RegisterTenant,
    ) -> Result<(), ErrorCode> {
        let registered = self
            .register_tenant(input)
            .await
            .map_err(|e| report("sign_up", e))?;
        self.start_session(jar, &registered.user)
            .await
            .map_err(|e| report("sign_up", e))
    }

    pub async fn sign_in(
        &self,
        jar: &mut dyn CookieJar,
        email: &str,
        password: &str,
    ) -> Result<(), ErrorCode> {
        let user = self
            .authorize(email, password)
            .await
            .map_err(|e| report("sign_in", e))?;
        self.start_session(jar, &user)
            .await
            .map_err(|e| report("sign_in", e))
    }

    /// End the session named by the jar's cookie and clear the cookie.
    ///
    /// Once a live session has been found the outcome is `Success`; a
    /// failure to delete it or to clear the cookie is only logged.
    pub async fn sign_out(&self, jar: &mut dyn CookieJar) -> SignOutOutcome {
        let verified = match self.current_session(jar).await {
            Ok(Some(verified)) => verified,
            Ok(None) | Err(_) => return SignOutOutcome::Unauthorized,
        };

        if let Err(e) = jar.set(SessionCookie::cleared(self.config.secure_cookies)) {
            warn!(error = %e, "Failed to clear session cookie");
        }
        match self.sessions.invalidate(&verified.session.token).await {
            Ok(_) => info!(
                session_id = %verified.session.id,
                user_id = %verified.user.id,
                "Signed out"
            ),
            Err(e) => warn!(session_id = %verified.session.id, error = %e, "Failed to delete session"),
        }

        SignOutOutcome::Success
    }

    /// Resolve the jar's session cookie. A renewal re-issues the cookie
    /// with the new expiry.
    pub async fn current_session(
        &self,
        jar: &mut dyn CookieJar,
    ) -> Result<Option<VerifiedSession>, ErrorCode> {
        let Some(token) = jar.get(SESSION_COOKIE) else {
            return Ok(None);
        };

        let verified = self
            .sessions
            .verify(&token)
            .await
            .map_err(|e| report("current_session", e))?;

        if let Some(v) = verified.as_ref().filter(|v| v.renewed) {
            let cookie = SessionCookie::issue(
                &v.session.token,
                v.session.expires_at,
                self.config.secure_cookies,
            );
            if let Err(e) = jar.set(cookie) {
                warn!(session_id = %v.session.id, error = %e, "Failed to refresh session cookie");
            }
        }

        Ok(verified)
    }

    async fn start_session(&self, jar: &mut dyn CookieJar, user: &User) -> AuthResult<()> {
        let session = self.sessions.create(user.id, SessionPlatform::Web).await?;
        jar.set(SessionCookie::issue(
            &session.token,
            session.expires_at,
            self.config.secure_cookies,
        ))
        .map_err(|e| AuthError::CookieSet(e.to_string()))?;
        info!(user_id = %user.id, session_id = %session.id, "Signed in");
        Ok(())
    }
}
