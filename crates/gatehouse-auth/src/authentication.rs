//! Email and password authentication.

use gatehouse_core::models::{account::AccountProvider, user::User};
use gatehouse_core::repository::AuthRepository;
use tracing::warn;

use crate::clock::Clock;
use crate::error::{AuthError, AuthResult};
use crate::normalize::normalize_email;
use crate::service::AuthService;

impl<R: AuthRepository, C: Clock> AuthService<R, C> {
    /// Check an email and password and return the matching user.
    ///
    /// Failures are reported in a fixed order: unknown email, missing
    /// credential account, account without a hash, then a password that
    /// does not match. A stored hash that cannot be parsed counts as a
    /// mismatch.
    pub async fn authorize(&self, email: &str, password: &str) -> AuthResult<User> {
        let email = normalize_email(email);

        let user = self
            .repo
            .get_user_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let account = self
            .repo
            .get_account(user.id, AccountProvider::Credential)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let hash = account.password_hash.ok_or(AuthError::PasswordHashNull)?;

        match self.verifier.compare(password, &hash).await {
            Ok(true) => Ok(user),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Stored password hash could not be checked");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
