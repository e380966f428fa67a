//! Authentication error types.
//!
//! [`AuthError`] keeps the internal detail for logs. Only its
//! [`ErrorCode`] is allowed to leave the process.

use gatehouse_core::error::{ErrorCode, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email is already registered")]
    EmailAlreadyExists,

    #[error("organization name is already registered")]
    OrganizationNameExists,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("credential account not found")]
    AccountNotFound,

    #[error("credential account has no password hash")]
    PasswordHashNull,

    #[error("session could not be created: {0}")]
    SessionCreation(String),

    #[error("session cookie could not be set: {0}")]
    CookieSet(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// The wire code for this failure. Anything unexpected collapses to
    /// [`ErrorCode::UnknownError`].
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::EmailAlreadyExists => ErrorCode::EmailAlreadyExists,
            AuthError::OrganizationNameExists => ErrorCode::OrganizationNameExists,
            AuthError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AuthError::UserNotFound => ErrorCode::UserNotFound,
            AuthError::AccountNotFound => ErrorCode::AccountNotFound,
            AuthError::PasswordHashNull => ErrorCode::PasswordHashNull,
            AuthError::SessionCreation(_) => ErrorCode::SessionCreationFailed,
            AuthError::CookieSet(_) => ErrorCode::CookieSetFailed,
            AuthError::InvalidInput(_) | AuthError::Crypto(_) | AuthError::Store(_) => {
                ErrorCode::UnknownError
            }
        }
    }
}

impl From<AuthError> for ErrorCode {
    fn from(err: AuthError) -> Self {
        err.code()
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use gatehouse_core::error::UniqueField;

    use super::*;

    #[test]
    fn internal_failures_hide_behind_unknown_error() {
        let store = AuthError::Store(StoreError::Backend("connection refused".into()));
        assert_eq!(store.code(), ErrorCode::UnknownError);

        // A uniqueness violation that no orchestrator translated is still
        // an unexpected failure.
        let unmapped = AuthError::Store(StoreError::UniqueViolation {
            field: UniqueField::SessionToken,
        });
        assert_eq!(unmapped.code(), ErrorCode::UnknownError);

        assert_eq!(
            AuthError::Crypto("bad params".into()).code(),
            ErrorCode::UnknownError
        );
    }

    #[test]
    fn session_and_cookie_failures_keep_their_own_codes() {
        assert_eq!(
            ErrorCode::from(AuthError::SessionCreation("disk full".into())),
            ErrorCode::SessionCreationFailed
        );
        assert_eq!(
            ErrorCode::from(AuthError::CookieSet("headers sent".into())),
            ErrorCode::CookieSetFailed
        );
    }
}
