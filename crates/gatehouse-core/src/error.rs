//! Error types for the Gatehouse system.
//!
//! [`ErrorCode`] is the closed set of failure identifiers allowed to cross a
//! process boundary. [`StoreError`] is what repository implementations
//! return; orchestrators translate it into an [`ErrorCode`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, serializable failure identifiers.
///
/// The serialized form is the SCREAMING_SNAKE_CASE name, e.g.
/// `EMAIL_ALREADY_EXISTS`. Clients match on these strings, so variants
/// must never be renamed or reused for a different condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    EmailAlreadyExists,
    OrganizationNameExists,
    InvalidCredentials,
    UserNotFound,
    AccountNotFound,
    PasswordHashNull,
    SessionCreationFailed,
    CookieSetFailed,
    UnknownError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 9] = [
        ErrorCode::EmailAlreadyExists,
        ErrorCode::OrganizationNameExists,
        ErrorCode::InvalidCredentials,
        ErrorCode::UserNotFound,
        ErrorCode::AccountNotFound,
        ErrorCode::PasswordHashNull,
        ErrorCode::SessionCreationFailed,
        ErrorCode::CookieSetFailed,
        ErrorCode::UnknownError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            ErrorCode::OrganizationNameExists => "ORGANIZATION_NAME_EXISTS",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::AccountNotFound => "ACCOUNT_NOT_FOUND",
            ErrorCode::PasswordHashNull => "PASSWORD_HASH_NULL",
            ErrorCode::SessionCreationFailed => "SESSION_CREATION_FAILED",
            ErrorCode::CookieSetFailed => "COOKIE_SET_FAILED",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Default English message shown to end users.
    ///
    /// Localized hosts look up their own text keyed by [`ErrorCode::as_str`].
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorCode::EmailAlreadyExists => {
                "This email address is already registered. Please use a different email or try signing in."
            }
            ErrorCode::OrganizationNameExists => {
                "An organization with this name already exists. Please choose a different name."
            }
            ErrorCode::InvalidCredentials => {
                "Invalid email or password. Please check your credentials and try again."
            }
            ErrorCode::UserNotFound => {
                "Account not found. Please check your email or create a new account."
            }
            ErrorCode::AccountNotFound => "Account configuration error. Please contact support.",
            ErrorCode::PasswordHashNull => "Account security error. Please contact support.",
            ErrorCode::SessionCreationFailed => {
                "Unable to sign you in right now. Please try again."
            }
            ErrorCode::CookieSetFailed => "Session setup failed. Please try again.",
            ErrorCode::UnknownError => "Something went wrong. Please try again later.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the known [`ErrorCode`] names.
#[derive(Debug, Error)]
#[error("unrecognized error code: {0}")]
pub struct UnrecognizedCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnrecognizedCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnrecognizedCode(s.to_string()))
    }
}

/// The `{ "code": ... }` body that carries an [`ErrorCode`] over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
}

impl ErrorPayload {
    pub fn new(code: ErrorCode) -> Self {
        Self { code }
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({ "code": self.code.as_str() }).to_string()
    }

    /// Decode a server error on the client side.
    ///
    /// Accepts the JSON payload or a bare code string. Anything else,
    /// including a well-formed payload with an unknown code, yields
    /// [`ErrorCode::UnknownError`].
    pub fn parse(raw: &str) -> ErrorCode {
        let raw = raw.trim();

        if let Ok(payload) = serde_json::from_str::<ErrorPayload>(raw) {
            return payload.code;
        }

        let looks_like_code =
            !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_uppercase() || b == b'_');
        if looks_like_code {
            if let Ok(code) = raw.parse() {
                return code;
            }
        }

        ErrorCode::UnknownError
    }
}

impl From<ErrorCode> for ErrorPayload {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

/// Fields protected by a store-level uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    TenantSlug,
    UserEmail,
    /// The `(user_id, provider)` pair of a credential account.
    AccountProvider,
    SessionToken,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UniqueField::TenantSlug => "tenant.slug",
            UniqueField::UserEmail => "user.email",
            UniqueField::AccountProvider => "account.user_id+provider",
            UniqueField::SessionToken => "session.token",
        })
    }
}

/// Repository-layer error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("uniqueness violation on {field}")]
    UniqueViolation { field: UniqueField },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("stored record could not be decoded: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
