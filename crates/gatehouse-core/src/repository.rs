//! Repository trait for identity and session data access.
//!
//! Lookups return `Ok(None)` for absent rows; "not found" is an ordinary
//! outcome, not an error. Writes that must be atomic with each other take a
//! caller-managed transaction handle obtained from
//! [`AuthRepository::begin`]. Passing `None` runs the write on its own.
//!
//! Uniqueness is enforced by the store, never pre-checked by callers.
//! Violations surface as [`StoreError::UniqueViolation`] naming the field,
//! either from the create call itself or from [`AuthRepository::commit`]
//! for backends that defer writes until commit.
//!
//! [`StoreError::UniqueViolation`]: crate::error::StoreError::UniqueViolation

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{
    account::{AccountProvider, CreateAccount, CredentialAccount},
    session::{CreateSession, Session},
    tenant::{CreateTenant, Tenant},
    user::{CreateUser, User},
};

pub trait AuthRepository: Send + Sync {
    /// Transaction handle. Dropping it without [`AuthRepository::commit`]
    /// discards every write made through it.
    type Tx: Send;

    fn begin(&self) -> impl Future<Output = StoreResult<Self::Tx>> + Send;
    fn commit(&self, tx: Self::Tx) -> impl Future<Output = StoreResult<()>> + Send;

    // -----------------------------------------------------------------------
    // Tenants, users and accounts
    // -----------------------------------------------------------------------

    fn get_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;
    fn get_user_by_id(&self, id: Uuid) -> impl Future<Output = StoreResult<Option<User>>> + Send;
    fn get_account(
        &self,
        user_id: Uuid,
        provider: AccountProvider,
    ) -> impl Future<Output = StoreResult<Option<CredentialAccount>>> + Send;
    fn get_tenant(&self, id: Uuid) -> impl Future<Output = StoreResult<Option<Tenant>>> + Send;

    /// Fails with a `TenantSlug` violation if the slug is taken.
    fn create_tenant(
        &self,
        input: CreateTenant,
        tx: Option<&mut Self::Tx>,
    ) -> impl Future<Output = StoreResult<Tenant>> + Send;
    /// Fails with a `UserEmail` violation if the email is taken.
    fn create_user(
        &self,
        input: CreateUser,
        tx: Option<&mut Self::Tx>,
    ) -> impl Future<Output = StoreResult<User>> + Send;
    fn create_account(
        &self,
        input: CreateAccount,
        tx: Option<&mut Self::Tx>,
    ) -> impl Future<Output = StoreResult<CredentialAccount>> + Send;

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    fn get_session(&self, token: &str) -> impl Future<Output = StoreResult<Option<Session>>> + Send;
    fn create_session(&self, input: CreateSession)
    -> impl Future<Output = StoreResult<Session>> + Send;
    /// Move a session's expiry to `expires_at`. Idempotent; a missing
    /// session is not an error.
    fn extend_session(
        &self,
        id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<()>> + Send;
    /// Returns `true` iff a session with this token existed and was removed.
    fn delete_session(&self, token: &str) -> impl Future<Output = StoreResult<bool>> + Send;
}
