//! Shared fixtures for the auth integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use gatehouse_auth::{AuthConfig, AuthService, ManualClock, RegisterTenant};
use gatehouse_core::error::{StoreError, StoreResult};
use gatehouse_core::models::{
    account::{AccountProvider, CreateAccount, CredentialAccount},
    session::{CreateSession, Session},
    tenant::{CreateTenant, Tenant},
    user::{CreateUser, User},
};
use gatehouse_core::repository::AuthRepository;
use gatehouse_db::{MemoryAuthRepository, MemoryTx};
use uuid::Uuid;

pub const PASSWORD: &str = "correct horse battery staple";

/// Argon2 cost low enough for debug-build tests.
pub fn test_config() -> AuthConfig {
    AuthConfig {
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        secure_cookies: false,
        ..AuthConfig::default()
    }
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
}

pub fn acme(email: &str) -> RegisterTenant {
    RegisterTenant {
        organization_name: "Acme Inc".into(),
        name: "Ada Admin".into(),
        email: email.into(),
        password: PASSWORD.into(),
    }
}

pub fn service(
    repo: MemoryAuthRepository,
) -> (AuthService<MemoryAuthRepository, ManualClock>, ManualClock) {
    let clock = ManualClock::new(start());
    let svc = AuthService::with_clock(repo, clock.clone(), test_config()).unwrap();
    (svc, clock)
}

/// Memory repository with switchable failures.
#[derive(Clone, Default)]
pub struct FaultyRepository {
    pub inner: MemoryAuthRepository,
    pub fail_accounts: Arc<AtomicBool>,
    pub fail_sessions: Arc<AtomicBool>,
    pub fail_extend: Arc<AtomicBool>,
}

impl FaultyRepository {
    fn check(flag: &AtomicBool, what: &str) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("injected {what} failure")));
        }
        Ok(())
    }
}

impl AuthRepository for FaultyRepository {
    type Tx = MemoryTx;

    async fn begin(&self) -> StoreResult<MemoryTx> {
        self.inner.begin().await
    }

    async fn commit(&self, tx: MemoryTx) -> StoreResult<()> {
        self.inner.commit(tx).await
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.inner.get_user_by_email(email).await
    }

    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.inner.get_user_by_id(id).await
    }

    async fn get_account(
        &self,
        user_id: Uuid,
        provider: AccountProvider,
    ) -> StoreResult<Option<CredentialAccount>> {
        self.inner.get_account(user_id, provider).await
    }

    async fn get_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        self.inner.get_tenant(id).await
    }

    async fn create_tenant(
        &self,
        input: CreateTenant,
        tx: Option<&mut MemoryTx>,
    ) -> StoreResult<Tenant> {
        self.inner.create_tenant(input, tx).await
    }

    async fn create_user(&self, input: CreateUser, tx: Option<&mut MemoryTx>) -> StoreResult<User> {
        self.inner.create_user(input, tx).await
    }

    async fn create_account(
        &self,
        input: CreateAccount,
        tx: Option<&mut MemoryTx>,
    ) -> StoreResult<CredentialAccount> {
        Self::check(&self.fail_accounts, "account")?;
        self.inner.create_account(input, tx).await
    }

    async fn get_session(&self, token: &str) -> StoreResult<Option<Session>> {
        self.inner.get_session(token).await
    }

    async fn create_session(&self, input: CreateSession) -> StoreResult<Session> {
        Self::check(&self.fail_sessions, "session")?;
        self.inner.create_session(input).await
    }

    async fn extend_session(&self, id: Uuid, expires_at: DateTime<Utc>) -> StoreResult<()> {
        Self::check(&self.fail_extend, "extend")?;
        self.inner.extend_session(id, expires_at).await
    }

    async fn delete_session(&self, token: &str) -> StoreResult<bool> {
        self.inner.delete_session(token).await
    }
}

pub fn faulty_service(
    repo: FaultyRepository,
) -> (AuthService<FaultyRepository, ManualClock>, ManualClock) {
    let clock = ManualClock::new(start());
    let svc = AuthService::with_clock(repo, clock.clone(), test_config()).unwrap();
    (svc, clock)
}
