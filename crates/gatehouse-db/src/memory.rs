//! In-process implementation of [`AuthRepository`].
//!
//! Tables live behind a `tokio::sync::RwLock`. A [`MemoryTx`] stages rows
//! and checks uniqueness against committed and staged rows on every
//! create; commit re-checks under the write lock before publishing, so
//! two transactions racing for the same slug or email cannot both win.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use gatehouse_core::error::{StoreError, StoreResult, UniqueField};
use gatehouse_core::models::{
    account::{AccountProvider, CreateAccount, CredentialAccount},
    session::{CreateSession, Session},
    tenant::{CreateTenant, Tenant},
    user::{CreateUser, User},
};
use gatehouse_core::repository::AuthRepository;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    tenants: HashMap<Uuid, Tenant>,
    users: HashMap<Uuid, User>,
    accounts: HashMap<Uuid, CredentialAccount>,
    sessions: HashMap<Uuid, Session>,
}

impl Tables {
    fn slug_taken(&self, slug: &str) -> bool {
        self.tenants.values().any(|t| t.slug == slug)
    }

    fn email_taken(&self, email: &str) -> bool {
        self.users.values().any(|u| u.email == email)
    }

    fn account_taken(&self, user_id: Uuid, provider: AccountProvider) -> bool {
        self.accounts
            .values()
            .any(|a| a.user_id == user_id && a.provider == provider)
    }

    /// Check every staged row against committed rows.
    fn check(&self, tx: &MemoryTx) -> StoreResult<()> {
        if tx.tenants.iter().any(|t| self.slug_taken(&t.slug)) {
            return Err(violation(UniqueField::TenantSlug));
        }
        if tx.users.iter().any(|u| self.email_taken(&u.email)) {
            return Err(violation(UniqueField::UserEmail));
        }
        if tx
            .accounts
            .iter()
            .any(|a| self.account_taken(a.user_id, a.provider))
        {
            return Err(violation(UniqueField::AccountProvider));
        }
        Ok(())
    }
}

fn violation(field: UniqueField) -> StoreError {
    StoreError::UniqueViolation { field }
}

/// Rows staged by an uncommitted transaction.
#[derive(Debug, Default)]
pub struct MemoryTx {
    tenants: Vec<Tenant>,
    users: Vec<User>,
    accounts: Vec<CredentialAccount>,
}

/// In-memory identity and session repository. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuthRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn tenant_count(&self) -> usize {
        self.tables.read().await.tenants.len()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn account_count(&self) -> usize {
        self.tables.read().await.accounts.len()
    }

    pub async fn get_tenant_by_slug(&self, slug: &str) -> Option<Tenant> {
        self.tables
            .read()
            .await
            .tenants
            .values()
            .find(|t| t.slug == slug)
            .cloned()
    }

    /// Remove a user without touching its sessions or accounts. Used by
    /// operators repairing data, and to simulate orphaned sessions.
    pub async fn remove_user(&self, id: Uuid) -> bool {
        self.tables.write().await.users.remove(&id).is_some()
    }

    pub async fn remove_tenant(&self, id: Uuid) -> bool {
        self.tables.write().await.tenants.remove(&id).is_some()
    }

    /// Stage on the caller's transaction, or commit a single-row one.
    async fn stage<F>(&self, tx: Option<&mut MemoryTx>, stage_fn: F) -> StoreResult<()>
    where
        F: FnOnce(&mut MemoryTx) + Send,
    {
        match tx {
            Some(tx) => {
                stage_fn(tx);
                Ok(())
            }
            None => {
                let mut own = MemoryTx::default();
                stage_fn(&mut own);
                self.commit(own).await
            }
        }
    }
}

impl AuthRepository for MemoryAuthRepository {
    type Tx = MemoryTx;

    async fn begin(&self) -> StoreResult<MemoryTx> {
        Ok(MemoryTx::default())
    }

    async fn commit(&self, tx: MemoryTx) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check(&tx)?;

        let (tenants, users, accounts) = (tx.tenants.len(), tx.users.len(), tx.accounts.len());
        for tenant in tx.tenants {
            tables.tenants.insert(tenant.id, tenant);
        }
        for user in tx.users {
            tables.users.insert(user.id, user);
        }
        for account in tx.accounts {
            tables.accounts.insert(account.id, account);
        }
        debug!(tenants, users, accounts, "Transaction committed");
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_account(
        &self,
        user_id: Uuid,
        provider: AccountProvider,
    ) -> StoreResult<Option<CredentialAccount>> {
        Ok(self
            .tables
            .read()
            .await
            .accounts
            .values()
            .find(|a| a.user_id == user_id && a.provider == provider)
            .cloned())
    }

    async fn get_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        Ok(self.tables.read().await.tenants.get(&id).cloned())
    }

    async fn create_tenant(
        &self,
        input: CreateTenant,
        tx: Option<&mut MemoryTx>,
    ) -> StoreResult<Tenant> {
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: input.name,
            slug: input.slug,
        };
        let staged_clash = tx
            .as_deref()
            .is_some_and(|tx| tx.tenants.iter().any(|t| t.slug == tenant.slug));
        if staged_clash || self.tables.read().await.slug_taken(&tenant.slug) {
            return Err(violation(UniqueField::TenantSlug));
        }

        let row = tenant.clone();
        self.stage(tx, move |tx| tx.tenants.push(row)).await?;
        Ok(tenant)
    }

    async fn create_user(&self, input: CreateUser, tx: Option<&mut MemoryTx>) -> StoreResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            tenant_id: input.tenant_id,
            active: input.active,
            email_verified: input.email_verified,
        };
        let staged_clash = tx
            .as_deref()
            .is_some_and(|tx| tx.users.iter().any(|u| u.email == user.email));
        if staged_clash || self.tables.read().await.email_taken(&user.email) {
            return Err(violation(UniqueField::UserEmail));
        }

        let row = user.clone();
        self.stage(tx, move |tx| tx.users.push(row)).await?;
        Ok(user)
    }

    async fn create_account(
        &self,
        input: CreateAccount,
        tx: Option<&mut MemoryTx>,
    ) -> StoreResult<CredentialAccount> {
        let account = CredentialAccount {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            provider: input.provider,
            password_hash: input.password_hash,
        };
        let staged_clash = tx.as_deref().is_some_and(|tx| {
            tx.accounts
                .iter()
                .any(|a| a.user_id == account.user_id && a.provider == account.provider)
        });
        if staged_clash
            || self
                .tables
                .read()
                .await
                .account_taken(account.user_id, account.provider)
        {
            return Err(violation(UniqueField::AccountProvider));
        }

        let row = account.clone();
        self.stage(tx, move |tx| tx.accounts.push(row)).await?;
        Ok(account)
    }

    async fn get_session(&self, token: &str) -> StoreResult<Option<Session>> {
        Ok(self
            .tables
            .read()
            .await
            .sessions
            .values()
            .find(|s| s.token == token)
            .cloned())
    }

    async fn create_session(&self, input: CreateSession) -> StoreResult<Session> {
        let mut tables = self.tables.write().await;
        if tables.sessions.values().any(|s| s.token == input.token) {
            return Err(violation(UniqueField::SessionToken));
        }

        let session = Session {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            token: input.token,
            expires_at: input.expires_at,
            platform: input.platform,
        };
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn extend_session(&self, id: Uuid, expires_at: DateTime<Utc>) -> StoreResult<()> {
        if let Some(session) = self.tables.write().await.sessions.get_mut(&id) {
            session.expires_at = expires_at;
        }
        Ok(())
    }

    async fn delete_session(&self, token: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.token != token);
        Ok(tables.sessions.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_core::models::session::SessionPlatform;

    use super::*;

    fn tenant(slug: &str) -> CreateTenant {
        CreateTenant {
            name: slug.to_uppercase(),
            slug: slug.into(),
        }
    }

    fn user(tenant_id: Uuid, email: &str) -> CreateUser {
        CreateUser {
            name: "Alice".into(),
            email: email.into(),
            tenant_id,
            active: true,
            email_verified: true,
        }
    }

    #[tokio::test]
    async fn uncommitted_transaction_is_invisible() {
        let repo = MemoryAuthRepository::new();
        let mut tx = repo.begin().await.unwrap();
        let t = repo.create_tenant(tenant("acme"), Some(&mut tx)).await.unwrap();

        assert!(repo.get_tenant(t.id).await.unwrap().is_none());
        drop(tx);
        assert_eq!(repo.tenant_count().await, 0);
    }

    #[tokio::test]
    async fn commit_publishes_all_rows() {
        let repo = MemoryAuthRepository::new();
        let mut tx = repo.begin().await.unwrap();
        let t = repo.create_tenant(tenant("acme"), Some(&mut tx)).await.unwrap();
        let u = repo
            .create_user(user(t.id, "a@acme.test"), Some(&mut tx))
            .await
            .unwrap();
        repo.commit(tx).await.unwrap();

        assert_eq!(repo.get_tenant(t.id).await.unwrap(), Some(t));
        assert_eq!(repo.get_user_by_email("a@acme.test").await.unwrap(), Some(u));
    }

    #[tokio::test]
    async fn duplicate_slug_is_reported_as_field_violation() {
        let repo = MemoryAuthRepository::new();
        repo.create_tenant(tenant("acme"), None).await.unwrap();

        let err = repo.create_tenant(tenant("acme"), None).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation {
                field: UniqueField::TenantSlug
            }
        ));
    }

    #[tokio::test]
    async fn racing_transactions_resolve_at_commit() {
        let repo = MemoryAuthRepository::new();
        let mut first = repo.begin().await.unwrap();
        let mut second = repo.begin().await.unwrap();
        repo.create_tenant(tenant("acme"), Some(&mut first))
            .await
            .unwrap();
        repo.create_tenant(tenant("acme"), Some(&mut second))
            .await
            .unwrap();

        repo.commit(first).await.unwrap();
        let err = repo.commit(second).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
        assert_eq!(repo.tenant_count().await, 1);
    }

    #[tokio::test]
    async fn delete_session_reports_whether_a_row_existed() {
        let repo = MemoryAuthRepository::new();
        repo.create_session(CreateSession {
            user_id: Uuid::new_v4(),
            token: "tok".into(),
            expires_at: Utc::now(),
            platform: SessionPlatform::Web,
        })
        .await
        .unwrap();

        assert!(repo.delete_session("tok").await.unwrap());
        assert!(!repo.delete_session("tok").await.unwrap());
    }
}
