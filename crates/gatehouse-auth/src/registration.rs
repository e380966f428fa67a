//! Tenant registration: a new organization, its first user and that
//! user's password account, created atomically.

use gatehouse_core::error::{StoreError, UniqueField};
use gatehouse_core::models::{
    account::{AccountProvider, CreateAccount},
    tenant::{CreateTenant, Tenant},
    user::{CreateUser, User},
};
use gatehouse_core::repository::AuthRepository;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{AuthError, AuthResult};
use crate::normalize::{normalize_email, slugify};
use crate::service::AuthService;

#[derive(Clone)]
pub struct RegisterTenant {
    pub organization_name: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterTenant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterTenant")
            .field("organization_name", &self.organization_name)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub tenant: Tenant,
    pub user: User,
}

/// Runs after a registration has been committed.
///
/// Never called for a registration that rolled back.
pub trait RegistrationHook: Send + Sync {
    fn on_registered(&self, registered: &Registered);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl RegistrationHook for NoopHook {
    fn on_registered(&self, _registered: &Registered) {}
}

/// Translate uniqueness violations on registration-owned fields.
fn registration_error(err: StoreError) -> AuthError {
    match err {
        StoreError::UniqueViolation {
            field: UniqueField::UserEmail,
        } => AuthError::EmailAlreadyExists,
        StoreError::UniqueViolation {
            field: UniqueField::TenantSlug,
        } => AuthError::OrganizationNameExists,
        other => AuthError::Store(other),
    }
}

impl<R: AuthRepository, C: Clock> AuthService<R, C> {
    /// Create a tenant, its first user and a credential account in one
    /// transaction.
    ///
    /// The organization name is unique by slug, so names differing only
    /// in case or punctuation collide. Nothing is left behind when any
    /// step fails.
    pub async fn register_tenant(&self, input: RegisterTenant) -> AuthResult<Registered> {
        let slug = slugify(&input.organization_name).ok_or_else(|| {
            AuthError::InvalidInput(format!(
                "organization name {:?} has no usable characters",
                input.organization_name
            ))
        })?;
        let email = normalize_email(&input.email);

        let mut tx = self.repo.begin().await?;

        let tenant = self
            .repo
            .create_tenant(
                CreateTenant {
                    name: input.organization_name.trim().to_string(),
                    slug,
                },
                Some(&mut tx),
            )
            .await
            .map_err(registration_error)?;

        let user = self
            .repo
            .create_user(
                CreateUser {
                    name: input.name.trim().to_string(),
                    email,
                    tenant_id: tenant.id,
                    active: true,
                    email_verified: true,
                },
                Some(&mut tx),
            )
            .await
            .map_err(registration_error)?;

        let password_hash = self.verifier.hash(&input.password).await?;
        self.repo
            .create_account(
                CreateAccount {
                    user_id: user.id,
                    provider: AccountProvider::Credential,
                    password_hash: Some(password_hash),
                },
                Some(&mut tx),
            )
            .await
            .map_err(registration_error)?;

        self.repo.commit(tx).await.map_err(registration_error)?;

        info!(
            tenant_id = %tenant.id,
            tenant_slug = %tenant.slug,
            user_id = %user.id,
            "Tenant registered"
        );

        let registered = Registered { tenant, user };
        self.hook.on_registered(&registered);
        debug!(tenant_id = %registered.tenant.id, "Registration hook finished");

        Ok(registered)
    }
}
