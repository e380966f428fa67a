//! SurrealDB implementation of [`AuthRepository`].
//!
//! Writes made through a [`SurrealTx`] are buffered and sent as one
//! `BEGIN TRANSACTION; ... COMMIT TRANSACTION;` query on commit, so
//! uniqueness violations for transactional writes are reported by
//! [`AuthRepository::commit`].

use chrono::{DateTime, Utc};
use gatehouse_core::error::StoreResult;
use gatehouse_core::models::{
    account::{AccountProvider, CreateAccount, CredentialAccount},
    session::{CreateSession, Session},
    tenant::{CreateTenant, Tenant},
    user::{CreateUser, User},
};
use gatehouse_core::repository::AuthRepository;
use serde::Deserialize;
use serde_json::{Map, Value};
use surrealdb::{Connection, Surreal};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, classify};
use crate::schema::{ACCOUNT_TABLE, SESSION_TABLE, TENANT_TABLE, USER_TABLE};

#[derive(Debug, Deserialize)]
struct TenantRow {
    record_id: String,
    name: String,
    slug: String,
}

#[derive(Debug, Deserialize)]
struct UserRow {
    record_id: String,
    name: String,
    email: String,
    tenant_id: String,
    active: bool,
    email_verified: bool,
}

#[derive(Debug, Deserialize)]
struct AccountRow {
    record_id: String,
    user_id: String,
    provider: String,
    #[serde(default)]
    password_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionRow {
    record_id: String,
    user_id: String,
    token: String,
    expires_at: i64,
    platform: String,
}

#[derive(Debug, Deserialize)]
struct DeletedRow {
    #[allow(dead_code)]
    token: String,
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| DbError::Decode(format!("expiry out of range: {ms}")))
}

impl TenantRow {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        Ok(Tenant {
            id: parse_uuid("tenant", &self.record_id)?,
            name: self.name,
            slug: self.slug,
        })
    }
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid("user", &self.record_id)?,
            name: self.name,
            email: self.email,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            active: self.active,
            email_verified: self.email_verified,
        })
    }
}

impl AccountRow {
    fn try_into_account(self) -> Result<CredentialAccount, DbError> {
        Ok(CredentialAccount {
            id: parse_uuid("account", &self.record_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            provider: self.provider.parse().map_err(DbError::Decode)?,
            password_hash: self.password_hash,
        })
    }
}

impl SessionRow {
    fn try_into_session(self) -> Result<Session, DbError> {
        Ok(Session {
            id: parse_uuid("session", &self.record_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            token: self.token,
            expires_at: millis_to_datetime(self.expires_at)?,
            platform: self.platform.parse().map_err(DbError::Decode)?,
        })
    }
}

/// Buffered transaction for [`SurrealAuthRepository`].
#[derive(Debug, Default)]
pub struct SurrealTx {
    statements: Vec<String>,
    bindings: Map<String, Value>,
}

impl SurrealTx {
    /// Queue a statement. `$name` placeholders are rewritten to names
    /// unique within this transaction so statements cannot collide.
    fn push(&mut self, template: &str, mut params: Vec<(&str, Value)>) {
        // Longest first, so `$email` never rewrites part of `$email_verified`.
        params.sort_by_key(|(name, _)| std::cmp::Reverse(name.len()));
        let prefix = format!("s{}_", self.statements.len());
        let mut statement = template.to_string();
        for (name, value) in params {
            let scoped = format!("{prefix}{name}");
            statement = statement.replace(&format!("${name}"), &format!("${scoped}"));
            self.bindings.insert(scoped, value);
        }
        self.statements.push(statement);
    }

    fn into_query(self) -> (String, Map<String, Value>) {
        let mut sql = String::from("BEGIN TRANSACTION;\n");
        for statement in &self.statements {
            sql.push_str(statement);
            sql.push_str(";\n");
        }
        sql.push_str("COMMIT TRANSACTION;");
        (sql, self.bindings)
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// SurrealDB implementation of the identity and session repository.
#[derive(Clone)]
pub struct SurrealAuthRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuthRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Queue a statement on the caller's transaction, or run it in a
    /// transaction of its own.
    async fn write(
        &self,
        tx: Option<&mut SurrealTx>,
        template: &str,
        params: Vec<(&str, Value)>,
    ) -> StoreResult<()> {
        match tx {
            Some(tx) => {
                tx.push(template, params);
                Ok(())
            }
            None => {
                let mut own = SurrealTx::default();
                own.push(template, params);
                self.commit(own).await
            }
        }
    }

    async fn select<T>(&self, sql: &str, params: Vec<(&'static str, String)>) -> StoreResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut query = self.db.query(sql.to_string());
        for param in params {
            query = query.bind(param);
        }
        let mut response = query.await.map_err(DbError::from)?;
        let rows: Vec<T> = response.take(0).map_err(DbError::from)?;
        Ok(rows)
    }
}

impl<C: Connection> AuthRepository for SurrealAuthRepository<C> {
    type Tx = SurrealTx;

    async fn begin(&self) -> StoreResult<SurrealTx> {
        Ok(SurrealTx::default())
    }

    async fn commit(&self, tx: SurrealTx) -> StoreResult<()> {
        if tx.is_empty() {
            return Ok(());
        }

        let statements = tx.statements.len();
        let (sql, bindings) = tx.into_query();
        let mut response = self
            .db
            .query(sql)
            .bind(bindings)
            .await
            .map_err(DbError::from)?;

        let errors = response.take_errors();
        if errors.is_empty() {
            debug!(statements, "Transaction committed");
            return Ok(());
        }

        let mut errors: Vec<(usize, surrealdb::Error)> = errors.into_iter().collect();
        errors.sort_by_key(|(index, _)| *index);
        Err(classify(errors.into_iter().map(|(_, e)| e.to_string())))
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let rows: Vec<UserRow> = self
            .select(
                "SELECT meta::id(id) AS record_id, name, email, tenant_id, active, \
                 email_verified FROM app_user WHERE email = $email LIMIT 1",
                vec![("email", email.to_string())],
            )
            .await?;
        rows.into_iter()
            .next()
            .map(UserRow::try_into_user)
            .transpose()
            .map_err(Into::into)
    }

    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let rows: Vec<UserRow> = self
            .select(
                "SELECT meta::id(id) AS record_id, name, email, tenant_id, active, \
                 email_verified FROM type::thing('app_user', $id)",
                vec![("id", id.to_string())],
            )
            .await?;
        rows.into_iter()
            .next()
            .map(UserRow::try_into_user)
            .transpose()
            .map_err(Into::into)
    }

    async fn get_account(
        &self,
        user_id: Uuid,
        provider: AccountProvider,
    ) -> StoreResult<Option<CredentialAccount>> {
        let rows: Vec<AccountRow> = self
            .select(
                "SELECT meta::id(id) AS record_id, user_id, provider, password_hash \
                 FROM credential_account \
                 WHERE user_id = $user_id AND provider = $provider LIMIT 1",
                vec![
                    ("user_id", user_id.to_string()),
                    ("provider", provider.as_str().to_string()),
                ],
            )
            .await?;
        rows.into_iter()
            .next()
            .map(AccountRow::try_into_account)
            .transpose()
            .map_err(Into::into)
    }

    async fn get_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        let rows: Vec<TenantRow> = self
            .select(
                "SELECT meta::id(id) AS record_id, name, slug \
                 FROM type::thing('tenant', $id)",
                vec![("id", id.to_string())],
            )
            .await?;
        rows.into_iter()
            .next()
            .map(TenantRow::try_into_tenant)
            .transpose()
            .map_err(Into::into)
    }

    async fn create_tenant(
        &self,
        input: CreateTenant,
        tx: Option<&mut SurrealTx>,
    ) -> StoreResult<Tenant> {
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: input.name,
            slug: input.slug,
        };
        self.write(
            tx,
            &format!(
                "CREATE type::thing('{TENANT_TABLE}', $id) SET name = $name, slug = $slug \
                 RETURN NONE"
            ),
            vec![
                ("id", Value::String(tenant.id.to_string())),
                ("name", Value::String(tenant.name.clone())),
                ("slug", Value::String(tenant.slug.clone())),
            ],
        )
        .await?;
        Ok(tenant)
    }

    async fn create_user(&self, input: CreateUser, tx: Option<&mut SurrealTx>) -> StoreResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            tenant_id: input.tenant_id,
            active: input.active,
            email_verified: input.email_verified,
        };
        self.write(
            tx,
            &format!(
                "CREATE type::thing('{USER_TABLE}', $id) SET name = $name, email = $email, \
                 tenant_id = $tenant_id, active = $active, \
                 email_verified = $email_verified RETURN NONE"
            ),
            vec![
                ("id", Value::String(user.id.to_string())),
                ("name", Value::String(user.name.clone())),
                ("email", Value::String(user.email.clone())),
                ("tenant_id", Value::String(user.tenant_id.to_string())),
                ("active", Value::Bool(user.active)),
                ("email_verified", Value::Bool(user.email_verified)),
            ],
        )
        .await?;
        Ok(user)
    }

    async fn create_account(
        &self,
        input: CreateAccount,
        tx: Option<&mut SurrealTx>,
    ) -> StoreResult<CredentialAccount> {
        let account = CredentialAccount {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            provider: input.provider,
            password_hash: input.password_hash,
        };

        let mut params = vec![
            ("id", Value::String(account.id.to_string())),
            ("user_id", Value::String(account.user_id.to_string())),
            ("provider", Value::String(account.provider.as_str().to_string())),
        ];
        // option<string> fields accept NONE but not NULL, so leave it unset.
        let template = match &account.password_hash {
            Some(hash) => {
                params.push(("password_hash", Value::String(hash.clone())));
                format!(
                    "CREATE type::thing('{ACCOUNT_TABLE}', $id) SET user_id = $user_id, \
                     provider = $provider, password_hash = $password_hash RETURN NONE"
                )
            }
            None => format!(
                "CREATE type::thing('{ACCOUNT_TABLE}', $id) SET user_id = $user_id, \
                 provider = $provider RETURN NONE"
            ),
        };

        self.write(tx, &template, params).await?;
        Ok(account)
    }

    async fn get_session(&self, token: &str) -> StoreResult<Option<Session>> {
        let rows: Vec<SessionRow> = self
            .select(
                "SELECT meta::id(id) AS record_id, user_id, token, expires_at, platform \
                 FROM user_session WHERE token = $token LIMIT 1",
                vec![("token", token.to_string())],
            )
            .await?;
        rows.into_iter()
            .next()
            .map(SessionRow::try_into_session)
            .transpose()
            .map_err(Into::into)
    }

    async fn create_session(&self, input: CreateSession) -> StoreResult<Session> {
        let session = Session {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            token: input.token,
            expires_at: input.expires_at,
            platform: input.platform,
        };
        self.write(
            None,
            &format!(
                "CREATE type::thing('{SESSION_TABLE}', $id) SET user_id = $user_id, \
                 token = $token, expires_at = $expires_at, platform = $platform \
                 RETURN NONE"
            ),
            vec![
                ("id", Value::String(session.id.to_string())),
                ("user_id", Value::String(session.user_id.to_string())),
                ("token", Value::String(session.token.clone())),
                ("expires_at", Value::from(session.expires_at.timestamp_millis())),
                ("platform", Value::String(session.platform.as_str().to_string())),
            ],
        )
        .await?;
        Ok(session)
    }

    async fn extend_session(&self, id: Uuid, expires_at: DateTime<Utc>) -> StoreResult<()> {
        let response = self
            .db
            .query(
                "UPDATE user_session SET expires_at = $expires_at \
                 WHERE id = type::thing('user_session', $id) RETURN NONE",
            )
            .bind(("id", id.to_string()))
            .bind(("expires_at", expires_at.timestamp_millis()))
            .await
            .map_err(DbError::from)?;
        response.check().map_err(DbError::from)?;
        Ok(())
    }

    async fn delete_session(&self, token: &str) -> StoreResult<bool> {
        let mut response = self
            .db
            .query("DELETE user_session WHERE token = $token RETURN BEFORE")
            .bind(("token", token.to_string()))
            .await
            .map_err(DbError::from)?;
        let deleted: Vec<DeletedRow> = response.take(0).map_err(DbError::from)?;
        Ok(!deleted.is_empty())
    }
}
