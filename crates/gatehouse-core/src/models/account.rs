//! Authentication-method records attached to a user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity provider behind an account. Only password credentials exist
/// today; federated providers would be added here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountProvider {
    Credential,
}

impl AccountProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountProvider::Credential => "Credential",
        }
    }
}

impl fmt::Display for AccountProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Credential" => Ok(AccountProvider::Credential),
            other => Err(format!("unknown account provider: {other}")),
        }
    }
}

/// One account per `(user_id, provider)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: AccountProvider,
    /// Argon2id PHC string. `None` is only valid for non-credential providers.
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    pub user_id: Uuid,
    pub provider: AccountProvider,
    pub password_hash: Option<String>,
}
