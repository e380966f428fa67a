//! User domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Unique across the whole system, not only within the tenant.
    pub email: String,
    pub tenant_id: Uuid,
    pub active: bool,
    pub email_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub tenant_id: Uuid,
    pub active: bool,
    pub email_verified: bool,
}
