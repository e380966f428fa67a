//! Tenant domain model.
//!
//! A tenant is the organization-level namespace that owns users.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// Organization name as entered at registration.
    pub name: String,
    /// URL-safe identifier derived from `name`, unique across tenants.
    pub slug: String,
}

/// Fields required to create a new tenant. The id is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    pub slug: String,
}
