//! Session domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client platform a session was issued to. Recorded, not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPlatform {
    Web,
    Mobile,
}

impl SessionPlatform {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPlatform::Web => "Web",
            SessionPlatform::Mobile => "Mobile",
        }
    }
}

impl fmt::Display for SessionPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Web" => Ok(SessionPlatform::Web),
            "Mobile" => Ok(SessionPlatform::Mobile),
            other => Err(format!("unknown session platform: {other}")),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Opaque bearer secret held by the client. Never derived from `id`.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub platform: SessionPlatform,
}

// Keeps the bearer token out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("platform", &self.platform)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub platform: SessionPlatform,
}

impl fmt::Debug for CreateSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateSession")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("platform", &self.platform)
            .finish()
    }
}
