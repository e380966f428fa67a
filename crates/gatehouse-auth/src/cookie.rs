//! Session cookie model and the per-request cookie jar seam.
//!
//! The host owns HTTP; this module only describes the cookie the core
//! needs written and reads the token back through [`CookieJar`].

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

fn epoch() -> DateTime<Utc> {
    DateTime::default()
}

#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub http_only: bool,
    pub same_site: SameSite,
    pub secure: bool,
    pub path: String,
    pub expires: DateTime<Utc>,
}

impl SessionCookie {
    /// Cookie carrying `token` until the session's expiry.
    pub fn issue(token: &str, expires: DateTime<Utc>, secure: bool) -> Self {
        Self {
            name: SESSION_COOKIE.to_string(),
            value: token.to_string(),
            http_only: true,
            same_site: SameSite::Lax,
            secure,
            path: "/".to_string(),
            expires,
        }
    }

    /// Cookie that makes the browser drop the session cookie.
    pub fn cleared(secure: bool) -> Self {
        Self::issue("", epoch(), secure)
    }

    pub fn is_cleared(&self) -> bool {
        self.value.is_empty() || self.expires <= epoch()
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("http_only", &self.http_only)
            .field("same_site", &self.same_site)
            .field("secure", &self.secure)
            .field("path", &self.path)
            .field("expires", &self.expires)
            .finish()
    }
}

/// Renders the `Set-Cookie` header value.
impl fmt::Display for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; Path={}; Expires={}",
            self.name,
            self.value,
            self.path,
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT"),
        )?;
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        write!(f, "; SameSite={}", self.same_site.as_str())?;
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
#[error("cookie could not be written: {0}")]
pub struct CookieError(pub String);

/// Request-scoped cookie access supplied by the host.
pub trait CookieJar: Send {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&mut self, cookie: SessionCookie) -> Result<(), CookieError>;
}

/// Cookie jar kept in memory, for non-HTTP hosts and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryCookieJar {
    cookies: HashMap<String, SessionCookie>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jar holding a session token, as if sent by the client.
    pub fn with_session(token: &str) -> Self {
        let mut jar = Self::new();
        jar.cookies.insert(
            SESSION_COOKIE.to_string(),
            SessionCookie::issue(token, DateTime::<Utc>::MAX_UTC, false),
        );
        jar
    }

    /// The last cookie written under `name`, including cleared ones.
    pub fn cookie(&self, name: &str) -> Option<&SessionCookie> {
        self.cookies.get(name)
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .get(name)
            .filter(|c| !c.is_cleared())
            .map(|c| c.value.clone())
    }

    fn set(&mut self, cookie: SessionCookie) -> Result<(), CookieError> {
        self.cookies.insert(cookie.name.clone(), cookie);
        Ok(())
    }
}
