//! Database-specific error types and conversions.

use gatehouse_core::error::StoreError;

use crate::schema;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid stored value: {0}")]
    Decode(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Surreal(e) => classify([e.to_string()]),
            DbError::Decode(msg) => StoreError::Corrupt(msg),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Map statement errors from one query to a [`StoreError`].
///
/// A failed transaction reports an error for every statement in it, so
/// all messages are searched for a unique index before giving up.
pub(crate) fn classify<I>(messages: I) -> StoreError
where
    I: IntoIterator<Item = String>,
{
    let messages: Vec<String> = messages.into_iter().collect();
    for message in &messages {
        if let Some(field) = schema::unique_field_for(message) {
            return StoreError::UniqueViolation { field };
        }
    }
    StoreError::Backend(messages.join("; "))
}
