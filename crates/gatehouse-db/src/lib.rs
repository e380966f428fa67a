//! Gatehouse Database: storage adapters for the
//! [`AuthRepository`](gatehouse_core::repository::AuthRepository) trait.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - A SurrealDB-backed repository ([`SurrealAuthRepository`])
//! - An in-process repository ([`MemoryAuthRepository`]) for tests and
//!   single-node development
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod memory;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager, DbRepository};
pub use error::DbError;
pub use memory::{MemoryAuthRepository, MemoryTx};
pub use repository::{SurrealAuthRepository, SurrealTx};
pub use schema::run_migrations;
