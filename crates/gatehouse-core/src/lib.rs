//! Gatehouse Core: domain models, the structured error taxonomy and the
//! repository trait shared by every other Gatehouse crate.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{ErrorCode, ErrorPayload, StoreError, StoreResult, UniqueField};
