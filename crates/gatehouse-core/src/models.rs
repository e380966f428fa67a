//! Domain models for Gatehouse.

pub mod account;
pub mod session;
pub mod tenant;
pub mod user;
