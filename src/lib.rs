//! The `todoforge` library crate.
//!
//! Contains the domain models, authentication mechanisms (password hashing,
//! token issuance/verification, identity resolution), the owner-scoped todo
//! store, routing configuration, and error handling. The binary in `main.rs`
//! assembles these into the running application.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
