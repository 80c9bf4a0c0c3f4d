//! Token-based authentication: token issuance, password hashing, the
//! credential and session stores, and the session lifecycle built on them.

pub mod jwt;
pub mod memory;
pub mod password;
pub mod session;
pub mod store;
