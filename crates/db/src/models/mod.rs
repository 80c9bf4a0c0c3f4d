//! Domain model structs and DTOs.
//!
//! Row structs derive `FromRow`; anything that leaves the API derives
//! `Serialize` with camelCase field names.

pub mod like;
pub mod post;
pub mod session;
pub mod user;
