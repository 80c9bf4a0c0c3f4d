//! Domain primitives shared by the snapfeed crates.
//!
//! Nothing in here touches the database or the network: ids, timestamps,
//! the domain error type, and the small pure rules (pagination, post content,
//! upload sniffing) that handlers and repositories both rely on.

pub mod auth;
pub mod error;
pub mod pagination;
pub mod posts;
pub mod types;
