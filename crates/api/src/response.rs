//! Shared response envelope types for API handlers.
//!
//! Resource endpoints answer with `{ "data": ... }`. The auth endpoints
//! return their token pair bare, and acknowledgements use
//! [`MessageResponse`].

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "message": ... }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
