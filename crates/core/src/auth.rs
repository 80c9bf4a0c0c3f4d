//! Fixed client-facing messages and token lifetimes for the session core.
//!
//! Login and refresh collapse every failure into one message each so a caller
//! cannot tell which check rejected them.

/// Returned for an unknown email and for a wrong password alike.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Returned for a forged, expired, rotated-away, or revoked refresh token.
pub const INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token";

/// Returned by the access guard for any missing or unusable access token.
pub const UNAUTHORIZED: &str = "Unauthorized";

pub const EMAIL_TAKEN: &str = "Email already in use";
pub const USERNAME_TAKEN: &str = "Username already in use";

/// Default access token lifetime in minutes.
pub const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;

/// Default refresh token (and session row) lifetime in days.
pub const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;
