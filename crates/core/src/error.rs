use crate::types::DbId;

/// Domain error shared by the session core, the stores, and the handlers.
///
/// The HTTP layer matches on every variant to pick a status code, so adding a
/// variant here forces a decision there.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Missing or malformed process configuration. Only raised at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persistence failure that is not a recognised constraint violation.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for an [`CoreError::Unauthorized`] with a static message.
    pub fn unauthorized(msg: &str) -> Self {
        Self::Unauthorized(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = CoreError::NotFound {
            entity: "Post",
            id: 7,
        };
        assert_eq!(err.to_string(), "Entity not found: Post with id 7");
    }

    #[test]
    fn unauthorized_shorthand_keeps_message() {
        let err = CoreError::unauthorized("Invalid credentials");
        assert!(matches!(err, CoreError::Unauthorized(ref m) if m == "Invalid credentials"));
    }
}
