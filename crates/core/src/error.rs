use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A uniqueness violation attributed to a single input field
    /// (e.g. a second registration with the same email for one event).
    #[error("Duplicate {field}: {message}")]
    Duplicate {
        field: &'static str,
        message: String,
    },

    /// An event has no free slots left.
    #[error("Event is at capacity ({capacity})")]
    CapacityExceeded { capacity: i32 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Filesystem failure while writing or removing an uploaded image.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
