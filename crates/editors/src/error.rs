/// Input rejected before any store call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: String,
        max: String,
    },

    #[error("{field} is not valid JSON: {reason}")]
    InvalidJson { field: &'static str, reason: String },

    #[error("{0} must be a JSON object")]
    NotAnObject(&'static str),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("invalid order: {0}")]
    InvalidOrder(String),
}

/// Errors from a record store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint would be violated.
    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by an editor operation.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Deactivating or removing the address would lock every admin out.
    #[error("cannot remove or deactivate the last active admin email")]
    LastActiveAdmin,
}
