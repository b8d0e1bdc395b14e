use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Store unavailable during {operation}: {reason}")]
    StoreUnavailable { operation: String, reason: String },

    #[error("Migration of {collection} failed for {failed} record(s)")]
    MigrationPartialFailure { collection: &'static str, failed: usize },

    #[error("Skipped: invalid {field}: {reason}")]
    ValidationSkipped { field: &'static str, reason: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not determine project directories")]
    NoProjectDirs,

    #[error("Could not create data directory: {0}")]
    DataDirCreation(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn unavailable(operation: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        AppError::StoreUnavailable {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures of the remote store (network, permission, quota).
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable { .. })
    }
}

/// Check if a rusqlite error is a busy/locked database, which the store
/// reports as unavailability rather than a hard database error.
pub fn is_busy(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _)
        if err.code == rusqlite::ffi::ErrorCode::DatabaseBusy
            || err.code == rusqlite::ffi::ErrorCode::DatabaseLocked)
}
