//! Database error types.

use thiserror::Error;

use crate::status::RequestStatus;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Request lifecycle transition not permitted from the current state
    #[error("cannot move request from '{from}' to '{to}'")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    /// Request approval requires a confirmed payment
    #[error("request {request_id} has no confirmed payment")]
    PaymentNotConfirmed { request_id: i64 },

    /// Acting guide is not the one assigned to the request
    #[error("guide {guide_id} is not assigned to request {request_id}")]
    NotAssignedGuide { request_id: i64, guide_id: i64 },
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
