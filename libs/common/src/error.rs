//! Error types shared across the services

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Errors produced by the database layer
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a connection or acquire one from the pool
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A query failed to execute
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Schema migration failed
    #[error("Database migration error: {0}")]
    Migration(String),

    /// The database configuration is missing or malformed
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
