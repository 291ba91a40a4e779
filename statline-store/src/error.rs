//! Storage layer errors

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// A column-range invariant was violated (e.g. more than 6 fouls or
    /// more than 48 minutes in one game); the whole write is rolled back
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                // 23514 = check_violation
                if db_err.code().map(|c| c == "23514").unwrap_or(false) {
                    StoreError::Constraint(db_err.to_string())
                } else {
                    StoreError::Database(db_err.to_string())
                }
            },
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => {
                StoreError::Connection(err.to_string())
            },
            _ => StoreError::Database(err.to_string()),
        }
    }
}
