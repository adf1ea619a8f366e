//! Failures of the rovers database layer.

use rovers_expedition::StoreError;

/// Anything that can go wrong talking to the rovers database.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Query, pool or connection failure.
    #[error("database query failed: {0}")]
    Postgres(#[from] sqlx::Error),

    /// The embedded schema could not be applied.
    #[error("schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A JSONB column could not be encoded or decoded.
    #[error("JSON column error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value does not map back to a domain value.
    #[error("column {column} holds unexpected value {value}")]
    Decode {
        /// Column that held the value.
        column: &'static str,
        /// The offending value.
        value: String,
    },

    /// Missing or malformed connection settings.
    #[error("database configuration: {0}")]
    Config(String),
}

impl From<DbError> for StoreError {
    fn from(error: DbError) -> Self {
        Self::Backend {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_errors_become_backend_store_errors() {
        let err: StoreError = DbError::Decode {
            column: "status",
            value: "paused".to_owned(),
        }
        .into();
        assert!(matches!(err, StoreError::Backend { .. }));
        assert_eq!(
            err.to_string(),
            "store backend error: column status holds unexpected value paused"
        );
    }
}
