//! Error types for the reconciliation engine.

use strata_schema::SchemaError;
use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur during migration operations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model declaration error.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Schema snapshot could not be read or written.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Invalid migration file or format.
    #[error("Invalid migration: {0}")]
    InvalidMigration(String),

    /// Migrations exist that were never applied.
    #[error("{} pending migration(s) must be applied first: {}", .0.len(), .0.join(", "))]
    PendingMigrations(Vec<String>),

    /// The decision channel closed while a rename decision was pending.
    #[error("Decision channel closed while resolving '{element}'")]
    DecisionChannelClosed {
        /// Element awaiting a decision.
        element: String,
    },
}

impl MigrationError {
    /// Create a snapshot error.
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Create a migration file error.
    pub fn migration_file(msg: impl Into<String>) -> Self {
        Self::InvalidMigration(msg.into())
    }

    /// Create a decision channel closed error.
    pub fn channel_closed(element: impl Into<String>) -> Self {
        Self::DecisionChannelClosed {
            element: element.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_display() {
        let err = MigrationError::PendingMigrations(vec![
            "20240101000000_a".to_string(),
            "20240102000000_b".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 pending"));
        assert!(msg.contains("20240102000000_b"));
    }

    #[test]
    fn test_schema_error_is_transparent() {
        let err: MigrationError = SchemaError::unknown_sql_type("Post", "body", "wiki").into();
        assert!(err.to_string().contains("Post.body"));
    }

    #[test]
    fn test_channel_closed_names_element() {
        let err = MigrationError::channel_closed("posts.title");
        assert_eq!(err.to_string(), "Decision channel closed while resolving 'posts.title'");
    }
}
