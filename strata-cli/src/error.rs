//! CLI error types and result alias.

use miette::Diagnostic;
use strata_migrate::MigrationError;
use strata_schema::SchemaError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(strata::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(strata::config))]
    Config(String),

    /// A declared field names a type that cannot be stored
    #[error("Invalid field type: {0}")]
    #[diagnostic(code(strata::invalid_field_type))]
    InvalidFieldType(String),

    /// Declaration error
    #[error("Schema error: {0}")]
    #[diagnostic(code(strata::schema))]
    Schema(String),

    /// Validation error
    #[error("Validation error: {0}")]
    #[diagnostic(code(strata::validation))]
    Validation(String),

    /// Migration error
    #[error("Migration error: {0}")]
    #[diagnostic(code(strata::migration))]
    Migration(String),

    /// Standard input closed while an answer was expected
    #[error("Input closed while waiting for: {0}")]
    #[diagnostic(code(strata::input), help("run with --force-drop, --generate and --default-name to skip prompts"))]
    InputClosed(String),
}

impl From<SchemaError> for CliError {
    fn from(err: SchemaError) -> Self {
        if err.is_unknown_sql_type() {
            CliError::InvalidFieldType(err.to_string())
        } else {
            CliError::Schema(err.to_string())
        }
    }
}

impl From<MigrationError> for CliError {
    fn from(err: MigrationError) -> Self {
        match err {
            MigrationError::Schema(err) => err.into(),
            MigrationError::Io(err) => CliError::Io(err),
            MigrationError::DecisionChannelClosed { element } => CliError::InputClosed(element),
            other => CliError::Migration(other.to_string()),
        }
    }
}
