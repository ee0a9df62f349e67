//! Error types for field declarations and type resolution.

// miette's derive reads the variant fields; rustc does not see that.
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while declaring models or loading declarations.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading a file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(strata::schema::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML in {path}")]
    #[diagnostic(code(strata::schema::toml_error))]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A declared type resolves to no SQL storage type.
    #[error("unknown SQL type `{type_name}` for `{model}.{field}`")]
    #[diagnostic(
        code(strata::schema::unknown_sql_type),
        help("use a native column type, register a rich type, or pass an explicit `sql_type`")
    )]
    UnknownSqlType {
        model: String,
        field: String,
        type_name: String,
    },

    /// A field was declared with the primary key's name.
    #[error("cannot declare field `{model}.{field}`: it is the primary key")]
    #[diagnostic(code(strata::schema::primary_key_field))]
    PrimaryKeyField { model: String, field: String },

    /// A model reference outlived the definition it pointed to.
    #[error("stale reference to model `{model}`: the model has been redefined")]
    #[diagnostic(
        code(strata::schema::stale_model),
        help("look the model up again instead of keeping references across redefinition")
    )]
    StaleModel { model: String },

    /// Reference to a model that was never defined.
    #[error("unknown model `{name}`")]
    #[diagnostic(code(strata::schema::unknown_model))]
    UnknownModel { name: String },

    /// Invalid model definition.
    #[error("invalid model `{name}`: {message}")]
    #[diagnostic(code(strata::schema::invalid_model))]
    InvalidModel { name: String, message: String },

    /// Invalid index definition.
    #[error("invalid index on `{model}`: {message}")]
    #[diagnostic(code(strata::schema::invalid_index))]
    InvalidIndex { model: String, message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(strata::schema::config_error))]
    ConfigError { message: String },
}

impl SchemaError {
    /// Create an unknown SQL type error.
    pub fn unknown_sql_type(
        model: impl Into<String>,
        field: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self::UnknownSqlType {
            model: model.into(),
            field: field.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a primary key guard error.
    pub fn primary_key_field(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::PrimaryKeyField {
            model: model.into(),
            field: field.into(),
        }
    }

    /// Create a stale model error.
    pub fn stale_model(model: impl Into<String>) -> Self {
        Self::StaleModel {
            model: model.into(),
        }
    }

    /// Create an unknown model error.
    pub fn unknown_model(name: impl Into<String>) -> Self {
        Self::UnknownModel { name: name.into() }
    }

    /// Create an invalid model error.
    pub fn invalid_model(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidModel {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid index error.
    pub fn invalid_index(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidIndex {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Check whether this error is a type resolution failure.
    pub fn is_unknown_sql_type(&self) -> bool {
        matches!(self, Self::UnknownSqlType { .. })
    }
}
