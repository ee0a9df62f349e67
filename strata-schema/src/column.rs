//! Physical column descriptors.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::types::Engine;
use crate::value::Value;

fn default_null() -> bool {
    true
}

/// The attributes of a physical column.
///
/// Used both for what the inspector reports and for the column a declared
/// field would create, so a change can carry before/after snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: SmolStr,
    /// Symbolic column type (`string`, `integer`, ...).
    #[serde(rename = "type")]
    pub sql_type: SmolStr,
    /// Storage limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Numeric precision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Numeric scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    /// Whether NULL is allowed.
    #[serde(default = "default_null")]
    pub null: bool,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ColumnDefinition {
    /// Create a nullable column without limit or default.
    pub fn new(name: impl Into<SmolStr>, sql_type: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            limit: None,
            precision: None,
            scale: None,
            null: true,
            default: None,
        }
    }

    /// Set the limit.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set precision and scale.
    pub fn precision_scale(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Set nullability.
    pub fn null(mut self, null: bool) -> Self {
        self.null = null;
        self
    }

    /// Set the default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Copy of this definition under another name.
    pub fn renamed(&self, name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// A column as reported by schema inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedColumn {
    /// Engine the column was read from.
    pub engine: Engine,
    /// Column attributes.
    pub definition: ColumnDefinition,
}

impl ObservedColumn {
    /// Create an observed column.
    pub fn new(engine: Engine, definition: ColumnDefinition) -> Self {
        Self { engine, definition }
    }

    /// Get the column name.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Get the column type.
    pub fn sql_type(&self) -> &str {
        &self.definition.sql_type
    }
}
