//! Declared and observed indexes.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Options for an index declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    /// Whether the index is unique.
    pub unique: bool,
    /// Explicit index name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<SmolStr>,
}

impl IndexOptions {
    /// Create default (non-unique, auto-named) options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the index unique.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Give the index an explicit name.
    pub fn name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// An index as it exists (or would exist) in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name.
    pub name: SmolStr,
    /// Indexed columns, in order.
    pub columns: Vec<SmolStr>,
    /// Whether the index is unique.
    #[serde(default)]
    pub unique: bool,
}

/// Build the conventional index name for a table and column list.
pub fn default_index_name(table: &str, fields: &[SmolStr]) -> SmolStr {
    let columns: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
    SmolStr::new(format!("index_{}_on_{}", table, columns.join("_and_")))
}

/// A declared index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    owner: SmolStr,
    fields: Vec<SmolStr>,
    unique: bool,
    name: SmolStr,
}

impl IndexSpec {
    /// Create an index on `table` covering `fields` in order.
    pub fn new(table: impl Into<SmolStr>, fields: Vec<SmolStr>, options: IndexOptions) -> Self {
        let owner = table.into();
        let name = options
            .name
            .unwrap_or_else(|| default_index_name(&owner, &fields));

        Self {
            owner,
            fields,
            unique: options.unique,
            name,
        }
    }

    /// Table the index belongs to.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Indexed fields, in order.
    pub fn fields(&self) -> &[SmolStr] {
        &self.fields
    }

    /// Whether the index is unique.
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check whether this index covers exactly the given ordered field list.
    pub fn covers(&self, fields: &[SmolStr]) -> bool {
        self.fields == fields
    }

    /// The index a migration for this declaration would create.
    pub fn definition(&self) -> IndexDefinition {
        IndexDefinition {
            name: self.name.clone(),
            columns: self.fields.clone(),
            unique: self.unique,
        }
    }

    /// Check whether an observed index of the same name differs from this declaration.
    pub fn different_to(&self, observed: &IndexDefinition) -> bool {
        observed.columns != self.fields || observed.unique != self.unique
    }
}
