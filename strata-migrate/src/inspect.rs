//! Schema inspection: what the database currently holds.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use strata_schema::{ColumnDefinition, DeclaredTable, Engine, IndexDefinition, ObservedColumn};

/// A table's physical structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table name.
    pub name: SmolStr,
    /// Primary key column.
    #[serde(default = "default_primary_key")]
    pub primary_key: SmolStr,
    /// Columns other than the primary key, in table order.
    #[serde(default, rename = "column")]
    pub columns: Vec<ColumnDefinition>,
    /// Secondary indexes.
    #[serde(default, rename = "index")]
    pub indexes: Vec<IndexDefinition>,
}

fn default_primary_key() -> SmolStr {
    SmolStr::new_static("id")
}

impl TableDefinition {
    /// Create an empty table with the given primary key.
    pub fn new(name: impl Into<SmolStr>, primary_key: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            primary_key: primary_key.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Add a column.
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Add an index.
    pub fn index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    /// The table a migration for the declarations would create.
    pub fn from_declared(table: &DeclaredTable) -> Self {
        Self {
            name: table.name.clone(),
            primary_key: table.primary_key.clone(),
            columns: table.fields.iter().map(|f| f.definition()).collect(),
            indexes: table.indexes.iter().map(|i| i.definition()).collect(),
        }
    }

    /// Find a column by name.
    pub fn find_column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Find an index by name.
    pub fn find_index(&self, name: &str) -> Option<&IndexDefinition> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Check whether an index backs the primary key.
    pub fn is_primary_index(&self, index: &IndexDefinition) -> bool {
        index.name == "PRIMARY"
            || index.name == format!("{}_pkey", self.name)
            || (index.unique && index.columns.len() == 1 && index.columns[0] == self.primary_key)
    }
}

/// A table as reported by an inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedTable {
    /// Engine the table lives in.
    pub engine: Engine,
    /// Table structure.
    pub definition: TableDefinition,
}

impl ObservedTable {
    /// Create an observed table.
    pub fn new(engine: Engine, definition: TableDefinition) -> Self {
        Self { engine, definition }
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Primary key column.
    pub fn primary_key(&self) -> &str {
        &self.definition.primary_key
    }

    /// Columns other than the primary key, in table order.
    pub fn columns(&self) -> impl Iterator<Item = ObservedColumn> + '_ {
        self.definition
            .columns
            .iter()
            .filter(|c| c.name != self.definition.primary_key)
            .map(|c| ObservedColumn::new(self.engine, c.clone()))
    }

    /// Find a column by name.
    pub fn column(&self, name: &str) -> Option<ObservedColumn> {
        self.definition
            .find_column(name)
            .map(|c| ObservedColumn::new(self.engine, c.clone()))
    }

    /// Secondary indexes, in table order.
    pub fn indexes(&self) -> impl Iterator<Item = &IndexDefinition> {
        self.definition
            .indexes
            .iter()
            .filter(|i| !self.definition.is_primary_index(i))
    }
}

/// Source of the actual schema.
///
/// Inspection has no side effects: asking twice yields the same answer.
pub trait SchemaInspector {
    /// Engine of the inspected database.
    fn engine(&self) -> Engine;

    /// Names of all tables, in a stable order.
    fn table_names(&self) -> Vec<SmolStr>;

    /// A table's structure, or `None` when the table does not exist.
    fn table(&self, name: &str) -> Option<ObservedTable>;
}

/// Which observed tables take part in reconciliation.
#[derive(Debug, Clone)]
pub struct InspectionConfig {
    /// Tables never reconciled.
    pub exclude_tables: Vec<String>,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            exclude_tables: vec!["schema_migrations".to_string()],
        }
    }
}

impl InspectionConfig {
    /// Create the default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude these tables.
    pub fn exclude_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_tables = tables.into_iter().map(Into::into).collect();
        self
    }

    /// Exclude one more table.
    pub fn exclude_table(mut self, table: impl Into<String>) -> Self {
        self.exclude_tables.push(table.into());
        self
    }

    /// Check if a table should be reconciled.
    pub fn should_include_table(&self, name: &str) -> bool {
        !self.exclude_tables.iter().any(|t| t == name)
    }
}
