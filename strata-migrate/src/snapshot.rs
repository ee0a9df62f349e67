//! A TOML snapshot of the database schema.
//!
//! The snapshot stands in for a live database: it answers inspection
//! queries, and applying a plan updates it the way running the migration
//! would update the database.

use std::path::Path;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use strata_schema::Engine;
use tracing::{debug, info};

use crate::error::{MigrateResult, MigrationError};
use crate::inspect::{ObservedTable, SchemaInspector, TableDefinition};
use crate::operation::{Operation, Plan};

/// The recorded state of a database schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Engine of the database.
    #[serde(default)]
    pub engine: Engine,
    /// Migrations applied so far, by directory name.
    #[serde(default)]
    pub applied: Vec<String>,
    /// Tables, in creation order.
    #[serde(default, rename = "table")]
    pub tables: Vec<TableDefinition>,
}

impl SchemaSnapshot {
    /// Create an empty snapshot.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            applied: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Parse a snapshot from TOML.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> MigrateResult<Self> {
        toml::from_str(content).map_err(|e| MigrationError::snapshot(e.to_string()))
    }

    /// Render the snapshot as TOML.
    pub fn to_toml(&self) -> MigrateResult<String> {
        toml::to_string_pretty(self).map_err(|e| MigrationError::snapshot(e.to_string()))
    }

    /// Load a snapshot file.
    pub async fn load(path: impl AsRef<Path>) -> MigrateResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(MigrationError::Io)?;
        let snapshot = Self::from_str(&content)
            .map_err(|e| MigrationError::snapshot(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), tables = snapshot.tables.len(), "loaded snapshot");
        Ok(snapshot)
    }

    /// Load a snapshot file, or start empty when it does not exist.
    pub async fn load_or_empty(path: impl AsRef<Path>, engine: Engine) -> MigrateResult<Self> {
        let path = path.as_ref();
        if tokio::fs::try_exists(path).await.map_err(MigrationError::Io)? {
            Self::load(path).await
        } else {
            debug!(path = %path.display(), "no snapshot yet, starting empty");
            Ok(Self::new(engine))
        }
    }

    /// Write the snapshot to a file.
    pub async fn save(&self, path: impl AsRef<Path>) -> MigrateResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(MigrationError::Io)?;
        }
        tokio::fs::write(path, self.to_toml()?)
            .await
            .map_err(MigrationError::Io)?;
        Ok(())
    }

    /// Add or replace a table.
    pub fn insert_table(&mut self, table: TableDefinition) {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    /// Find a table by name.
    pub fn find_table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|t| t.name == name)
    }

    fn table_mut(&mut self, name: &str) -> MigrateResult<&mut TableDefinition> {
        self.tables
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| MigrationError::snapshot(format!("table '{name}' does not exist")))
    }

    /// Apply one operation.
    pub fn apply_operation(&mut self, operation: &Operation) -> MigrateResult<()> {
        match operation {
            Operation::CreateTable { table } => {
                if self.find_table(&table.name).is_some() {
                    return Err(MigrationError::snapshot(format!(
                        "table '{}' already exists",
                        table.name
                    )));
                }
                self.tables.push(table.clone());
            }
            Operation::DropTable { table } => {
                self.table_mut(&table.name)?;
                self.tables.retain(|t| t.name != table.name);
            }
            Operation::RenameTable { from, to } => {
                self.table_mut(from)?.name = to.clone();
            }
            Operation::AddColumn { table, column } => {
                let table = self.table_mut(table)?;
                if table.find_column(&column.name).is_some() {
                    return Err(MigrationError::snapshot(format!(
                        "column '{}.{}' already exists",
                        table.name, column.name
                    )));
                }
                table.columns.push(column.clone());
            }
            Operation::DropColumn { table, column } => {
                let table = self.table_mut(table)?;
                table.columns.retain(|c| c.name != column.name);
            }
            Operation::RenameColumn { table, from, to } => {
                let table = self.table_mut(table)?;
                let column = table
                    .columns
                    .iter_mut()
                    .find(|c| c.name == *from)
                    .ok_or_else(|| MigrationError::snapshot(format!("column '{from}' does not exist")))?;
                column.name = to.clone();
                for index in &mut table.indexes {
                    for indexed in &mut index.columns {
                        if indexed == from {
                            *indexed = to.clone();
                        }
                    }
                }
            }
            Operation::ChangeColumn { table, to, .. } => {
                let table = self.table_mut(table)?;
                let column = table
                    .columns
                    .iter_mut()
                    .find(|c| c.name == to.name)
                    .ok_or_else(|| {
                        MigrationError::snapshot(format!("column '{}' does not exist", to.name))
                    })?;
                *column = to.clone();
            }
            Operation::AddIndex { table, index } => {
                let table = self.table_mut(table)?;
                table.indexes.retain(|i| i.name != index.name);
                table.indexes.push(index.clone());
            }
            Operation::DropIndex { table, index } => {
                let table = self.table_mut(table)?;
                table.indexes.retain(|i| i.name != index.name);
            }
        }
        Ok(())
    }

    /// Apply a whole plan.
    pub fn apply(&mut self, plan: &Plan) -> MigrateResult<()> {
        for operation in plan.operations() {
            self.apply_operation(operation)?;
        }
        info!(operations = plan.len(), "applied plan to snapshot");
        Ok(())
    }

    /// Record a migration as applied.
    pub fn record_applied(&mut self, migration: impl Into<String>) {
        let migration = migration.into();
        if !self.applied.contains(&migration) {
            self.applied.push(migration);
        }
    }
}

impl SchemaInspector for SchemaSnapshot {
    fn engine(&self) -> Engine {
        self.engine
    }

    fn table_names(&self) -> Vec<SmolStr> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    fn table(&self, name: &str) -> Option<ObservedTable> {
        self.find_table(name)
            .map(|t| ObservedTable::new(self.engine, t.clone()))
    }
}
