//! Reconciliation output: the operations that bring a schema in line.

use smol_str::SmolStr;
use strata_schema::{ColumnDefinition, IndexDefinition};

use crate::inspect::TableDefinition;

/// One schema change.
///
/// Operations that remove something carry what was removed, and changes
/// carry both sides, so every operation has an exact inverse.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Create a table with its columns and indexes.
    CreateTable {
        /// The table to create.
        table: TableDefinition,
    },
    /// Drop a table.
    DropTable {
        /// The table as it exists before the drop.
        table: TableDefinition,
    },
    /// Rename a table.
    RenameTable {
        /// Current name.
        from: SmolStr,
        /// New name.
        to: SmolStr,
    },
    /// Add a column.
    AddColumn {
        /// Table name.
        table: SmolStr,
        /// The column to add.
        column: ColumnDefinition,
    },
    /// Drop a column.
    DropColumn {
        /// Table name.
        table: SmolStr,
        /// The column as it exists before the drop.
        column: ColumnDefinition,
    },
    /// Rename a column.
    RenameColumn {
        /// Table name.
        table: SmolStr,
        /// Current name.
        from: SmolStr,
        /// New name.
        to: SmolStr,
    },
    /// Change a column's type or attributes.
    ChangeColumn {
        /// Table name.
        table: SmolStr,
        /// The column as it exists.
        from: ColumnDefinition,
        /// The column as declared.
        to: ColumnDefinition,
    },
    /// Add an index.
    AddIndex {
        /// Table name.
        table: SmolStr,
        /// The index to add.
        index: IndexDefinition,
    },
    /// Drop an index.
    DropIndex {
        /// Table name.
        table: SmolStr,
        /// The index as it exists before the drop.
        index: IndexDefinition,
    },
}

impl Operation {
    /// The operation that undoes this one.
    pub fn inverse(&self) -> Operation {
        match self {
            Self::CreateTable { table } => Self::DropTable {
                table: table.clone(),
            },
            Self::DropTable { table } => Self::CreateTable {
                table: table.clone(),
            },
            Self::RenameTable { from, to } => Self::RenameTable {
                from: to.clone(),
                to: from.clone(),
            },
            Self::AddColumn { table, column } => Self::DropColumn {
                table: table.clone(),
                column: column.clone(),
            },
            Self::DropColumn { table, column } => Self::AddColumn {
                table: table.clone(),
                column: column.clone(),
            },
            Self::RenameColumn { table, from, to } => Self::RenameColumn {
                table: table.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            Self::ChangeColumn { table, from, to } => Self::ChangeColumn {
                table: table.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            Self::AddIndex { table, index } => Self::DropIndex {
                table: table.clone(),
                index: index.clone(),
            },
            Self::DropIndex { table, index } => Self::AddIndex {
                table: table.clone(),
                index: index.clone(),
            },
        }
    }

    /// Name of the table the operation touches.
    pub fn table_name(&self) -> &str {
        match self {
            Self::CreateTable { table } | Self::DropTable { table } => &table.name,
            Self::RenameTable { to, .. } => to,
            Self::AddColumn { table, .. }
            | Self::DropColumn { table, .. }
            | Self::RenameColumn { table, .. }
            | Self::ChangeColumn { table, .. }
            | Self::AddIndex { table, .. }
            | Self::DropIndex { table, .. } => table,
        }
    }

    /// Check whether the operation loses data when run.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::DropTable { .. } | Self::DropColumn { .. })
    }

    /// One-line description.
    pub fn describe(&self) -> String {
        match self {
            Self::CreateTable { table } => format!("create table {}", table.name),
            Self::DropTable { table } => format!("drop table {}", table.name),
            Self::RenameTable { from, to } => format!("rename table {from} to {to}"),
            Self::AddColumn { table, column } => format!("add column {table}.{}", column.name),
            Self::DropColumn { table, column } => format!("drop column {table}.{}", column.name),
            Self::RenameColumn { table, from, to } => {
                format!("rename column {table}.{from} to {to}")
            }
            Self::ChangeColumn { table, to, .. } => format!("change column {table}.{}", to.name),
            Self::AddIndex { table, index } => format!("add index {} on {table}", index.name),
            Self::DropIndex { table, index } => format!("drop index {} on {table}", index.name),
        }
    }
}

/// The ordered operations of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    operations: Vec<Operation>,
}

impl Plan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation.
    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Append several operations.
    pub fn extend(&mut self, operations: impl IntoIterator<Item = Operation>) {
        self.operations.extend(operations);
    }

    /// Operations in execution order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check whether there is nothing to migrate.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The plan that undoes this one.
    pub fn inverse(&self) -> Plan {
        Plan {
            operations: self.operations.iter().rev().map(Operation::inverse).collect(),
        }
    }

    /// Get a human-readable summary of the plan.
    pub fn summary(&self) -> String {
        let count = |pred: fn(&Operation) -> bool| self.operations.iter().filter(|op| pred(op)).count();

        let counts = [
            ("Create", "tables", count(|op| matches!(op, Operation::CreateTable { .. }))),
            ("Drop", "tables", count(|op| matches!(op, Operation::DropTable { .. }))),
            ("Rename", "tables", count(|op| matches!(op, Operation::RenameTable { .. }))),
            ("Add", "columns", count(|op| matches!(op, Operation::AddColumn { .. }))),
            ("Drop", "columns", count(|op| matches!(op, Operation::DropColumn { .. }))),
            ("Rename", "columns", count(|op| matches!(op, Operation::RenameColumn { .. }))),
            ("Change", "columns", count(|op| matches!(op, Operation::ChangeColumn { .. }))),
            ("Add", "indexes", count(|op| matches!(op, Operation::AddIndex { .. }))),
            ("Drop", "indexes", count(|op| matches!(op, Operation::DropIndex { .. }))),
        ];

        let parts: Vec<String> = counts
            .iter()
            .filter(|(_, _, n)| *n > 0)
            .map(|(verb, noun, n)| format!("{verb} {n} {noun}"))
            .collect();

        if parts.is_empty() {
            "No changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl IntoIterator for Plan {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}
