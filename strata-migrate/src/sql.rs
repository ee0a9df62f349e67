//! SQL generation for migration scripts.

use strata_schema::{ColumnDefinition, Engine, IndexDefinition, NativeTypes, PRIMARY_KEY_TYPE};

use crate::inspect::TableDefinition;
use crate::operation::{Operation, Plan};

/// Generated SQL for a migration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationScript {
    /// SQL to apply the migration.
    pub up: String,
    /// SQL to rollback the migration.
    pub down: String,
}

impl MigrationScript {
    /// Check if the migration is empty.
    pub fn is_empty(&self) -> bool {
        self.up.trim().is_empty()
    }
}

/// Renders plans as SQL for one engine.
#[derive(Debug, Clone)]
pub struct SqlEmitter {
    engine: Engine,
    native: NativeTypes,
}

impl SqlEmitter {
    /// Create an emitter for an engine.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            native: NativeTypes::for_engine(engine),
        }
    }

    /// The target engine.
    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// Generate the up and down scripts of a plan.
    ///
    /// The down script is the rendering of the inverse plan.
    pub fn emit(&self, plan: &Plan) -> MigrationScript {
        MigrationScript {
            up: self.render(plan),
            down: self.render(&plan.inverse()),
        }
    }

    /// Render a plan as a sequence of statements.
    pub fn render(&self, plan: &Plan) -> String {
        let statements: Vec<String> = plan
            .operations()
            .iter()
            .flat_map(|op| self.statements(op))
            .collect();
        statements.join("\n")
    }

    /// Statements for one operation.
    pub fn statements(&self, operation: &Operation) -> Vec<String> {
        match operation {
            Operation::CreateTable { table } => self.create_table(table),
            Operation::DropTable { table } => {
                vec![format!("DROP TABLE {};", self.quote(&table.name))]
            }
            Operation::RenameTable { from, to } => vec![self.rename_table(from, to)],
            Operation::AddColumn { table, column } => vec![format!(
                "ALTER TABLE {} ADD COLUMN {};",
                self.quote(table),
                self.column_definition(column)
            )],
            Operation::DropColumn { table, column } => vec![format!(
                "ALTER TABLE {} DROP COLUMN {};",
                self.quote(table),
                self.quote(&column.name)
            )],
            Operation::RenameColumn { table, from, to } => vec![format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {};",
                self.quote(table),
                self.quote(from),
                self.quote(to)
            )],
            Operation::ChangeColumn { table, from, to } => self.change_column(table, from, to),
            Operation::AddIndex { table, index } => vec![self.create_index(table, index)],
            Operation::DropIndex { table, index } => vec![self.drop_index(table, index)],
        }
    }

    fn quote(&self, ident: &str) -> String {
        match self.engine {
            Engine::Mysql => format!("`{}`", ident.replace('`', "``")),
            Engine::Postgresql | Engine::Sqlite => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// Native spelling of a column's type, with limit or precision.
    pub fn column_type(&self, column: &ColumnDefinition) -> String {
        let Some(native) = self.native.get(&column.sql_type) else {
            return column.sql_type.to_uppercase();
        };

        if let Some(precision) = column.precision {
            return match column.scale {
                Some(scale) => format!("{}({precision}, {scale})", native.sql_name),
                None => format!("{}({precision})", native.sql_name),
            };
        }

        if column.sql_type == "integer" && self.engine != Engine::Mysql {
            if let Some(bytes) = column.limit {
                return integer_of_size(bytes).to_string();
            }
        }

        match column.limit.or(native.limit) {
            Some(limit) if self.accepts_limit(&column.sql_type) => {
                format!("{}({limit})", native.sql_name)
            }
            _ => native.sql_name.to_string(),
        }
    }

    fn accepts_limit(&self, sql_type: &str) -> bool {
        match self.engine {
            Engine::Postgresql | Engine::Sqlite => sql_type == "string",
            Engine::Mysql => matches!(sql_type, "string" | "integer" | "boolean" | "binary"),
        }
    }

    fn column_definition(&self, column: &ColumnDefinition) -> String {
        let mut parts = vec![self.quote(&column.name), self.column_type(column)];

        if !column.null {
            parts.push("NOT NULL".to_string());
        }

        if let Some(default) = &column.default {
            parts.push(format!("DEFAULT {}", default.to_sql_literal()));
        }

        parts.join(" ")
    }

    fn create_table(&self, table: &TableDefinition) -> Vec<String> {
        let primary_key = self
            .native
            .get(PRIMARY_KEY_TYPE)
            .map(|native| native.sql_name.to_string())
            .unwrap_or_else(|| "INTEGER PRIMARY KEY".to_string());

        let mut columns = vec![format!("{} {}", self.quote(&table.primary_key), primary_key)];
        columns.extend(
            table
                .columns
                .iter()
                .filter(|c| c.name != table.primary_key)
                .map(|c| self.column_definition(c)),
        );

        let mut stmts = vec![format!(
            "CREATE TABLE {} (\n    {}\n);",
            self.quote(&table.name),
            columns.join(",\n    ")
        )];
        stmts.extend(
            table
                .indexes
                .iter()
                .map(|index| self.create_index(&table.name, index)),
        );
        stmts
    }

    fn rename_table(&self, from: &str, to: &str) -> String {
        match self.engine {
            Engine::Mysql => format!("RENAME TABLE {} TO {};", self.quote(from), self.quote(to)),
            Engine::Postgresql | Engine::Sqlite => {
                format!("ALTER TABLE {} RENAME TO {};", self.quote(from), self.quote(to))
            }
        }
    }

    fn change_column(
        &self,
        table: &str,
        from: &ColumnDefinition,
        to: &ColumnDefinition,
    ) -> Vec<String> {
        match self.engine {
            Engine::Postgresql => {
                let table_name = table;
                let table = self.quote(table);
                let column = self.quote(&to.name);
                let mut stmts = Vec::new();

                let new_type = self.column_type(to);
                if self.column_type(from) != new_type {
                    stmts.push(format!(
                        "ALTER TABLE {table} ALTER COLUMN {column} TYPE {new_type};"
                    ));
                }

                if from.null != to.null {
                    let action = if to.null { "DROP NOT NULL" } else { "SET NOT NULL" };
                    stmts.push(format!("ALTER TABLE {table} ALTER COLUMN {column} {action};"));
                }

                if from.default != to.default {
                    let action = match &to.default {
                        Some(value) => format!("SET DEFAULT {}", value.to_sql_literal()),
                        None => "DROP DEFAULT".to_string(),
                    };
                    stmts.push(format!("ALTER TABLE {table} ALTER COLUMN {column} {action};"));
                }

                // A limit PostgreSQL does not store, such as on TEXT or BYTEA.
                if stmts.is_empty() {
                    stmts.push(format!(
                        "-- no change needed for {}.{}: {} -> {}",
                        table_name,
                        to.name,
                        self.column_definition(from),
                        self.column_definition(to)
                    ));
                }

                stmts
            }
            Engine::Mysql => vec![format!(
                "ALTER TABLE {} MODIFY COLUMN {};",
                self.quote(table),
                self.column_definition(to)
            )],
            // SQLite has no ALTER COLUMN; the table has to be rebuilt by hand.
            Engine::Sqlite => vec![format!(
                "-- cannot change column {}.{} in place: {} -> {}",
                table,
                to.name,
                self.column_definition(from),
                self.column_definition(to)
            )],
        }
    }

    fn create_index(&self, table: &str, index: &IndexDefinition) -> String {
        let unique = if index.unique { "UNIQUE " } else { "" };
        let cols: Vec<String> = index.columns.iter().map(|c| self.quote(c)).collect();
        format!(
            "CREATE {}INDEX {} ON {} ({});",
            unique,
            self.quote(&index.name),
            self.quote(table),
            cols.join(", ")
        )
    }

    fn drop_index(&self, table: &str, index: &IndexDefinition) -> String {
        match self.engine {
            Engine::Mysql => format!(
                "DROP INDEX {} ON {};",
                self.quote(&index.name),
                self.quote(table)
            ),
            Engine::Postgresql | Engine::Sqlite => {
                format!("DROP INDEX {};", self.quote(&index.name))
            }
        }
    }
}

/// Integer type for a byte size, as `limit` expresses it on integers.
fn integer_of_size(bytes: u32) -> &'static str {
    match bytes {
        0..=2 => "SMALLINT",
        3..=4 => "INTEGER",
        _ => "BIGINT",
    }
}
