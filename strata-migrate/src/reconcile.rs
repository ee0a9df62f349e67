//! Reconciliation of declared models against the inspected schema.

use indexmap::IndexMap;
use smol_str::SmolStr;
use strata_schema::{Catalog, ComparisonRules, DeclaredTable, ObservedColumn};
use tracing::{debug, info, warn};

use crate::error::MigrateResult;
use crate::inspect::{InspectionConfig, ObservedTable, SchemaInspector, TableDefinition};
use crate::operation::{Operation, Plan};
use crate::rename::{ElementKind, RenameResolver};

/// Names present on only one side, in the order they were listed.
fn one_sided(left: &[SmolStr], right: &[SmolStr]) -> Vec<SmolStr> {
    left.iter().filter(|n| !right.contains(n)).cloned().collect()
}

/// Computes the operations that align the inspected schema with the declarations.
pub struct Reconciler<'a, I: SchemaInspector + ?Sized> {
    inspector: &'a I,
    rules: ComparisonRules,
    config: InspectionConfig,
}

impl<'a, I: SchemaInspector + ?Sized> Reconciler<'a, I> {
    /// Create a reconciler over an inspector.
    pub fn new(inspector: &'a I, rules: ComparisonRules) -> Self {
        Self {
            inspector,
            rules,
            config: InspectionConfig::default(),
        }
    }

    /// Set which observed tables take part.
    pub fn with_config(mut self, config: InspectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Reconcile every table of the catalog.
    pub fn reconcile(
        &self,
        catalog: &Catalog,
        resolver: &mut dyn RenameResolver,
    ) -> MigrateResult<Plan> {
        if catalog.types().engine() != self.inspector.engine() {
            warn!(
                declared = %catalog.types().engine(),
                inspected = %self.inspector.engine(),
                "declarations and database use different engines"
            );
        }
        self.reconcile_tables(&catalog.tables(), &catalog.excluded_tables(), resolver)
    }

    /// Reconcile a set of declared tables.
    ///
    /// Observed tables named in `excluded` belong to models outside
    /// migrations and are never dropped.
    pub fn reconcile_tables(
        &self,
        declared: &[DeclaredTable],
        excluded: &[SmolStr],
        resolver: &mut dyn RenameResolver,
    ) -> MigrateResult<Plan> {
        let declared_names: Vec<SmolStr> = declared.iter().map(|t| t.name.clone()).collect();
        let observed_names: Vec<SmolStr> = self
            .inspector
            .table_names()
            .into_iter()
            .filter(|n| self.config.should_include_table(n) && !excluded.contains(n))
            .collect();

        let mut to_create = one_sided(&declared_names, &observed_names);
        let mut to_drop = one_sided(&observed_names, &declared_names);
        let renames = resolver.extract_renames(&mut to_create, &mut to_drop, ElementKind::Table, "")?;

        let mut plan = Plan::new();
        for (from, to) in &renames {
            plan.push(Operation::RenameTable {
                from: from.clone(),
                to: to.clone(),
            });
        }

        for table in declared.iter().filter(|t| to_create.contains(&t.name)) {
            plan.extend(self.reconcile_table(table, None, resolver)?);
        }

        for table in declared.iter().filter(|t| !to_create.contains(&t.name)) {
            let source = renames
                .iter()
                .find(|(_, to)| **to == table.name)
                .map(|(from, _)| from.clone())
                .unwrap_or_else(|| table.name.clone());

            let observed = self.inspector.table(&source).map(|mut observed| {
                observed.definition.name = table.name.clone();
                observed
            });
            match observed {
                Some(observed) => plan.extend(self.reconcile_table(table, Some(&observed), resolver)?),
                None => warn!(table = %source, "listed table could not be inspected"),
            }
        }

        for name in &to_drop {
            if let Some(observed) = self.inspector.table(name) {
                plan.push(Operation::DropTable {
                    table: observed.definition,
                });
            }
        }

        info!(operations = plan.len(), summary = %plan.summary(), "reconciled schema");
        Ok(plan)
    }

    /// Reconcile one declared table against its observed state.
    ///
    /// A missing table is created with everything declared.
    pub fn reconcile_table(
        &self,
        declared: &DeclaredTable,
        observed: Option<&ObservedTable>,
        resolver: &mut dyn RenameResolver,
    ) -> MigrateResult<Vec<Operation>> {
        let Some(observed) = observed else {
            debug!(table = %declared.name, "table absent, creating");
            return Ok(vec![Operation::CreateTable {
                table: TableDefinition::from_declared(declared),
            }]);
        };

        let table = declared.name.clone();
        let observed_columns: IndexMap<SmolStr, ObservedColumn> = observed
            .columns()
            .map(|c| (SmolStr::new(c.name()), c))
            .collect();

        let declared_names: Vec<SmolStr> = declared
            .fields
            .iter()
            .map(|f| SmolStr::new(f.name()))
            .collect();
        let observed_names: Vec<SmolStr> = observed_columns.keys().cloned().collect();

        let mut to_create = one_sided(&declared_names, &observed_names);
        let mut to_drop = one_sided(&observed_names, &declared_names);
        let renames = resolver.extract_renames(
            &mut to_create,
            &mut to_drop,
            ElementKind::Column,
            &format!("{table}."),
        )?;

        let mut index_drops = Vec::new();
        let mut index_adds = Vec::new();
        self.diff_indexes(declared, observed, &mut index_drops, &mut index_adds);

        let mut ops = index_drops;

        for (from, to) in &renames {
            ops.push(Operation::RenameColumn {
                table: table.clone(),
                from: from.clone(),
                to: to.clone(),
            });
        }

        for field in declared.fields.iter().filter(|f| to_create.iter().any(|n| n == f.name())) {
            ops.push(Operation::AddColumn {
                table: table.clone(),
                column: field.definition(),
            });
        }

        for field in &declared.fields {
            let name = field.name();
            let source = match renames.iter().find(|(_, to)| *to == name) {
                Some((from, _)) => from.as_str(),
                None => name,
            };
            let Some(column) = observed_columns.get(source) else {
                continue;
            };

            if field.different_to(column, &self.rules) {
                debug!(
                    table = %table,
                    column = name,
                    differences = ?field.differences(column, &self.rules),
                    "column differs"
                );
                ops.push(Operation::ChangeColumn {
                    table: table.clone(),
                    from: column.definition.renamed(name),
                    to: field.definition(),
                });
            }
        }

        for name in &to_drop {
            if let Some(column) = observed_columns.get(name) {
                ops.push(Operation::DropColumn {
                    table: table.clone(),
                    column: column.definition.clone(),
                });
            }
        }

        ops.extend(index_adds);
        Ok(ops)
    }

    /// Compare indexes by name. Changed indexes are dropped and re-added.
    fn diff_indexes(
        &self,
        declared: &DeclaredTable,
        observed: &ObservedTable,
        drops: &mut Vec<Operation>,
        adds: &mut Vec<Operation>,
    ) {
        let table = &declared.name;
        let observed_indexes: Vec<_> = observed
            .indexes()
            .filter(|i| !declared.ignored_indexes.contains(&i.name))
            .collect();

        for index in &observed_indexes {
            let keep = declared
                .index(&index.name)
                .is_some_and(|spec| !spec.different_to(index));
            if !keep {
                drops.push(Operation::DropIndex {
                    table: table.clone(),
                    index: (*index).clone(),
                });
            }
        }

        for spec in &declared.indexes {
            if declared.ignored_indexes.iter().any(|n| n == spec.name()) {
                continue;
            }
            let present = observed_indexes
                .iter()
                .any(|i| i.name == spec.name() && !spec.different_to(i));
            if !present {
                adds.push(Operation::AddIndex {
                    table: table.clone(),
                    index: spec.definition(),
                });
            }
        }
    }
}
