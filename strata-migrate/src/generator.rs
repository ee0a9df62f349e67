//! Migration generation: reconcile, render and write.

use strata_schema::{Catalog, Engine};
use tracing::info;

use crate::error::{MigrateResult, MigrationError};
use crate::file::{MigrationFile, MigrationFileManager};
use crate::inspect::{InspectionConfig, SchemaInspector};
use crate::operation::Plan;
use crate::reconcile::Reconciler;
use crate::rename::RenameResolver;
use crate::snapshot::SchemaSnapshot;
use crate::sql::{MigrationScript, SqlEmitter};

/// The outcome of one reconciliation run.
#[derive(Debug, Clone)]
pub struct GeneratedMigration {
    /// Operations in execution order.
    pub plan: Plan,
    /// Rendered up and down scripts.
    pub script: MigrationScript,
}

impl GeneratedMigration {
    /// Check whether declarations and database already match.
    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    /// Package the scripts as a migration file.
    pub fn to_file(&self, id: impl Into<String>, name: impl Into<String>) -> MigrationFile {
        MigrationFile::new(id, name, self.script.clone())
    }
}

/// Drives reconciliation for a catalog against an inspected schema.
pub struct MigrationGenerator<'a, I: SchemaInspector + ?Sized> {
    catalog: &'a Catalog,
    reconciler: Reconciler<'a, I>,
    emitter: SqlEmitter,
}

impl<'a, I: SchemaInspector + ?Sized> MigrationGenerator<'a, I> {
    /// Create a generator.
    pub fn new(catalog: &'a Catalog, inspector: &'a I) -> Self {
        Self {
            catalog,
            reconciler: Reconciler::new(inspector, catalog.types().rules().clone()),
            emitter: SqlEmitter::new(inspector.engine()),
        }
    }

    /// Set which observed tables take part.
    pub fn with_config(mut self, config: InspectionConfig) -> Self {
        self.reconciler = self.reconciler.with_config(config);
        self
    }

    /// Engine the scripts are rendered for.
    pub fn engine(&self) -> Engine {
        self.emitter.engine()
    }

    /// Reconcile and render.
    pub fn generate(&self, resolver: &mut dyn RenameResolver) -> MigrateResult<GeneratedMigration> {
        let plan = self.reconciler.reconcile(self.catalog, resolver)?;
        let script = self.emitter.emit(&plan);
        info!(summary = %plan.summary(), "generated migration");
        Ok(GeneratedMigration { plan, script })
    }
}

/// Fail when migrations exist on disk that were never applied.
pub async fn ensure_no_pending(
    files: &MigrationFileManager,
    snapshot: &SchemaSnapshot,
) -> MigrateResult<()> {
    let pending = files.pending(&snapshot.applied).await?;
    if pending.is_empty() {
        Ok(())
    } else {
        Err(MigrationError::PendingMigrations(
            pending.iter().map(MigrationFile::dir_name).collect(),
        ))
    }
}

/// Write a generated migration. A given snapshot is brought up to date
/// with it and records it as applied.
pub async fn write_migration(
    files: &MigrationFileManager,
    generated: &GeneratedMigration,
    name: &str,
    snapshot: Option<&mut SchemaSnapshot>,
) -> MigrateResult<MigrationFile> {
    let file = generated.to_file(files.new_id(), name);
    let path = files.store(&file).await?;
    let file = file.at(path);

    if let Some(snapshot) = snapshot {
        snapshot.apply(&generated.plan)?;
        snapshot.record_applied(file.dir_name());
    }

    Ok(file)
}
