//! CLI command implementations.

pub mod diff;
pub mod generate;
pub mod validate;
pub mod version;

use std::path::Path;

use strata_migrate::SchemaSnapshot;
use strata_schema::{Catalog, load_catalog};
use tracing::debug;

use crate::cli::SourceArgs;
use crate::config::Project;
use crate::error::{CliError, CliResult};

/// Load the declared models.
pub(crate) fn load_declarations(project: &Project, source: &SourceArgs) -> CliResult<Catalog> {
    let path = project.schema_path(source);
    if !path.exists() {
        return Err(CliError::Config(format!(
            "Schema file not found: {}",
            path.display()
        )));
    }

    let catalog = load_catalog(&path, project.config.type_registry())?;
    debug!(path = %path.display(), models = catalog.len(), "loaded declarations");
    Ok(catalog)
}

/// Load the snapshot, or an empty one when none was written yet.
pub(crate) async fn load_snapshot(project: &Project, path: &Path) -> CliResult<SchemaSnapshot> {
    Ok(SchemaSnapshot::load_or_empty(path, project.config.database.provider).await?)
}
