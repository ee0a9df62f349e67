//! `strata diff` command - Show what a migration would contain.

use strata_migrate::{ForceDrop, MigrationGenerator};

use crate::cli::DiffArgs;
use crate::commands::generate::{DOWN_BANNER, UP_BANNER};
use crate::commands::{load_declarations, load_snapshot};
use crate::config::Project;
use crate::error::CliResult;
use crate::output;

/// Run the diff command
///
/// One-sided names are reported as drops and creates; renames are only
/// offered by `generate`.
pub async fn run(project: &Project, args: DiffArgs) -> CliResult<()> {
    let catalog = load_declarations(project, &args.source)?;
    let snapshot = load_snapshot(project, &project.snapshot_path(&args.source)).await?;

    let generated = MigrationGenerator::new(&catalog, &snapshot)
        .with_config(project.inspection_config())
        .generate(&mut ForceDrop)?;

    if generated.is_empty() {
        output::note("Database and models match -- nothing to change");
        return Ok(());
    }

    output::title("Schema Diff");
    for operation in generated.plan.operations() {
        output::operation(operation);
    }
    output::blank();
    output::field("Summary", &generated.plan.summary());
    output::blank();

    output::script(UP_BANNER, &generated.script.up);
    if args.down {
        output::blank();
        output::script(DOWN_BANNER, &generated.script.down);
    }

    Ok(())
}
