//! `strata generate` command - Reconcile models and write a migration.

use strata_migrate::{
    ForceDrop, InteractiveResolver, MigrationError, MigrationFileManager, MigrationGenerator,
    RenameResolver, ensure_no_pending, normalize_name, write_migration,
};
use tracing::info;

use crate::cli::GenerateArgs;
use crate::commands::{load_declarations, load_snapshot};
use crate::config::Project;
use crate::error::{CliError, CliResult};
use crate::output::{self, success};
use crate::prompt::{self, Action};

/// Banner above the up script.
pub const UP_BANNER: &str = "---------- Up Migration ----------";

/// Banner above the down script.
pub const DOWN_BANNER: &str = "---------- Down Migration --------";

/// Run the generate command
pub async fn run(project: &Project, args: GenerateArgs) -> CliResult<()> {
    let catalog = load_declarations(project, &args.source)?;
    let snapshot_path = project.snapshot_path(&args.source);
    let mut snapshot = load_snapshot(project, &snapshot_path).await?;

    let files = MigrationFileManager::new(project.migrations_dir());
    match ensure_no_pending(&files, &snapshot).await {
        Ok(()) => {}
        Err(MigrationError::PendingMigrations(pending)) => {
            output::caution(&format!("You have {} pending migration(s):", pending.len()));
            for name in &pending {
                output::bullet(name);
            }
            return Err(CliError::Migration(
                "apply pending migrations before generating a new one".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    let mut terminal = prompt::stdio();

    let generated = {
        let generator =
            MigrationGenerator::new(&catalog, &snapshot).with_config(project.inspection_config());
        let mut force_drop = ForceDrop;
        let mut interactive = InteractiveResolver::new(&mut terminal);
        let resolver: &mut dyn RenameResolver = if args.force_drop {
            &mut force_drop
        } else {
            &mut interactive
        };
        generator.generate(resolver)?
    };

    if generated.is_empty() {
        output::note("Database and models match -- nothing to change");
        return Ok(());
    }

    output::blank();
    output::script(UP_BANNER, &generated.script.up);
    output::blank();
    output::script(DOWN_BANNER, &generated.script.down);
    output::blank();

    let action = if args.migrate {
        Action::Migrate
    } else if args.generate {
        Action::Generate
    } else {
        terminal.choose_action()?
    };

    if action == Action::Cancel {
        output::note("Cancelled, nothing written");
        return Ok(());
    }

    let prefix = &project.config.migrations.name_prefix;
    let name = match &args.name {
        Some(name) => normalize_name(&name.to_lowercase()).ok_or_else(|| {
            CliError::Validation(format!(
                "Invalid migration name '{name}': use lowercase letters, digits, '_' and spaces"
            ))
        })?,
        None if args.default_name => files.default_name(prefix).await?,
        None => {
            let default = files.default_name(prefix).await?;
            terminal.migration_name(&default)?
        }
    };
    let name = if name.is_empty() {
        files.default_name(prefix).await?
    } else {
        name
    };

    let apply = action == Action::Migrate;
    let file = write_migration(&files, &generated, &name, apply.then_some(&mut snapshot)).await?;
    success(&format!("Created migration {}", file.path.display()));

    if apply {
        snapshot.save(&snapshot_path).await?;
        success(&format!("Applied to {}", snapshot_path.display()));
    }

    info!(migration = %file.dir_name(), applied = apply, "migration written");
    Ok(())
}
