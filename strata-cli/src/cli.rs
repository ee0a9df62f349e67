//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Strata CLI - declarative models, reconciled migrations
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "Strata CLI - declarative models, reconciled migrations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, env = "STRATA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a migration from the declared models
    Generate(GenerateArgs),

    /// Print the changes a migration would contain, without prompting
    Diff(DiffArgs),

    /// Check the model declarations
    Validate(ValidateArgs),

    /// Display version information
    Version,
}

/// Paths shared by the commands that read declarations and the snapshot
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Path to the model declaration file
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Path to the schema snapshot
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

/// Arguments for the `generate` command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Migration name (spaces become `_`)
    pub name: Option<String>,

    /// Drop one-sided tables and columns without asking about renames
    #[arg(long)]
    pub force_drop: bool,

    /// Use the default migration name without asking
    #[arg(long)]
    pub default_name: bool,

    /// Write the migration without asking
    #[arg(long, conflicts_with = "migrate")]
    pub generate: bool,

    /// Write the migration and apply it to the snapshot without asking
    #[arg(long)]
    pub migrate: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Arguments for the `diff` command
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Also print the down script
    #[arg(long)]
    pub down: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_flags() {
        let cli = Cli::parse_from([
            "strata",
            "generate",
            "add slugs",
            "--force-drop",
            "--migrate",
            "--schema",
            "models.toml",
        ]);
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.name.as_deref(), Some("add slugs"));
                assert!(args.force_drop);
                assert!(args.migrate);
                assert!(!args.generate);
                assert_eq!(args.source.schema, Some(PathBuf::from("models.toml")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_generate_and_migrate_conflict() {
        assert!(Cli::try_parse_from(["strata", "generate", "--generate", "--migrate"]).is_err());
    }
}
