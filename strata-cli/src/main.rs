//! Strata CLI - Command-line interface for Strata.

use clap::Parser;

use strata_cli::cli::{Cli, Command};
use strata_cli::commands;
use strata_cli::config::Project;
use strata_cli::error::CliResult;
use strata_cli::{logging, output};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        output::blank();
        output::failure(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let project = || Project::load(cli.config.as_deref());

    match cli.command {
        Command::Generate(args) => commands::generate::run(&project()?, args).await,
        Command::Diff(args) => commands::diff::run(&project()?, args).await,
        Command::Validate(args) => commands::validate::run(&project()?, args).await,
        Command::Version => commands::version::run().await,
    }
}
