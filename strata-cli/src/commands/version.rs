//! `strata version` command - Show the build and supported engines.

use strata_schema::{Engine, NativeTypes, TypeSynonyms};

use crate::error::CliResult;
use crate::output;

const ENGINES: [Engine; 3] = [Engine::Postgresql, Engine::Mysql, Engine::Sqlite];

/// Run the version command
pub async fn run() -> CliResult<()> {
    output::title(concat!("strata ", env!("CARGO_PKG_VERSION")));

    let profile = if cfg!(debug_assertions) { "debug" } else { "release" };
    output::field("Profile", profile);
    output::field("Schema", env!("CARGO_PKG_VERSION"));
    output::field("Migrate", env!("CARGO_PKG_VERSION"));
    output::blank();

    output::section("Engines");
    for engine in ENGINES {
        let types = NativeTypes::for_engine(engine);
        let names: Vec<&str> = types.names().collect();
        output::field(engine.as_str(), &names.join(", "));
    }
    output::blank();

    let synonyms: Vec<String> = TypeSynonyms::default()
        .groups()
        .iter()
        .map(|group| group.join(" = "))
        .collect();
    output::field("Synonyms", &synonyms.join("; "));

    Ok(())
}
