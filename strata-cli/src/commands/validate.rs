//! `strata validate` command - Check model declarations.

use strata_schema::Catalog;

use crate::cli::ValidateArgs;
use crate::commands::load_declarations;
use crate::config::Project;
use crate::error::CliResult;
use crate::output::{self, caution, success};

/// Run the validate command
pub async fn run(project: &Project, args: ValidateArgs) -> CliResult<()> {
    output::title("Validate Declarations");
    output::field("Schema", &project.schema_path(&args.source).display().to_string());
    output::blank();

    let catalog = load_declarations(project, &args.source)?;
    let warnings = check_catalog(&catalog);

    if warnings.is_empty() {
        success("Declarations are valid!");
    } else {
        success("Declarations are valid with warnings:");
        output::blank();
        for warning in &warnings {
            caution(warning);
        }
    }

    output::blank();
    output::section("Summary");
    let tables = catalog.tables();
    output::field("Models", &catalog.len().to_string());
    output::field("Tables", &tables.len().to_string());
    output::field(
        "Fields",
        &tables.iter().map(|t| t.fields.len()).sum::<usize>().to_string(),
    );
    output::field(
        "Indexes",
        &tables.iter().map(|t| t.indexes.len()).sum::<usize>().to_string(),
    );

    Ok(())
}

/// Things that are allowed but probably unintended.
fn check_catalog(catalog: &Catalog) -> Vec<String> {
    let mut warnings = Vec::new();

    if catalog.is_empty() {
        warnings.push("No models are declared".to_string());
    }

    for model in catalog.models() {
        if !model.include_in_migration() {
            warnings.push(format!(
                "Model '{}' is excluded from migrations; table '{}' is never touched",
                model.name(),
                model.table_name()
            ));
        } else if model.field_count() == 0 && model.parent().is_none() {
            warnings.push(format!("Model '{}' declares no fields", model.name()));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_schema::{FieldOptions, Model, TypeRegistry};

    #[test]
    fn test_check_catalog() {
        let mut catalog = Catalog::new(TypeRegistry::default());
        assert_eq!(check_catalog(&catalog), vec!["No models are declared".to_string()]);

        let mut post = Model::new("Post");
        post.declare(catalog.types(), |d| {
            d.field("title", "string", FieldOptions::new())?;
            Ok(())
        })
        .unwrap();
        catalog.define(post);
        catalog.define(Model::new("Legacy"));

        let warnings = check_catalog(&catalog);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Legacy"));
    }
}
