//! Project settings read from `strata.toml`.
//!
//! Every section and key is optional. `${NAME}` anywhere in the file is
//! replaced by the environment variable `NAME` before parsing; unset
//! variables stay as written.

use regex_lite::{Captures, Regex};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::error::{SchemaError, SchemaResult};
use crate::types::{Engine, TypeRegistry, TypeSynonyms};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrataConfig {
    pub database: DatabaseConfig,
    pub schema: SchemaConfig,
    pub snapshot: SnapshotConfig,
    pub migrations: MigrationConfig,
    pub types: TypesConfig,
}

impl StrataConfig {
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::IoError {
            path: origin.clone(),
            source,
        })?;
        Self::parse_named(&content, origin)
    }

    fn parse_named(content: &str, origin: String) -> SchemaResult<Self> {
        toml::from_str(&expand_env_vars(content)?)
            .map_err(|source| SchemaError::TomlError { path: origin, source })
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database.url.as_deref()
    }

    /// Type registry for the configured engine, with any extra synonym
    /// groups layered over the built-in ones.
    pub fn type_registry(&self) -> TypeRegistry {
        let synonyms = self.types.synonyms.iter().fold(TypeSynonyms::default(), |mut acc, group| {
            acc.add_group(group.iter().map(String::as_str));
            acc
        });
        TypeRegistry::new(self.database.provider).with_synonyms(synonyms)
    }
}

impl FromStr for StrataConfig {
    type Err = SchemaError;

    fn from_str(content: &str) -> SchemaResult<Self> {
        Self::parse_named(content, "<string>".to_string())
    }
}

/// `[database]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Engine whose types and quirks apply. Defaults to PostgreSQL.
    pub provider: Engine,
    pub url: Option<String>,
}

/// `[schema]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    /// Model declaration file, relative to the project root.
    pub path: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self { path: "schema.toml".into() }
    }
}

/// `[snapshot]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Recorded shape of the live database.
    pub path: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { path: "snapshot.toml".into() }
    }
}

/// `[migrations]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrationConfig {
    pub directory: String,
    /// Generated names are `<name_prefix>_<n>`.
    pub name_prefix: String,
    /// Tables the reconciler never looks at.
    pub ignore_tables: Vec<String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            directory: "./migrations".into(),
            name_prefix: "strata_migration".into(),
            ignore_tables: vec!["schema_migrations".into()],
        }
    }
}

/// `[types]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypesConfig {
    /// Extra groups of type names that compare equal.
    pub synonyms: Vec<Vec<String>>,
}

fn expand_env_vars(content: &str) -> SchemaResult<String> {
    let placeholder = Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| SchemaError::config(format!("bad placeholder pattern: {e}")))?;

    Ok(placeholder
        .replace_all(content, |cap: &Captures<'_>| {
            std::env::var(&cap[1]).unwrap_or_else(|_| cap[0].to_owned())
        })
        .into_owned())
}
