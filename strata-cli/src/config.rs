//! CLI configuration handling.

use std::path::{Path, PathBuf};

use strata_migrate::InspectionConfig;
use strata_schema::StrataConfig;
use tracing::debug;

use crate::cli::SourceArgs;
use crate::error::{CliError, CliResult};

/// Default config file name (lives in project root)
pub const CONFIG_FILE_NAME: &str = "strata.toml";

/// A loaded configuration and the directory its paths are relative to.
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory relative paths are resolved against.
    pub root: PathBuf,
    /// The configuration.
    pub config: StrataConfig,
}

impl Project {
    /// Load the configuration.
    ///
    /// An explicit path must exist. Otherwise `strata.toml` in the current
    /// directory is used when present, and the defaults when not.
    pub fn load(explicit: Option<&Path>) -> CliResult<Self> {
        let cwd = std::env::current_dir()?;

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(CliError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => Some(cwd.join(CONFIG_FILE_NAME)).filter(|p| p.exists()),
        };

        match path {
            Some(path) => {
                debug!(path = %path.display(), "loading configuration");
                let config = StrataConfig::from_file(&path)?;
                let root = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or(cwd);
                Ok(Self { root, config })
            }
            None => {
                debug!("no configuration file, using defaults");
                Ok(Self {
                    root: cwd,
                    config: StrataConfig::default(),
                })
            }
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    /// Path of the model declaration file.
    pub fn schema_path(&self, source: &SourceArgs) -> PathBuf {
        source
            .schema
            .clone()
            .unwrap_or_else(|| self.resolve(&self.config.schema.path))
    }

    /// Path of the schema snapshot.
    pub fn snapshot_path(&self, source: &SourceArgs) -> PathBuf {
        source
            .snapshot
            .clone()
            .unwrap_or_else(|| self.resolve(&self.config.snapshot.path))
    }

    /// Directory migrations are written to.
    pub fn migrations_dir(&self) -> PathBuf {
        self.resolve(&self.config.migrations.directory)
    }

    /// Which observed tables take part in reconciliation.
    pub fn inspection_config(&self) -> InspectionConfig {
        InspectionConfig::new().exclude_tables(self.config.migrations.ignore_tables.iter().cloned())
    }
}
