//! On-disk layout of generated migrations.
//!
//! Every migration gets a directory named `<id>_<name>`, where the id is a
//! UTC timestamp. It holds `up.sql` and, when there is anything to undo,
//! `down.sql`. Directories without an `up.sql` are ignored.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{MigrateResult, MigrationError};
use crate::sql::MigrationScript;

const UP_FILE: &str = "up.sql";
const DOWN_FILE: &str = "down.sql";
const ID_FORMAT: &str = "%Y%m%d%H%M%S";
const ID_LEN: usize = 14;

/// One migration, either freshly generated or read back from disk.
#[derive(Debug, Clone)]
pub struct MigrationFile {
    /// Directory holding the scripts. Empty until written or read.
    pub path: PathBuf,
    /// Timestamp id.
    pub id: String,
    pub name: String,
    pub script: MigrationScript,
    /// Hex SHA-256 of the up script.
    pub checksum: String,
}

impl MigrationFile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, script: MigrationScript) -> Self {
        Self {
            path: PathBuf::new(),
            id: id.into(),
            name: name.into(),
            checksum: sha256_hex(&script.up),
            script,
        }
    }

    /// Attach the directory this migration lives in.
    pub fn at(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// `<id>_<name>`. This is also what a snapshot records as applied.
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.id, self.name)
    }
}

fn sha256_hex(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Reads and writes migration directories under one root.
pub struct MigrationFileManager {
    root: PathBuf,
}

impl MigrationFileManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Id for a migration created now.
    pub fn new_id(&self) -> String {
        Utc::now().format(ID_FORMAT).to_string()
    }

    /// Every readable migration, oldest first. A missing root is empty.
    ///
    /// Directories that look like migrations but cannot be read are logged
    /// and skipped.
    pub async fn scan(&self) -> MigrateResult<Vec<MigrationFile>> {
        if !tokio::fs::try_exists(&self.root).await? {
            return Ok(Vec::new());
        }

        let mut dirs = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let dir = entry.path();
            if dir.is_dir() && tokio::fs::try_exists(dir.join(UP_FILE)).await? {
                dirs.push(dir);
            }
        }
        // Ids are fixed-width timestamps, so name order is creation order.
        dirs.sort();

        let mut found = Vec::with_capacity(dirs.len());
        for dir in dirs {
            match load(&dir).await {
                Ok(file) => found.push(file),
                Err(e) => warn!(dir = %dir.display(), error = %e, "ignoring unreadable migration"),
            }
        }
        Ok(found)
    }

    /// Write `file` into a new directory and return its path. Refuses to
    /// overwrite an existing migration.
    pub async fn store(&self, file: &MigrationFile) -> MigrateResult<PathBuf> {
        let dir = self.root.join(file.dir_name());
        if tokio::fs::try_exists(&dir).await? {
            return Err(MigrationError::migration_file(format!(
                "refusing to overwrite {}",
                dir.display()
            )));
        }

        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(UP_FILE), &file.script.up).await?;
        if !file.script.down.is_empty() {
            tokio::fs::write(dir.join(DOWN_FILE), &file.script.down).await?;
        }

        debug!(dir = %dir.display(), checksum = %file.checksum, "stored migration");
        Ok(dir)
    }

    /// `<prefix>_<n>`, with `n` one above the highest number already used
    /// after that prefix.
    pub async fn default_name(&self, prefix: &str) -> MigrateResult<String> {
        let highest = self
            .scan()
            .await?
            .iter()
            .filter_map(|m| m.name.strip_prefix(prefix)?.strip_prefix('_')?.parse::<u32>().ok())
            .max()
            .unwrap_or(0);

        Ok(format!("{prefix}_{}", highest + 1))
    }

    /// Migrations on disk whose directory name is not in `applied`.
    pub async fn pending(&self, applied: &[String]) -> MigrateResult<Vec<MigrationFile>> {
        let mut files = self.scan().await?;
        files.retain(|m| !applied.contains(&m.dir_name()));
        Ok(files)
    }
}

async fn load(dir: &Path) -> MigrateResult<MigrationFile> {
    let dir_name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MigrationError::migration_file("directory name is not UTF-8"))?;
    let (id, name) = split_dir_name(dir_name)?;

    let up = tokio::fs::read_to_string(dir.join(UP_FILE)).await?;
    let down_path = dir.join(DOWN_FILE);
    let down = if tokio::fs::try_exists(&down_path).await? {
        tokio::fs::read_to_string(&down_path).await?
    } else {
        String::new()
    };

    Ok(MigrationFile::new(id, name, MigrationScript { up, down }).at(dir))
}

/// Split `<id>_<name>`, checking the id is a timestamp.
fn split_dir_name(dir_name: &str) -> MigrateResult<(&str, &str)> {
    let (id, name) = dir_name.split_once('_').ok_or_else(|| {
        MigrationError::migration_file(format!("'{dir_name}' has no '<id>_' prefix"))
    })?;

    if id.len() != ID_LEN || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MigrationError::migration_file(format!(
            "'{id}' is not a {ID_LEN}-digit timestamp"
        )));
    }
    Ok((id, name))
}

/// Turn a typed migration name into a directory-safe one.
///
/// Accepts lowercase letters, digits, `_` and spaces; spaces become `_`.
/// Returns `None` for anything else.
pub fn normalize_name(input: &str) -> Option<String> {
    let input = input.trim();
    input
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == ' ')
        .then(|| input.replace(' ', "_"))
}
