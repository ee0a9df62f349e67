//! Model declaration files (`schema.toml`).
//!
//! ```toml
//! [[model]]
//! name = "Post"
//! timestamps = true
//!
//! [[model.field]]
//! name = "title"
//! type = "string"
//! limit = 120
//! null = false
//! index = true
//!
//! [[model.belongs_to]]
//! name = "author"
//!
//! [[model.index]]
//! fields = ["author_id", "created_at"]
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::catalog::Catalog;
use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldOptions, IndexOption};
use crate::index::IndexOptions;
use crate::model::{BelongsToOptions, Model};
use crate::types::TypeRegistry;

fn default_true() -> bool {
    true
}

/// A parsed declaration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationFile {
    /// Model declarations, in definition order.
    #[serde(default, rename = "model")]
    pub models: Vec<ModelDecl>,
}

/// One `[[model]]` table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDecl {
    /// Model name.
    pub name: SmolStr,
    /// Explicit table name.
    #[serde(default)]
    pub table: Option<SmolStr>,
    /// Explicit primary key column.
    #[serde(default)]
    pub primary_key: Option<SmolStr>,
    /// Parent model; the model is stored in the parent's table.
    #[serde(default)]
    pub parent: Option<SmolStr>,
    /// Whether the model takes part in migrations.
    #[serde(default = "default_true")]
    pub include_in_migration: bool,
    /// Declare `created_at` and `updated_at`.
    #[serde(default)]
    pub timestamps: bool,
    /// Declare a list position column (`true` or a column name).
    #[serde(default)]
    pub acts_as_list: Option<ListOption>,
    /// Existing indexes to leave alone.
    #[serde(default)]
    pub ignore_indexes: Vec<SmolStr>,
    /// Field declarations.
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDecl>,
    /// `belongs_to` associations.
    #[serde(default)]
    pub belongs_to: Vec<BelongsToDecl>,
    /// Index declarations.
    #[serde(default, rename = "index")]
    pub indexes: Vec<IndexDecl>,
}

/// The `acts_as_list` setting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ListOption {
    /// `true` uses the default column.
    Enabled(bool),
    /// Use the named column.
    Column(SmolStr),
}

/// One `[[model.field]]` table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldDecl {
    /// Field name.
    pub name: SmolStr,
    /// Declared type.
    #[serde(rename = "type")]
    pub type_name: SmolStr,
    /// Remaining options.
    #[serde(flatten)]
    pub options: FieldOptions,
    /// Keys no option claimed. Rejected when the model is built.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

/// One `[[model.belongs_to]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BelongsToDecl {
    /// Association name.
    pub name: SmolStr,
    /// Also declare `<name>_type`.
    #[serde(default)]
    pub polymorphic: bool,
    /// Nullability of the foreign key.
    #[serde(default)]
    pub null: Option<bool>,
    /// `false` for no index, or an index name.
    #[serde(default)]
    pub index: Option<IndexOption>,
}

/// One `[[model.index]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IndexDecl {
    /// Indexed fields, in order.
    pub fields: Vec<SmolStr>,
    /// Whether the index is unique.
    #[serde(default)]
    pub unique: bool,
    /// Explicit index name.
    #[serde(default)]
    pub name: Option<SmolStr>,
}

impl DeclarationFile {
    /// Load a declaration file.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| SchemaError::TomlError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Parse declarations from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> SchemaResult<Self> {
        toml::from_str(content).map_err(|e| SchemaError::TomlError {
            path: "<string>".to_string(),
            source: e,
        })
    }

    /// Declare every model in a new catalog.
    pub fn into_catalog(self, types: TypeRegistry) -> SchemaResult<Catalog> {
        let mut catalog = Catalog::new(types);
        for decl in self.models {
            let model = decl.build(&mut catalog)?;
            catalog.define(model);
        }
        info!(models = catalog.len(), "loaded model declarations");
        Ok(catalog)
    }
}

impl ModelDecl {
    fn build(self, catalog: &mut Catalog) -> SchemaResult<Model> {
        let mut model = match &self.parent {
            Some(parent) => {
                if self.table.is_some() || self.primary_key.is_some() {
                    return Err(SchemaError::invalid_model(
                        &*self.name,
                        "a subclass is stored in its parent's table",
                    ));
                }
                if catalog.model(parent).is_none() {
                    return Err(SchemaError::invalid_model(
                        &*self.name,
                        format!("parent model `{parent}` must be declared first"),
                    ));
                }
                catalog.subclass(parent, self.name.clone())?
            }
            None => {
                let mut model = Model::new(self.name.clone());
                if let Some(table) = &self.table {
                    model = model.with_table_name(table.clone());
                }
                if let Some(primary_key) = &self.primary_key {
                    model = model.with_primary_key(primary_key.clone());
                }
                model
            }
        };
        model.set_include_in_migration(self.include_in_migration);

        let types = catalog.types();
        for field in self.fields {
            if let Some(key) = field.unknown.keys().next() {
                return Err(SchemaError::invalid_model(
                    &*self.name,
                    format!("field `{}` has unknown option `{key}`", field.name),
                ));
            }
            model.declare_field(field.name, field.type_name, field.options, types)?;
        }
        for assoc in self.belongs_to {
            let options = BelongsToOptions {
                polymorphic: assoc.polymorphic,
                null: assoc.null,
                index: assoc.index,
            };
            model.belongs_to(&assoc.name, options, types)?;
        }
        match &self.acts_as_list {
            Some(ListOption::Enabled(true)) => model.acts_as_list(None, types)?,
            Some(ListOption::Column(column)) => model.acts_as_list(Some(column.as_str()), types)?,
            Some(ListOption::Enabled(false)) | None => {}
        }
        if self.timestamps {
            model.timestamps(types)?;
        }
        for index in self.indexes {
            let mut options = IndexOptions::new().unique(index.unique);
            if let Some(name) = index.name {
                options = options.name(name);
            }
            model.declare_index(index.fields, options)?;
        }
        for name in self.ignore_indexes {
            model.ignore_index(name);
        }

        Ok(model)
    }
}

/// Load a declaration file into a catalog.
pub fn load_catalog(path: impl AsRef<Path>, types: TypeRegistry) -> SchemaResult<Catalog> {
    DeclarationFile::from_file(path)?.into_catalog(types)
}
