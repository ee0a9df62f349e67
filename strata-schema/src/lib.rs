//! # strata-schema
//!
//! Declared fields, indexes and models for Strata.
//!
//! This crate provides:
//! - Native and rich column types, resolved per storage engine
//! - Field and index declarations with eager type resolution
//! - The comparison deciding whether a declared field differs from a column
//! - Per-model declaration registries and the application-wide catalog
//! - Parsers for `schema.toml` declarations and `strata.toml` configuration
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_schema::{Catalog, FieldOptions, Model, TypeRegistry};
//!
//! let mut catalog = Catalog::new(TypeRegistry::default());
//! let mut post = Model::new("Post");
//! post.declare(catalog.types(), |f| {
//!     f.field("title", "string", FieldOptions::new().limit(120))?
//!         .column("body", "markdown_string")?
//!         .timestamps()?;
//!     Ok(())
//! })?;
//! catalog.define(post);
//! ```

pub mod catalog;
pub mod column;
pub mod config;
pub mod decl;
pub mod error;
pub mod field;
pub mod index;
pub mod model;
pub mod quirks;
pub mod rich;
pub mod types;
pub mod value;

pub use catalog::{Catalog, DeclaredTable, ModelRef};
pub use column::{ColumnDefinition, ObservedColumn};
pub use config::StrataConfig;
pub use decl::{DeclarationFile, load_catalog};
pub use error::{SchemaError, SchemaResult};
pub use field::{FieldOptions, FieldSpec, IndexOption};
pub use index::{IndexDefinition, IndexOptions, IndexSpec, default_index_name};
pub use model::{BelongsToOptions, FieldDeclarations, Model};
pub use quirks::{Attribute, Quirk, QuirkTable};
pub use rich::{RichType, RichTypeRegistry};
pub use types::{
    ComparisonRules, Engine, NativeType, NativeTypes, PRIMARY_KEY_TYPE, TypeRegistry, TypeSynonyms,
};
pub use value::Value;
