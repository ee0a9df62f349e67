//! # Strata
//!
//! Declarative model fields, reconciled against the live schema.
//!
//! Strata provides:
//! - A declaration builder (and a TOML declaration file) for typed model fields and indexes
//! - Comparison of declared fields against observed columns, with engine quirks and type synonyms
//! - Reconciliation that asks before dropping anything that might have been renamed
//! - Up and down migration scripts for PostgreSQL, MySQL and SQLite
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strata::prelude::*;
//!
//! let mut catalog = Catalog::new(TypeRegistry::new(Engine::Postgresql));
//!
//! let mut post = Model::new("Post");
//! post.declare(catalog.types(), |f| {
//!     f.field("title", "string", FieldOptions::new().limit(120).null(false))?
//!         .column("body", "text")?
//!         .belongs_to("author", BelongsToOptions::new())?
//!         .timestamps()?;
//!     Ok(())
//! })?;
//! catalog.define(post);
//!
//! let snapshot = SchemaSnapshot::new(Engine::Postgresql);
//! let generated = MigrationGenerator::new(&catalog, &snapshot).generate(&mut ForceDrop)?;
//! println!("{}", generated.script.up);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Declarations, types and configuration.
pub mod schema {
    pub use strata_schema::*;
}

/// Inspection, reconciliation and migration output.
pub mod migrate {
    pub use strata_migrate::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::migrate::{
        ForceDrop, InteractiveResolver, KeepAll, MigrationGenerator, Operation, Plan,
        SchemaInspector, SchemaSnapshot, ScriptedChannel, SqlEmitter, TableDefinition,
    };
    pub use crate::schema::{
        BelongsToOptions, Catalog, ColumnDefinition, Engine, FieldOptions, IndexOptions, Model,
        StrataConfig, TypeRegistry, load_catalog,
    };
}

// Re-export key types at the crate root
pub use migrate::{MigrateResult, MigrationError};
pub use schema::{SchemaError, SchemaResult};
