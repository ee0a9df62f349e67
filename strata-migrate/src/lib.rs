//! # strata-migrate
//!
//! Reconciliation engine for Strata.
//!
//! This crate provides functionality for:
//! - Inspecting the actual schema (a TOML snapshot stands in for the database)
//! - Reconciling declared models against it, table by table and column by column
//! - Resolving renames through a decision channel before anything is dropped
//! - Rendering up and down SQL scripts for PostgreSQL, MySQL and SQLite
//! - Migration file management and pending-migration detection
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────┐
//! │   Catalog    │────▶│   Reconciler   │────▶│ SQL Emitter │
//! └──────────────┘     └────────────────┘     └─────────────┘
//!                        ▲            │              │
//!                        │            ▼              ▼
//!               ┌────────────┐  ┌───────────┐  ┌─────────────┐
//!               │ Inspector  │  │  Renames  │  │ Migration   │
//!               │ (snapshot) │  │ (channel) │  │ files       │
//!               └────────────┘  └───────────┘  └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_migrate::{ForceDrop, MigrationGenerator, SchemaSnapshot};
//! use strata_schema::{Engine, TypeRegistry, load_catalog};
//!
//! async fn plan() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = load_catalog("schema.toml", TypeRegistry::new(Engine::Postgresql))?;
//!     let snapshot = SchemaSnapshot::load_or_empty("snapshot.toml", Engine::Postgresql).await?;
//!
//!     let generated = MigrationGenerator::new(&catalog, &snapshot).generate(&mut ForceDrop)?;
//!     println!("{}", generated.plan.summary());
//!     println!("{}", generated.script.up);
//!     Ok(())
//! }
//! ```
//!
//! ## Migration Files
//!
//! ```text
//! migrations/
//! ├── 20240115120000_strata_migration_1/
//! │   ├── up.sql
//! │   └── down.sql
//! └── 20240116090000_add_post_slugs/
//!     ├── up.sql
//!     └── down.sql
//! ```

pub mod error;
pub mod file;
pub mod generator;
pub mod inspect;
pub mod operation;
pub mod reconcile;
pub mod rename;
pub mod snapshot;
pub mod sql;

// Re-exports
pub use error::{MigrateResult, MigrationError};
pub use file::{MigrationFile, MigrationFileManager, normalize_name};
pub use generator::{GeneratedMigration, MigrationGenerator, ensure_no_pending, write_migration};
pub use inspect::{InspectionConfig, ObservedTable, SchemaInspector, TableDefinition};
pub use operation::{Operation, Plan};
pub use reconcile::Reconciler;
pub use rename::{
    Decision, DecisionChannel, ElementKind, ForceDrop, InteractiveResolver, KeepAll, PromptState,
    RenamePrompt, RenameResolver, ScriptedChannel, decide,
};
pub use snapshot::SchemaSnapshot;
pub use sql::{MigrationScript, SqlEmitter};
