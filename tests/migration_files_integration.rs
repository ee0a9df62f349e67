//! Integration tests for the snapshot and migration directory round trip.
//!
//! These drive the same async path `strata generate --apply` takes: load the
//! snapshot, generate, write the migration, save the snapshot, and generate
//! again against what was saved.

use pretty_assertions::assert_eq;
use strata::MigrationError;
use strata::migrate::{MigrationFileManager, ensure_no_pending, write_migration};
use strata::prelude::*;
use tempfile::TempDir;

const SNAPSHOT: &str = r#"
engine = "postgresql"
applied = []

[[table]]
name = "posts"

[[table.column]]
name = "title"
type = "string"
limit = 255
null = false

[[table.column]]
name = "views"
type = "integer"
"#;

fn catalog() -> Catalog {
    let mut catalog = Catalog::new(TypeRegistry::new(Engine::Postgresql));
    let mut post = Model::new("Post");
    post.declare(catalog.types(), |f| {
        f.field("title", "string", FieldOptions::new().null(false))?
            .column("body", "text")?
            .field("views", "integer", FieldOptions::new().limit(8))?;
        Ok(())
    })
    .unwrap();
    catalog.define(post);
    catalog
}

#[tokio::test]
async fn test_generate_apply_and_reload() {
    let dir = TempDir::new().unwrap();
    let snapshot_path = dir.path().join("db/snapshot.toml");
    tokio::fs::create_dir_all(dir.path().join("db")).await.unwrap();
    tokio::fs::write(&snapshot_path, SNAPSHOT).await.unwrap();
    let files = MigrationFileManager::new(dir.path().join("migrations"));
    let catalog = catalog();

    let mut snapshot = SchemaSnapshot::load(&snapshot_path).await.unwrap();
    ensure_no_pending(&files, &snapshot).await.unwrap();

    let generated = MigrationGenerator::new(&catalog, &snapshot)
        .generate(&mut ForceDrop)
        .unwrap();
    let ops: Vec<String> = generated.plan.operations().iter().map(Operation::describe).collect();
    assert_eq!(ops, vec!["add column posts.body", "change column posts.views"]);
    assert_eq!(
        generated.script.up,
        "ALTER TABLE \"posts\" ADD COLUMN \"body\" TEXT;\n\
         ALTER TABLE \"posts\" ALTER COLUMN \"views\" TYPE BIGINT;"
    );

    let name = files.default_name("strata_migration").await.unwrap();
    let file = write_migration(&files, &generated, &name, Some(&mut snapshot))
        .await
        .unwrap();
    snapshot.save(&snapshot_path).await.unwrap();

    let up = tokio::fs::read_to_string(file.path.join("up.sql")).await.unwrap();
    let down = tokio::fs::read_to_string(file.path.join("down.sql")).await.unwrap();
    assert_eq!(up, generated.script.up);
    assert_eq!(down, generated.script.down);
    assert!(file.dir_name().ends_with("_strata_migration_1"));

    let saved: toml::Value = toml::from_str(
        &tokio::fs::read_to_string(&snapshot_path).await.unwrap(),
    )
    .unwrap();
    let applied = saved["applied"].as_array().unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].as_str(), Some(file.dir_name().as_str()));

    let reloaded = SchemaSnapshot::load(&snapshot_path).await.unwrap();
    assert_eq!(reloaded, snapshot);
    ensure_no_pending(&files, &reloaded).await.unwrap();

    let again = MigrationGenerator::new(&catalog, &reloaded)
        .generate(&mut ForceDrop)
        .unwrap();
    assert!(again.is_empty());
    assert!(again.script.is_empty());
    assert_eq!(files.default_name("strata_migration").await.unwrap(), "strata_migration_2");
}

#[tokio::test]
async fn test_unapplied_migration_blocks_the_next_one() {
    let dir = TempDir::new().unwrap();
    let snapshot_path = dir.path().join("snapshot.toml");
    let files = MigrationFileManager::new(dir.path().join("migrations"));
    let catalog = catalog();

    let snapshot = SchemaSnapshot::load_or_empty(&snapshot_path, Engine::Postgresql)
        .await
        .unwrap();
    assert!(snapshot.tables.is_empty());

    let generated = MigrationGenerator::new(&catalog, &snapshot)
        .generate(&mut ForceDrop)
        .unwrap();
    assert!(generated.script.up.starts_with("CREATE TABLE \"posts\""));
    write_migration(&files, &generated, "create_posts", None)
        .await
        .unwrap();

    let err = ensure_no_pending(&files, &snapshot).await.unwrap_err();
    match err {
        MigrationError::PendingMigrations(names) => {
            assert_eq!(names.len(), 1);
            assert!(names[0].ends_with("_create_posts"));
        }
        other => panic!("expected pending migrations, got {other:?}"),
    }
}
