//! Integration tests for reconciliation.
//!
//! These tests drive declarations through a snapshot inspector and check
//! the operations, the rendered SQL and that applying a plan reaches a
//! fixed point.

use pretty_assertions::assert_eq;
use smol_str::SmolStr;
use strata::migrate::{Reconciler, RenameResolver};
use strata::prelude::*;
use strata::schema::IndexDefinition;

fn catalog(engine: Engine, declare: impl FnOnce(&mut Catalog)) -> Catalog {
    let mut catalog = Catalog::new(TypeRegistry::new(engine));
    declare(&mut catalog);
    catalog
}

fn posts_catalog(engine: Engine) -> Catalog {
    catalog(engine, |catalog| {
        let mut post = Model::new("Post");
        post.declare(catalog.types(), |f| {
            f.field("title", "string", FieldOptions::new().indexed())?
                .column("body", "text")?;
            Ok(())
        })
        .unwrap();
        catalog.define(post);
    })
}

fn plan_for(catalog: &Catalog, snapshot: &SchemaSnapshot, resolver: &mut dyn RenameResolver) -> Plan {
    Reconciler::new(snapshot, catalog.types().rules().clone())
        .reconcile(catalog, resolver)
        .unwrap()
}

#[test]
fn test_table_and_column_rename() {
    let catalog = posts_catalog(Engine::Postgresql);

    let mut snapshot = SchemaSnapshot::new(Engine::Postgresql);
    snapshot.insert_table(
        TableDefinition::new("articles", "id")
            .column(ColumnDefinition::new("title", "string").limit(255))
            .column(ColumnDefinition::new("content", "text"))
            .index(IndexDefinition {
                name: "index_articles_on_title".into(),
                columns: vec!["title".into()],
                unique: false,
            }),
    );

    let mut resolver = InteractiveResolver::new(ScriptedChannel::new(["posts", "body"]));
    let plan = plan_for(&catalog, &snapshot, &mut resolver);

    assert_eq!(
        plan.operations(),
        &[
            Operation::RenameTable {
                from: "articles".into(),
                to: "posts".into(),
            },
            Operation::DropIndex {
                table: "posts".into(),
                index: IndexDefinition {
                    name: "index_articles_on_title".into(),
                    columns: vec!["title".into()],
                    unique: false,
                },
            },
            Operation::RenameColumn {
                table: "posts".into(),
                from: "content".into(),
                to: "body".into(),
            },
            Operation::AddIndex {
                table: "posts".into(),
                index: IndexDefinition {
                    name: "index_posts_on_title".into(),
                    columns: vec!["title".into()],
                    unique: false,
                },
            },
        ]
    );
    assert_eq!(resolver.channel().remaining(), 0);

    let script = SqlEmitter::new(Engine::Postgresql).emit(&plan);
    assert_eq!(
        script.up,
        [
            "ALTER TABLE \"articles\" RENAME TO \"posts\";",
            "DROP INDEX \"index_articles_on_title\";",
            "ALTER TABLE \"posts\" RENAME COLUMN \"content\" TO \"body\";",
            "CREATE INDEX \"index_posts_on_title\" ON \"posts\" (\"title\");",
        ]
        .join("\n")
    );
    assert!(script.down.starts_with("DROP INDEX \"index_posts_on_title\";"));
    assert!(script.down.ends_with("ALTER TABLE \"posts\" RENAME TO \"articles\";"));

    snapshot.apply(&plan).unwrap();
    assert!(plan_for(&catalog, &snapshot, &mut ForceDrop).is_empty());
}

#[test]
fn test_created_schema_is_a_fixed_point() {
    for engine in [Engine::Postgresql, Engine::Mysql, Engine::Sqlite] {
        let catalog = catalog(engine, |catalog| {
            let mut order = Model::new("Order");
            order
                .declare(catalog.types(), |f| {
                    f.field("total", "decimal", FieldOptions::new().precision(10).scale(2))?
                        .field("state", "string", FieldOptions::new().limit(20).default_value("open"))?
                        .field("notes", "text", FieldOptions::new().default_value(""))?
                        .field("paid", "boolean", FieldOptions::new().null(false).default_value(false))?
                        .belongs_to("customer", BelongsToOptions::new())?
                        .timestamps()?;
                    Ok(())
                })
                .unwrap();
            catalog.define(order);
        });

        let mut snapshot = SchemaSnapshot::new(engine);
        let first = plan_for(&catalog, &snapshot, &mut ForceDrop);
        assert_eq!(first.len(), 1, "{engine}: {}", first.summary());

        snapshot.apply(&first).unwrap();
        assert!(plan_for(&catalog, &snapshot, &mut ForceDrop).is_empty(), "{engine}");
        assert!(plan_for(&catalog, &snapshot, &mut ForceDrop).is_empty(), "{engine}");
    }
}

#[test]
fn test_changed_index_is_dropped_and_readded() {
    let catalog = catalog(Engine::Sqlite, |catalog| {
        let mut user = Model::new("User");
        user.declare(catalog.types(), |f| {
            f.field("email", "string", FieldOptions::new().indexed().unique())?;
            Ok(())
        })
        .unwrap();
        catalog.define(user);
    });

    let existing = IndexDefinition {
        name: "index_users_on_email".into(),
        columns: vec!["email".into()],
        unique: false,
    };
    let mut snapshot = SchemaSnapshot::new(Engine::Sqlite);
    snapshot.insert_table(
        TableDefinition::new("users", "id")
            .column(ColumnDefinition::new("email", "string").limit(255))
            .index(existing.clone()),
    );

    let plan = plan_for(&catalog, &snapshot, &mut ForceDrop);
    assert_eq!(
        plan.operations(),
        &[
            Operation::DropIndex {
                table: "users".into(),
                index: existing,
            },
            Operation::AddIndex {
                table: "users".into(),
                index: IndexDefinition {
                    name: "index_users_on_email".into(),
                    columns: vec!["email".into()],
                    unique: true,
                },
            },
        ]
    );
}

#[test]
fn test_keep_all_never_drops() {
    let catalog = posts_catalog(Engine::Postgresql);

    let mut snapshot = SchemaSnapshot::new(Engine::Postgresql);
    snapshot.insert_table(
        TableDefinition::new("posts", "id")
            .column(ColumnDefinition::new("title", "string").limit(255))
            .column(ColumnDefinition::new("body", "text"))
            .column(ColumnDefinition::new("legacy", "integer"))
            .index(IndexDefinition {
                name: "index_posts_on_title".into(),
                columns: vec!["title".into()],
                unique: false,
            }),
    );
    snapshot.insert_table(TableDefinition::new("audit_log", "id"));

    assert!(plan_for(&catalog, &snapshot, &mut KeepAll).is_empty());

    let forced = plan_for(&catalog, &snapshot, &mut ForceDrop);
    assert_eq!(forced.len(), 2);
    assert!(forced.operations().iter().all(Operation::is_destructive));
}

#[test]
fn test_drop_confirmation_reprompts_until_exact() {
    let catalog = posts_catalog(Engine::Postgresql);

    let mut snapshot = SchemaSnapshot::new(Engine::Postgresql);
    snapshot.insert_table(
        TableDefinition::new("posts", "id")
            .column(ColumnDefinition::new("title", "string").limit(255))
            .column(ColumnDefinition::new("body", "text"))
            .column(ColumnDefinition::new("legacy", "integer"))
            .index(IndexDefinition {
                name: "index_posts_on_title".into(),
                columns: vec!["title".into()],
                unique: false,
            }),
    );

    let mut resolver =
        InteractiveResolver::new(ScriptedChannel::new(["drop it", "legacy", "drop legacy"]));
    let plan = plan_for(&catalog, &snapshot, &mut resolver);

    assert_eq!(
        plan.operations(),
        &[Operation::DropColumn {
            table: "posts".into(),
            column: ColumnDefinition::new("legacy", "integer"),
        }]
    );
    let channel = resolver.into_inner();
    assert_eq!(channel.asked().len(), 3);
    assert!(channel.asked().iter().all(|p| p.name == SmolStr::new("legacy")));
}

#[test]
fn test_engine_quirks_and_synonyms() {
    let catalog = catalog(Engine::Mysql, |catalog| {
        let mut page = Model::new("Page");
        page.declare(catalog.types(), |f| {
            f.field("body", "text", FieldOptions::new().default_value("empty"))?
                .field("published_at", "timestamp", FieldOptions::new().default_value("2024-01-02T03:04:05"))?;
            Ok(())
        })
        .unwrap();
        catalog.define(page);
    });

    let mut snapshot = SchemaSnapshot::new(Engine::Mysql);
    snapshot.insert_table(
        TableDefinition::new("pages", "id")
            .column(ColumnDefinition::new("body", "text"))
            .column(ColumnDefinition::new("published_at", "datetime").default_value("2024-01-02 03:04:05")),
    );

    assert!(plan_for(&catalog, &snapshot, &mut ForceDrop).is_empty());
}
