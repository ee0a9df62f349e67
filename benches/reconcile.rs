//! Benchmarks for field comparison, reconciliation and SQL rendering.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use strata::migrate::Reconciler;
use strata::prelude::*;
use strata::schema::ObservedColumn;

/// A catalog with `models` tables of ten columns each.
fn wide_catalog(engine: Engine, models: usize) -> Catalog {
    let mut catalog = Catalog::new(TypeRegistry::new(engine));
    for i in 0..models {
        let mut model = Model::new(format!("Model{i}"));
        model
            .declare(catalog.types(), |f| {
                f.field("name", "string", FieldOptions::new().limit(120).null(false).indexed())?
                    .field("price", "decimal", FieldOptions::new().precision(10).scale(2))?
                    .field("state", "string", FieldOptions::new().default_value("draft"))?
                    .column("body", "text")?
                    .column("quantity", "integer")?
                    .column("active", "boolean")?
                    .column("published_at", "timestamp")?
                    .belongs_to("owner", BelongsToOptions::new())?
                    .timestamps()?;
                Ok(())
            })
            .expect("valid declarations");
        catalog.define(model);
    }
    catalog
}

fn applied_snapshot(catalog: &Catalog) -> SchemaSnapshot {
    let engine = catalog.types().engine();
    let mut snapshot = SchemaSnapshot::new(engine);
    let plan = Reconciler::new(&snapshot, catalog.types().rules().clone())
        .reconcile(catalog, &mut ForceDrop)
        .expect("reconcile");
    snapshot.apply(&plan).expect("apply");
    snapshot
}

/// Benchmark comparing one declared field with its observed column.
fn bench_field_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_comparison");

    for engine in [Engine::Postgresql, Engine::Mysql, Engine::Sqlite] {
        let catalog = wide_catalog(engine, 1);
        let tables = catalog.tables();
        let rules = catalog.types().rules();

        for name in ["name", "price", "published_at"] {
            let Some(field) = tables[0].field(name) else {
                continue;
            };
            let column = ObservedColumn::new(engine, field.definition());
            group.bench_with_input(
                BenchmarkId::new(engine.as_str(), name),
                &column,
                |b, column| b.iter(|| black_box(field.different_to(black_box(column), rules))),
            );
        }
    }

    group.finish();
}

/// Benchmark reconciling declarations that already match.
fn bench_reconcile_unchanged(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_unchanged");

    for models in [1, 10, 50] {
        let catalog = wide_catalog(Engine::Postgresql, models);
        let snapshot = applied_snapshot(&catalog);

        group.throughput(Throughput::Elements(models as u64));
        group.bench_with_input(BenchmarkId::from_parameter(models), &models, |b, _| {
            b.iter(|| {
                let plan = Reconciler::new(&snapshot, catalog.types().rules().clone())
                    .reconcile(black_box(&catalog), &mut ForceDrop)
                    .expect("reconcile");
                black_box(plan)
            })
        });
    }

    group.finish();
}

/// Benchmark reconciling against an empty database and rendering the script.
fn bench_create_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_and_render");

    for engine in [Engine::Postgresql, Engine::Mysql, Engine::Sqlite] {
        let catalog = wide_catalog(engine, 10);
        let snapshot = SchemaSnapshot::new(engine);
        let emitter = SqlEmitter::new(engine);

        group.bench_function(engine.as_str(), |b| {
            b.iter(|| {
                let plan = Reconciler::new(&snapshot, catalog.types().rules().clone())
                    .reconcile(&catalog, &mut ForceDrop)
                    .expect("reconcile");
                black_box(emitter.emit(&plan))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_field_comparison,
    bench_reconcile_unchanged,
    bench_create_and_render,
);

criterion_main!(benches);
