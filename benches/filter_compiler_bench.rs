use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use needproperty::{query, BaseEntity, Catalog, ConditionTree, FilterCompiler};
use std::hint::black_box;

fn key_value(key: &str, op: &str, value: &str) -> ConditionTree {
    ConditionTree::new("key_value")
        .with_attr("key", key)
        .with_attr("op", op)
        .with_attr("value", value)
}

fn simple_document() -> ConditionTree {
    ConditionTree::new("distro").with_child(
        ConditionTree::new("distro_arch")
            .with_attr("op", "=")
            .with_attr("value", "x86_64"),
    )
}

fn medium_document() -> ConditionTree {
    ConditionTree::new("distro").with_child(
        ConditionTree::new("and")
            .with_child(
                ConditionTree::new("distro_arch")
                    .with_attr("op", "=")
                    .with_attr("value", "x86_64"),
            )
            .with_child(
                ConditionTree::new("distro_family")
                    .with_attr("op", "=")
                    .with_attr("value", "Fedora"),
            )
            .with_child(
                ConditionTree::new("distro_tag")
                    .with_attr("op", "=")
                    .with_attr("value", "RELEASED"),
            ),
    )
}

fn complex_document() -> ConditionTree {
    ConditionTree::new("host").with_child(
        ConditionTree::new("and")
            .with_child(
                ConditionTree::new("or")
                    .with_child(key_value("CPUFLAGS", "==", "vmx"))
                    .with_child(key_value("CPUFLAGS", "==", "svm")),
            )
            .with_child(key_value("MEMORY", ">=", "4096"))
            .with_child(key_value("DISKSPACE", ">", "500"))
            .with_child(ConditionTree::new("power")),
    )
}

fn benchmark_compile(c: &mut Criterion) {
    let documents = vec![
        ("simple", simple_document()),
        ("medium", medium_document()),
        ("complex", complex_document()),
    ];

    let mut group = c.benchmark_group("filter_compiler");
    let compiler = FilterCompiler::new(Catalog::default());

    for (name, document) in &documents {
        group.bench_with_input(BenchmarkId::new("compile", name), document, |b, doc| {
            b.iter(|| {
                let filter = compiler.compile(black_box(doc)).expect("compile");
                black_box(filter)
            })
        });
    }

    group.finish();
}

fn benchmark_end_to_end(c: &mut Criterion) {
    let documents = vec![
        ("simple", simple_document()),
        ("medium", medium_document()),
        ("complex", complex_document()),
    ];

    let mut group = c.benchmark_group("end_to_end");
    let compiler = FilterCompiler::new(Catalog::default());

    for (name, document) in &documents {
        group.bench_with_input(
            BenchmarkId::new("compile_apply_render", name),
            document,
            |b, doc| {
                b.iter(|| {
                    let entity = BaseEntity::of_root(doc.name());
                    let filter = compiler.compile(black_box(doc)).expect("compile");
                    let select =
                        query::apply(query::base_query(compiler.catalog(), entity), &filter);
                    black_box(query::render(&select))
                })
            },
        );
    }

    group.finish();
}

fn benchmark_deep_nesting(c: &mut Criterion) {
    // Alternating and/or chains exercise the composer and the depth guard's
    // bookkeeping without tripping it.
    let depths = [8usize, 16, 32];
    let mut group = c.benchmark_group("deep_nesting");
    let compiler = FilterCompiler::new(Catalog::default());

    for depth in depths {
        let document = (0..depth).fold(key_value("CPUFLAGS", "==", "vmx"), |inner, level| {
            let name = if level % 2 == 0 { "and" } else { "or" };
            ConditionTree::new(name).with_child(inner)
        });
        let document = ConditionTree::new("host").with_child(document);

        group.bench_with_input(BenchmarkId::new("compile", depth), &document, |b, doc| {
            b.iter(|| {
                let filter = compiler.compile(black_box(doc)).expect("compile");
                black_box(filter)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_compile,
    benchmark_end_to_end,
    benchmark_deep_nesting
);
criterion_main!(benches);
