use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use markup::{NoComponents, TreeBuilderConfig, parse};
use reconciler::{Component, ContextId, Engine, Registry, RenderError};

const SMALL_ROWS: usize = 64;
const LARGE_ROWS: usize = 5_000;
const DEEP_LEVELS: usize = 500;

struct Table {
    rows: usize,
    revision: usize,
}

impl Component for Table {
    fn render(&self) -> Result<String, RenderError> {
        Ok(make_table(self.rows, self.revision))
    }
}

struct Deep {
    levels: usize,
    leaf: usize,
}

impl Component for Deep {
    fn render(&self) -> Result<String, RenderError> {
        let mut out = String::with_capacity(self.levels * 12);
        for _ in 0..self.levels {
            out.push_str("<div>");
        }
        out.push_str(&self.leaf.to_string());
        for _ in 0..self.levels {
            out.push_str("</div>");
        }
        Ok(out)
    }
}

/// One row in every 16 changes its class and one in every 64 its text per revision.
fn make_table(rows: usize, revision: usize) -> String {
    let mut out = String::with_capacity(rows * 64);
    out.push_str("<table>");
    for row in 0..rows {
        let class = if row % 16 == 0 { revision % 2 } else { 0 };
        let text = if row % 64 == 0 { revision } else { 0 };
        out.push_str(&format!(
            r#"<tr class="r{class}"><td>{row}</td><td>{text}</td></tr>"#
        ));
    }
    out.push_str("</table>");
    out
}

fn mounted_table(rows: usize) -> (Engine, reconciler::ComponentId) {
    let mut engine = Engine::new(Registry::new());
    let id = engine
        .mount(Box::new(Table { rows, revision: 0 }), ContextId::default())
        .expect("mount failed");
    (engine, id)
}

fn bump(engine: &mut Engine, id: reconciler::ComponentId) {
    if let Some(table) = engine
        .component_mut(id)
        .and_then(|c| c.downcast_mut::<Table>())
    {
        table.revision += 1;
    }
}

fn bench_parse_large(c: &mut Criterion) {
    let input = make_table(LARGE_ROWS, 0);
    let config = TreeBuilderConfig::default();
    c.bench_function("bench_parse_large", |b| {
        b.iter(|| {
            let tree = parse(black_box(&input), &NoComponents, &config).expect("parse failed");
            black_box(tree);
        });
    });
}

fn bench_synchronize_unchanged_small(c: &mut Criterion) {
    let (mut engine, id) = mounted_table(SMALL_ROWS);
    c.bench_function("bench_synchronize_unchanged_small", |b| {
        b.iter(|| {
            let records = engine.synchronize(black_box(id)).expect("synchronize failed");
            black_box(records);
        });
    });
}

fn bench_synchronize_unchanged_large(c: &mut Criterion) {
    let (mut engine, id) = mounted_table(LARGE_ROWS);
    c.bench_function("bench_synchronize_unchanged_large", |b| {
        b.iter(|| {
            let records = engine.synchronize(black_box(id)).expect("synchronize failed");
            black_box(records);
        });
    });
}

fn bench_synchronize_scattered_changes(c: &mut Criterion) {
    let (mut engine, id) = mounted_table(LARGE_ROWS);
    c.bench_function("bench_synchronize_scattered_changes", |b| {
        b.iter(|| {
            bump(&mut engine, id);
            let records = engine.synchronize(black_box(id)).expect("synchronize failed");
            black_box(records);
        });
    });
}

fn bench_mount_large(c: &mut Criterion) {
    c.bench_function("bench_mount_large", |b| {
        b.iter_batched(
            || Engine::new(Registry::new()),
            |mut engine| {
                let id = engine
                    .mount(
                        Box::new(Table {
                            rows: LARGE_ROWS,
                            revision: 0,
                        }),
                        ContextId::default(),
                    )
                    .expect("mount failed");
                black_box((engine, id));
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_synchronize_deep_leaf_change(c: &mut Criterion) {
    let mut engine = Engine::new(Registry::new());
    let id = engine
        .mount(
            Box::new(Deep {
                levels: DEEP_LEVELS,
                leaf: 0,
            }),
            ContextId::default(),
        )
        .expect("mount failed");
    c.bench_function("bench_synchronize_deep_leaf_change", |b| {
        b.iter(|| {
            if let Some(deep) = engine.component_mut(id).and_then(|c| c.downcast_mut::<Deep>()) {
                deep.leaf += 1;
            }
            let records = engine.synchronize(black_box(id)).expect("synchronize failed");
            black_box(records);
        });
    });
}

criterion_group!(
    benches,
    bench_parse_large,
    bench_synchronize_unchanged_small,
    bench_synchronize_unchanged_large,
    bench_synchronize_scattered_changes,
    bench_mount_large,
    bench_synchronize_deep_leaf_change
);
criterion_main!(benches);
