use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use morph_bench::{Engine, ExecutionMode, Operator, Shape, Strategy, StructuringElement};

mod common;

fn bench_strategies_sequential(c: &mut Criterion) {
    let image = common::synthetic_batch(400, 400, 1).remove(0);
    let engine = Engine::default();
    let mut group = c.benchmark_group("erode_400x400_sequential");

    for radius in [1, 3, 5] {
        let se = StructuringElement::build(Shape::Disk, radius);
        for strategy in Strategy::ALL {
            group.bench_with_input(
                BenchmarkId::new(strategy.name(), format!("disk{}", radius)),
                &se,
                |b, se| {
                    b.iter(|| {
                        engine
                            .erode(black_box(&image), se, strategy, ExecutionMode::Sequential)
                            .unwrap()
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_strategies_parallel(c: &mut Criterion) {
    let image = common::synthetic_batch(1024, 1024, 1).remove(0);
    let engine = Engine::default();
    let se = StructuringElement::build(Shape::Disk, 2);
    let mut group = c.benchmark_group("dilate_1024x1024_parallel");
    group.sample_size(20);

    for threads in common::thread_counts() {
        engine.warm_up(threads).unwrap();
        for strategy in Strategy::ALL {
            group.bench_with_input(
                BenchmarkId::new(strategy.name(), threads),
                &threads,
                |b, &threads| {
                    b.iter(|| {
                        engine
                            .dilate(
                                black_box(&image),
                                &se,
                                strategy,
                                ExecutionMode::Parallel { threads },
                            )
                            .unwrap()
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_operators(c: &mut Criterion) {
    let image = common::synthetic_batch(640, 480, 1).remove(0);
    let engine = Engine::default();
    let se = StructuringElement::build(Shape::Square, 2);
    let mut group = c.benchmark_group("operators_640x480_tiled");

    for op in Operator::ALL {
        group.bench_function(op.name(), |b| {
            b.iter(|| {
                engine
                    .apply(op, black_box(&image), &se, Strategy::Tiled, ExecutionMode::Sequential)
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_strategies_sequential,
    bench_strategies_parallel,
    bench_operators
);
criterion_main!(benches);
