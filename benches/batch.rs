use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use morph_bench::{
    BatchSchedule, Engine, ExecutionMode, Operator, Shape, Strategy, StructuringElement,
};

mod common;

fn bench_batch_schedules(c: &mut Criterion) {
    let images = common::synthetic_batch(200, 200, 16);
    let engine = Engine::default();
    let se = StructuringElement::build(Shape::Disk, 1);
    let threads = common::thread_counts().last().copied().unwrap_or(1);
    engine.warm_up(threads).unwrap();

    let mut group = c.benchmark_group("open_batch_16x200x200");
    group.sample_size(20);
    group.bench_function("sequential", |b| {
        b.iter(|| {
            engine
                .apply_to_batch(
                    black_box(&images),
                    &se,
                    Operator::Open,
                    Strategy::OffsetList,
                    ExecutionMode::Sequential,
                    BatchSchedule::Pixels,
                )
                .unwrap()
        })
    });

    for schedule in [BatchSchedule::Pixels, BatchSchedule::Images, BatchSchedule::Nested] {
        group.bench_with_input(
            BenchmarkId::new(format!("{:?}", schedule), threads),
            &schedule,
            |b, &schedule| {
                b.iter(|| {
                    engine
                        .apply_to_batch(
                            black_box(&images),
                            &se,
                            Operator::Open,
                            Strategy::OffsetList,
                            ExecutionMode::Parallel { threads },
                            schedule,
                        )
                        .unwrap()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_batch_schedules);
criterion_main!(benches);
