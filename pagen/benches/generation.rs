use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pagen::core::config::BaConfig;
use pagen::edges::writer::{EdgeListWriter, EndpointWidth};
use pagen::em::sorter::ExternalSorter;
use pagen::models::ba::generate_ba;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn bench_ba(c: &mut Criterion) {
    let mut group = c.benchmark_group("ba_sequential");
    for vertices in [1_000u64, 10_000] {
        let config = BaConfig::new(vertices, 4);
        group.throughput(Throughput::Elements(config.total_edges()));
        group.bench_with_input(
            BenchmarkId::from_parameter(vertices),
            &config,
            |b, config| {
                b.iter(|| {
                    let mut writer = EdgeListWriter::disabled(EndpointWidth::U64);
                    generate_ba(config, &mut writer).expect("generation");
                    writer.edges_written()
                })
            },
        );
    }
    group.finish();
}

fn bench_sorter(c: &mut Criterion) {
    let mut group = c.benchmark_group("external_sorter");
    let items = 100_000u64;
    group.throughput(Throughput::Elements(items));
    group.bench_function("u64_spilling", |b| {
        b.iter(|| {
            let mut sorter = ExternalSorter::new(1 << 16).expect("temp dir");
            let mut rng = StdRng::seed_from_u64(1);
            for _ in 0..items {
                sorter.push(rng.gen::<u64>());
            }
            sorter.sort().count()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_ba, bench_sorter);
criterion_main!(benches);
