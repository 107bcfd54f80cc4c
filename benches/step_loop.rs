use criterion::{criterion_group, criterion_main, Criterion};
use mpflow::simulation::{SimConfig, Simulator};
use mpflow::topology::{Path, Topology};

fn reference_topology() -> Topology {
    Topology::new(vec![
        Path::new("path_1", 100.0, 50.0),
        Path::new("path_2", 200.0, 100.0),
        Path::new("path_3", 80.0, 50.0),
    ])
    .unwrap()
}

fn bench_step_loop(c: &mut Criterion) {
    let topology = reference_topology();

    let mut group = c.benchmark_group("step_loop");
    for strategy in ["min_rtt", "min_load", "blest"] {
        group.bench_function(strategy, |b| {
            b.iter(|| {
                let config = SimConfig::default()
                    .with_strategy(strategy)
                    .with_agents(50)
                    .with_duration(200)
                    .with_seed(42);
                let mut sim = Simulator::new(topology.clone(), config).unwrap();
                sim.run().unwrap();
                sim.into_records().len()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step_loop);
criterion_main!(benches);
