use anomaly_detector::{AnomalyDetector, DetectorConfig};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use vehicle_sim::TelemetryGenerator;

fn bench_detection(c: &mut Criterion) {
    let mut detector = AnomalyDetector::new(DetectorConfig::default()).unwrap();
    detector.train_initial_model(300).unwrap();

    let mut generator = TelemetryGenerator::new("BENCH-01");
    let warmup: Vec<_> = (0..50).map(|_| generator.generate_reading()).collect();
    detector.sync_history(&warmup);

    c.bench_function("detect_anomaly_full_history", |b| {
        b.iter_batched(
            || generator.generate_reading(),
            |reading| black_box(detector.detect_anomaly(&reading).unwrap()),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("composite_features", |b| {
        let reading = generator.generate_reading();
        b.iter(|| black_box(detector.composite_features(&reading).unwrap()))
    });

    c.bench_function("train_initial_model_300", |b| {
        b.iter(|| {
            let mut fresh = AnomalyDetector::new(DetectorConfig::default()).unwrap();
            fresh.train_initial_model(black_box(300)).unwrap();
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_detection
}
criterion_main!(benches);
