//! Criterion benchmarks for the red.xml codec and change detection.
//!
//! Benchmarks `ConfigWriter::write`, `reader::read`, `reader::read_with_provenance`
//! and `LibrariesChangesDetector::detect_records` on configurations of growing size.

use camino::Utf8Path;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use redxml::ChangesDetector;
use redxml::config::{ConfigWriter, reader};
use redxml::models::{LibraryType, ProjectConfig, ReferencedLibrary, SearchPath};
use redxml::services::changes::LibrariesChangesDetector;
use std::hint::black_box;

fn config_with_entries(count: usize) -> ProjectConfig {
    let mut config = ProjectConfig::create();
    for index in 0..count {
        config.add_referenced_library(ReferencedLibrary::create(
            LibraryType::Python,
            format!("pkg{}.module", index),
            format!("Project/libs/group{}", index % 10),
        ));
        config.add_python_path(SearchPath::create(format!("Project/py/{}", index)));
        config.add_excluded_path(&format!("results/run{}", index));
    }
    config
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    for count in [10, 100, 1000] {
        let config = config_with_entries(count);
        let bytes = ConfigWriter::new().write(&config).unwrap();

        group.bench_with_input(BenchmarkId::new("write", count), &config, |b, config| {
            b.iter(|| ConfigWriter::new().write(black_box(config)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("read", count), &bytes, |b, bytes| {
            b.iter(|| reader::read(black_box(bytes)).unwrap())
        });
        group.bench_with_input(
            BenchmarkId::new("read_with_provenance", count),
            &bytes,
            |b, bytes| b.iter(|| reader::read_with_provenance(black_box(bytes)).unwrap()),
        );
    }
    group.finish();
}

fn bench_detection(c: &mut Criterion) {
    let config = config_with_entries(1000);
    c.bench_function("detect_libraries_move", |b| {
        b.iter(|| {
            LibrariesChangesDetector::new(
                "Project/libs/group3",
                Some(Utf8Path::new("Project/libs/moved")),
                black_box(&config),
            )
            .detect_records()
        })
    });
}

criterion_group!(benches, bench_codec, bench_detection);
criterion_main!(benches);
