//! Benchmarks for position resolution, projection and IGC parsing on
//! synthetic flights.
//!
//! Run with: `cargo bench --bench replay`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use glidetrax::igc::parse_igc;
use glidetrax::synthetic::SyntheticFlight;
use glidetrax::{IndexCursor, ReplaySession, Track, project_at, project_with_cursors, resolve_index};
use std::hint::black_box;

fn flight(samples: usize, seed: u64) -> SyntheticFlight {
    SyntheticFlight {
        samples,
        seed,
        ..SyntheticFlight::default()
    }
}

fn session(tracks: usize, samples: usize) -> ReplaySession {
    let tracks: Vec<Track> = (0..tracks)
        .map(|i| flight(samples, i as u64).to_track(&format!("t{}", i), "#3B82F6"))
        .collect();
    ReplaySession::new(tracks).expect("non-empty session")
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    // 1 Hz logger over a 2 hour flight, 60 fps playback at 4x
    let track = flight(7_200, 1).to_track("t", "#3B82F6");
    let frame_times: Vec<f64> = (0..2_000).map(|i| i as f64 * 16.7 * 4.0).collect();
    group.throughput(Throughput::Elements(frame_times.len() as u64));

    group.bench_function("binary_search", |b| {
        b.iter(|| {
            for &t in &frame_times {
                black_box(resolve_index(&track, t));
            }
        });
    });

    group.bench_function("cursor", |b| {
        b.iter(|| {
            let mut cursor = IndexCursor::new();
            for &t in &frame_times {
                black_box(cursor.resolve(&track, t));
            }
        });
    });

    group.finish();
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection");
    group.sample_size(30);

    for tracks in [1, 5, 20] {
        let session = session(tracks, 3_600);
        let mid = session.total_duration_ms() as f64 / 2.0;

        group.bench_with_input(BenchmarkId::new("project_at", tracks), &session, |b, s| {
            b.iter(|| project_at(s, black_box(mid)));
        });

        group.bench_with_input(
            BenchmarkId::new("project_with_cursors", tracks),
            &session,
            |b, s| {
                let mut cursors = Vec::new();
                b.iter(|| project_with_cursors(s, black_box(mid), &mut cursors));
            },
        );
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("igc_parse");

    for samples in [600, 7_200] {
        let igc = flight(samples, 3).to_igc();
        group.throughput(Throughput::Bytes(igc.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(samples), &igc, |b, text| {
            b.iter(|| parse_igc(text.as_bytes(), true));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolution, bench_projection, bench_parse);
criterion_main!(benches);
