use criterion::{Criterion, criterion_group, criterion_main};
use gamesettings::{DisplayMode, DisplayModeMatcher, VolumeCurve};
use std::hint::black_box;

fn volume_curve(c: &mut Criterion) {
    c.bench_function("volume_to_gain", |b| {
        b.iter(|| {
            for step in 0..=100 {
                black_box(VolumeCurve::to_gain(black_box(step as f32)));
            }
        })
    });

    c.bench_function("volume_to_percent", |b| {
        b.iter(|| {
            for step in 0..=80 {
                black_box(VolumeCurve::to_percent(black_box(-(step as f32))));
            }
        })
    });
}

fn display_match(c: &mut Criterion) {
    let mut modes = Vec::new();
    for (width, height) in [(1280, 720), (1600, 900), (1920, 1080), (2560, 1440), (3840, 2160)] {
        for refresh in [59.94, 60.0, 75.0, 120.0, 144.0, 165.0, 240.0] {
            modes.push(DisplayMode::new(width, height, refresh));
        }
    }
    let last = DisplayMode::new(3840, 2160, 239.76);

    c.bench_function("find_index_last_mode", |b| {
        b.iter(|| DisplayModeMatcher::find_index(black_box(&modes), black_box(&last)))
    });
}

criterion_group!(benches, volume_curve, display_match);
criterion_main!(benches);
