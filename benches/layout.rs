use choromap::config::{LabelCfg, MapConfig, Side};
use choromap::layout::compute_layout;
use choromap::layout::text::FixedMeasure;
use choromap::region::RegionDatum;
use choromap::render::{RenderOptions, render_svg};
use choromap::theme::Theme;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn synthetic_regions(count: usize) -> Vec<RegionDatum> {
    let cols = (count as f32).sqrt().ceil() as usize;
    (0..count)
        .map(|i| {
            let x = (i % cols) as f32 * 90.0 + 50.0;
            let y = (i / cols) as f32 * 70.0 + 40.0;
            RegionDatum {
                key: format!("r{i}"),
                d: format!("M{x},{y} h80 v60 h-80 Z"),
                name: Some(format!("Region {i}")),
                value: if i % 3 == 0 { Some(i as f64) } else { None },
                extra: serde_json::Map::new(),
            }
        })
        .collect()
}

fn synthetic_config(count: usize) -> MapConfig {
    let mut config = MapConfig::default();
    for i in (0..count).step_by(4) {
        config.labels.insert(
            format!("r{i}"),
            LabelCfg {
                side: Some(if i % 8 == 0 { Side::Top } else { Side::Bottom }),
                angle_deg: Some((i % 360) as f32),
                h: Some(30.0),
                v: Some(60.0),
                ..LabelCfg::default()
            },
        );
    }
    config
}

fn bench_layout(c: &mut Criterion) {
    let measure = FixedMeasure::new(7.0);
    let mut group = c.benchmark_group("label_layout");
    for size in [16usize, 64, 256] {
        let regions = synthetic_regions(size);
        let config = synthetic_config(size);
        group.bench_with_input(BenchmarkId::new("compute", size), &size, |b, _| {
            b.iter(|| black_box(compute_layout(&regions, &config, None, &measure)));
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let measure = FixedMeasure::new(7.0);
    let theme = Theme::default();
    let regions = synthetic_regions(64);
    let config = synthetic_config(64);
    c.bench_function("render_svg_64", |b| {
        b.iter(|| {
            black_box(render_svg(
                &regions,
                &config,
                &theme,
                &measure,
                &RenderOptions::default(),
            ))
        });
    });
}

criterion_group!(benches, bench_layout, bench_render);
criterion_main!(benches);
