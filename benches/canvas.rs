//! Frame composition and drawing benchmarks.

#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use vtcanvas::canvas::{EmissionMode, compose};
use vtcanvas::{Canvas, CanvasOptions, Color, Grid};

fn filled_grid(w: u32, h: u32) -> Grid {
    let mut grid = Grid::new(w, h);
    for y in 0..h {
        let fg = Color::Indexed((y % 16) as u8);
        grid.write_runes(0, y, fg, Color::Default, 'a', (w / 2) as usize);
        grid.write_str(w / 2, y, Color::CYAN, Color::BLACK, "status ok 漢字");
    }
    grid
}

/// Benchmark full-frame composition at common terminal sizes.
fn bench_full_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_frame");

    for (w, h) in [(80, 24), (200, 60)] {
        let grid = filled_grid(w, h);
        for mode in [EmissionMode::Batched, EmissionMode::PerCell] {
            group.bench_with_input(
                BenchmarkId::new(format!("{mode:?}"), format!("{w}x{h}")),
                &grid,
                |b, grid| b.iter(|| black_box(compose(grid, None, mode, false))),
            );
        }
    }

    group.finish();
}

/// Benchmark incremental frames with a few changed cells.
fn bench_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental");

    let canvas = Canvas::with_writer(std::io::sink(), 200, 60, CanvasOptions::default()).unwrap();
    canvas.batch(|grid| *grid = filled_grid(200, 60));
    canvas.draw().unwrap();

    group.bench_function("idle_draw", |b| b.iter(|| black_box(canvas.draw().unwrap())));

    let mut tick = 0u32;
    group.bench_function("ten_cells", |b| {
        b.iter(|| {
            tick = tick.wrapping_add(1);
            for i in 0..10 {
                canvas.plot((tick + i * 17) % 200, (tick + i) % 60, 'x');
            }
            black_box(canvas.draw().unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_full_frame, bench_incremental);
criterion_main!(benches);
