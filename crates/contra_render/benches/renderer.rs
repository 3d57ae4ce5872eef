//! Renderer throughput for a full-screen repaint and a steady scroll —
//! the two patterns `trace_line_scroll`/`render_content` are built to
//! make cheap.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use contra_model::{Attribute, Board, Cell};
use contra_render::{DifferentialRenderer, TermcapSgrType};

fn fill_board(board: &mut Board, text: &str) {
    let cells: Vec<Cell> = text.chars().map(|c| Cell::printable(c, Attribute::default())).collect();
    for row in 0..board.height() {
        board.line_mut(row).write_cells(0, &cells, 1);
    }
}

fn bench_full_repaint(c: &mut Criterion) {
    c.bench_function("renderer/full_repaint", |b| {
        b.iter(|| {
            let mut board = Board::new(80, 24);
            fill_board(&mut board, &"x".repeat(80));
            let mut renderer = DifferentialRenderer::new(TermcapSgrType::default());
            let mut out = Vec::new();
            renderer.update(black_box(&board), &mut out);
        });
    });
}

fn bench_scroll(c: &mut Criterion) {
    c.bench_function("renderer/steady_scroll", |b| {
        b.iter(|| {
            let mut board = Board::new(80, 24);
            fill_board(&mut board, &"x".repeat(80));
            let mut renderer = DifferentialRenderer::new(TermcapSgrType::default());
            let mut out = Vec::new();
            renderer.update(&board, &mut out);
            for _ in 0..50 {
                board.rotate(1);
                fill_board(&mut board, &"y".repeat(80));
                out.clear();
                renderer.update(black_box(&board), &mut out);
            }
        });
    });
}

criterion_group!(benches, bench_full_repaint, bench_scroll);
criterion_main!(benches);
