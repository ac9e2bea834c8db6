//! Benchmarks for preview rendering.
//!
//! The preview re-renders on every keystroke, so render cost bounds the
//! editor's input latency.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use livemark::preview::Preview;
use livemark::ui::style::Theme;

fn document(paragraphs: usize) -> String {
    let mut md = String::from("# Benchmark Document\n\n");
    for i in 0..paragraphs {
        md.push_str(&format!(
            "## Section {i}\n\nSome *styled* text with `code` and a \
             [link](https://example.com), long enough to wrap at pane \
             width a couple of times.\n\n- item one\n- item two\n\n"
        ));
    }
    md.push_str("```rust\nfn main() {\n    println!(\"hello\");\n}\n```\n");
    md
}

fn bench_render_small(c: &mut Criterion) {
    let md = document(2);
    c.bench_function("render_small", |b| {
        b.iter(|| Preview::render(black_box(&md), 80, Theme::Dark))
    });
}

fn bench_render_large(c: &mut Criterion) {
    let md = document(200);
    c.bench_function("render_large", |b| {
        b.iter(|| Preview::render(black_box(&md), 80, Theme::Dark))
    });
}

fn bench_render_narrow_wraps(c: &mut Criterion) {
    let md = document(50);
    c.bench_function("render_narrow_wraps", |b| {
        b.iter(|| Preview::render(black_box(&md), 30, Theme::Dark))
    });
}

criterion_group!(
    benches,
    bench_render_small,
    bench_render_large,
    bench_render_narrow_wraps
);
criterion_main!(benches);
