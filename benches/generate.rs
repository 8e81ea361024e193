use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qrmatrix::helper::to_svg_string;
use qrmatrix::{Mask, QrCode, QrOptions};

fn bench_generate_small(c: &mut Criterion) {
    let options = QrOptions::default();
    c.bench_function("generate_hello_world", |b| {
        b.iter(|| QrCode::encode_text(black_box("HELLO WORLD"), black_box(&options)))
    });
}

fn bench_generate_mixed_segments(c: &mut Criterion) {
    let options = QrOptions::default();
    let texts = ["ORDER-", "1234567", "/abc"];
    c.bench_function("generate_mixed_segments", |b| {
        b.iter(|| QrCode::generate(black_box(&texts), black_box(&options)))
    });
}

fn bench_generate_large(c: &mut Criterion) {
    let options = QrOptions::default();
    let text = "x".repeat(2000);
    c.bench_function("generate_byte_2000", |b| {
        b.iter(|| QrCode::encode_text(black_box(&text), black_box(&options)))
    });
}

fn bench_generate_forced_mask(c: &mut Criterion) {
    let options = QrOptions {
        mask: Some(Mask::new(0)),
        ..QrOptions::default()
    };
    let text = "x".repeat(2000);
    c.bench_function("generate_byte_2000_mask0", |b| {
        b.iter(|| QrCode::encode_text(black_box(&text), black_box(&options)))
    });
}

fn bench_render_svg(c: &mut Criterion) {
    let qr = match QrCode::encode_text(&"9".repeat(1000), &QrOptions::default()) {
        Ok(qr) => qr,
        Err(err) => panic!("benchmark input must encode: {}", err),
    };
    c.bench_function("render_svg_numeric_1000", |b| {
        b.iter(|| to_svg_string(black_box(&qr)))
    });
}

criterion_group!(
    benches,
    bench_generate_small,
    bench_generate_mixed_segments,
    bench_generate_large,
    bench_generate_forced_mask,
    bench_render_svg
);
criterion_main!(benches);
