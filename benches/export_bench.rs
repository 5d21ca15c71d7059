use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use imagify::{ExportConfig, Exporter, ImageEntry, Origin};

fn fixture(width: u32, height: u32, format: ImageFormat, media_type: &str) -> ImageEntry {
    let img = DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("encode fixture");
    ImageEntry::from_bytes(media_type, &out.into_inner(), Origin::File).expect("image entry")
}

fn bench_export_png(c: &mut Criterion) {
    let exporter = Exporter::new(ExportConfig::default()).expect("exporter");
    let images: Vec<ImageEntry> = (0..4)
        .map(|_| fixture(800, 600, ImageFormat::Png, "image/png"))
        .collect();

    c.bench_function("export_4_png_pages", |b| {
        b.iter(|| {
            let _ = exporter.export_blocking(&images, "bench.pdf").unwrap();
        })
    });
}

fn bench_export_jpeg(c: &mut Criterion) {
    let exporter = Exporter::new(ExportConfig::default()).expect("exporter");
    let images: Vec<ImageEntry> = (0..4)
        .map(|_| fixture(1600, 1200, ImageFormat::Jpeg, "image/jpeg"))
        .collect();

    c.bench_function("export_4_jpeg_pages", |b| {
        b.iter(|| {
            let _ = exporter.export_blocking(&images, "bench.pdf").unwrap();
        })
    });
}

fn bench_async_export(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let exporter = Exporter::new(ExportConfig::default()).expect("exporter");
    let images: Vec<ImageEntry> = (0..4)
        .map(|_| fixture(800, 600, ImageFormat::Png, "image/png"))
        .collect();

    c.bench_function("export_4_png_pages_async", |b| {
        b.iter(|| {
            rt.block_on(async {
                let _ = exporter.export(&images, "bench.pdf").await.unwrap();
            })
        })
    });
}

criterion_group!(benches, bench_export_png, bench_export_jpeg, bench_async_export);
criterion_main!(benches);
