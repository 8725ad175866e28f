//! Benchmark suite for QOY encoding and decoding
//!
//! Measures encode and decode throughput on synthetic images with
//! different compression characteristics.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use qoy_benches::{gradient_rgba, noise_rgba, sizes, solid_rgba};
use qoy_types::file::qoy::{Channels, Colorspace, Header, PixelFormat, decode, encode};
use std::hint::black_box;

fn test_images() -> Vec<(&'static str, Vec<u8>)> {
	let (width, height) = sizes::MEDIUM;
	vec![
		("solid", solid_rgba(width, height)),
		("gradient", gradient_rgba(width, height)),
		("noise", noise_rgba(width, height)),
	]
}

/// Benchmark QOY encoding from RGBA input
fn bench_encode(c: &mut Criterion) {
	let (width, height) = sizes::MEDIUM;
	let header = Header::new(width, height, Channels::Rgba, Colorspace::Srgb).unwrap();

	let mut group = c.benchmark_group("qoy_encode");
	group.throughput(Throughput::Elements(u64::from(width) * u64::from(height)));

	for (name, pixels) in test_images() {
		group.bench_with_input(BenchmarkId::new("rgba", name), &pixels, |b, pixels| {
			b.iter(|| {
				let result =
					encode(black_box(pixels), &header, Channels::Rgba, PixelFormat::Rgba);
				black_box(result)
			});
		});
	}

	group.finish();
}

/// Benchmark QOY decoding to RGBA output
fn bench_decode(c: &mut Criterion) {
	let (width, height) = sizes::MEDIUM;
	let header = Header::new(width, height, Channels::Rgba, Colorspace::Srgb).unwrap();

	let mut group = c.benchmark_group("qoy_decode");
	group.throughput(Throughput::Elements(u64::from(width) * u64::from(height)));

	for (name, pixels) in test_images() {
		let encoded = encode(&pixels, &header, Channels::Rgba, PixelFormat::Rgba).unwrap();
		group.bench_with_input(BenchmarkId::new("rgba", name), &encoded, |b, data| {
			b.iter(|| {
				let result = decode(black_box(data), None, PixelFormat::Rgba);
				black_box(result)
			});
		});
	}

	group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
