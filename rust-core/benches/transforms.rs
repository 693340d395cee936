//! Benchmarks for the spectral transforms
//!
//! Run with: cargo bench -p sygnals-core --bench transforms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::f64::consts::PI;
use sygnals::convolution::{convolve_with, ConvolutionMethod, ConvolveMode};
use sygnals::spectrum::{cqt, fft, stft, welch, CqtConfig, StftConfig, WelchConfig};

fn tone(len: usize, freq: f64, sr: f64) -> Vec<f64> {
    (0..len)
        .map(|n| (2.0 * PI * freq * n as f64 / sr).sin())
        .collect()
}

fn bench_fft(c: &mut Criterion) {
    let mut group = c.benchmark_group("fft");

    for size in [256usize, 1000, 4096, 44100] {
        let signal = tone(size, 440.0, 44100.0);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &signal, |b, signal| {
            b.iter(|| fft(black_box(signal), None, 44100.0))
        });
    }

    group.finish();
}

fn bench_stft(c: &mut Criterion) {
    let signal = tone(44100, 440.0, 44100.0);
    let mut group = c.benchmark_group("stft");
    group.throughput(Throughput::Elements(signal.len() as u64));

    for n_fft in [512usize, 2048] {
        let config = StftConfig::new(n_fft);
        group.bench_with_input(BenchmarkId::new("n_fft", n_fft), &config, |b, config| {
            b.iter(|| stft(black_box(&signal), config))
        });
    }

    group.finish();
}

fn bench_cqt(c: &mut Criterion) {
    let signal = tone(22050, 440.0, 22050.0);
    let config = CqtConfig {
        n_bins: 60,
        ..CqtConfig::default()
    };

    c.bench_function("cqt_60_bins", |b| {
        b.iter(|| cqt(black_box(&signal), 22050.0, &config))
    });
}

fn bench_welch(c: &mut Criterion) {
    let signal = tone(48000, 1000.0, 48000.0);
    let config = WelchConfig {
        fs: 48000.0,
        nperseg: Some(1024),
        ..WelchConfig::default()
    };

    c.bench_function("welch_1024", |b| b.iter(|| welch(black_box(&signal), &config)));
}

fn bench_convolution_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolution");
    let signal = tone(8192, 100.0, 8000.0);

    for kernel_len in [8usize, 64, 512] {
        let kernel = tone(kernel_len, 50.0, 8000.0);
        for method in [ConvolutionMethod::Direct, ConvolutionMethod::Fft] {
            group.bench_with_input(
                BenchmarkId::new(method.to_string(), kernel_len),
                &kernel,
                |b, kernel| {
                    b.iter(|| convolve_with(black_box(&signal), kernel, ConvolveMode::Full, method))
                },
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fft,
    bench_stft,
    bench_cqt,
    bench_welch,
    bench_convolution_methods
);
criterion_main!(benches);
