use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;
use sigcorr::kernel::HandleLifecycle;
use sigcorr::signal::correlate::{
    cross_correlate_simd, CrossCorrelateConfig, CrossCorrelateKernel, Strategy,
};
use sigcorr::signal::traits::CrossCorrelate1D;

fn random_signal(len: usize) -> Vec<f32> {
    let mut rng = rand::rng();
    (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
}

fn correlate_strategies(c: &mut Criterion) {
    for (x_len, h_len) in [(4096, 16), (65_536, 128), (16_384, 4096)] {
        let x = random_signal(x_len);
        let h = random_signal(h_len);
        let mut out = vec![0.0f32; x_len];

        for strategy in Strategy::ALL {
            let mut kernel = CrossCorrelateKernel::try_new(
                CrossCorrelateConfig::new(x_len, h_len).with_strategy(strategy),
            )
            .expect("valid correlation kernel config");
            c.bench_function(&format!("correlate_{strategy}_{x_len}x{h_len}"), |b| {
                b.iter(|| {
                    kernel
                        .run_into(black_box(&x), black_box(&h), &mut out)
                        .expect("benchmark input should match the handle shape");
                    black_box(&out);
                });
            });
        }

        let mut kernel = CrossCorrelateKernel::try_new(CrossCorrelateConfig::new(x_len, h_len))
            .expect("valid correlation kernel config");
        let selected = kernel.strategy();
        c.bench_function(&format!("correlate_adaptive_{selected}_{x_len}x{h_len}"), |b| {
            b.iter(|| {
                kernel
                    .run_into(black_box(&x), black_box(&h), &mut out)
                    .expect("benchmark input should match the handle shape");
                black_box(&out);
            });
        });
    }
}

fn correlate_direct_paths(c: &mut Criterion) {
    let x = random_signal(8192);
    let h = random_signal(32);
    let mut out = vec![0.0f32; x.len()];
    for use_vector_path in [false, true] {
        let name = if use_vector_path { "vector" } else { "scalar" };
        c.bench_function(&format!("cross_correlate_simd_{name}_8192x32"), |b| {
            b.iter(|| {
                cross_correlate_simd(use_vector_path, black_box(&x), black_box(&h), &mut out)
                    .expect("result matches the signal length");
                black_box(&out);
            });
        });
    }
}

criterion_group!(benches, correlate_strategies, correlate_direct_paths);
criterion_main!(benches);
