use apytypes::quantize::{decide, QuantizationMode};
use apytypes::rng::StochasticRng;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn bench_decide(c: &mut Criterion) {
    let mut rng = StochasticRng::from_seed(7);
    c.bench_function("quantize decide RndConv", |b| {
        b.iter(|| {
            decide(
                black_box(QuantizationMode::RndConv),
                black_box(false),
                black_box(true),
                black_box(true),
                black_box(false),
                &mut rng,
            )
        })
    });
}

pub fn bench_decide_all_modes(c: &mut Criterion) {
    let mut rng = StochasticRng::from_seed(7);
    c.bench_function("quantize decide all 15 modes", |b| {
        b.iter(|| {
            for mode in QuantizationMode::ALL {
                if mode == QuantizationMode::StochWeighted {
                    continue;
                }
                black_box(decide(mode, false, true, true, false, &mut rng));
            }
        })
    });
}

criterion_group!(benches, bench_decide, bench_decide_all_modes);
criterion_main!(benches);
