use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use modarith::limbs::{self, Word};
use modarith::{FixModPow, LargeInteger, ModPowAlgorithm, named_curve};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn random_words(rng: &mut StdRng, n: usize) -> Vec<Word> {
    LargeInteger::random_bits(n * 64, rng).words().to_vec()
}

fn bench_mul(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let mut group = c.benchmark_group("mul");
    for n in [4, 16, 32, 64, 128] {
        let x = random_words(&mut rng, n);
        let y = random_words(&mut rng, n);
        let mut w = vec![0; 2 * n];
        group.bench_with_input(BenchmarkId::new("naive", n), &n, |b, _| {
            b.iter(|| limbs::mul_naive(&mut w, black_box(&x), black_box(&y)))
        });
        group.bench_with_input(BenchmarkId::new("karatsuba", n), &n, |b, _| {
            b.iter(|| limbs::mul(&mut w, black_box(&x), black_box(&y)))
        });
    }
    group.finish();
}

fn bench_modpow(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let mut group = c.benchmark_group("modpow_2048");
    let mut m = LargeInteger::random_bits(2048, &mut rng);
    if m.is_even() {
        m = &m + &LargeInteger::one();
    }
    let base = LargeInteger::random_below(&m, &mut rng).unwrap();
    let e = LargeInteger::random_bits(256, &mut rng);
    for alg in [
        ModPowAlgorithm::Naive,
        ModPowAlgorithm::Windowed,
        ModPowAlgorithm::Montgomery,
    ] {
        group.bench_function(format!("{alg:?}"), |b| {
            b.iter(|| base.modpow_with(black_box(&e), &m, alg))
        });
    }
    let fixed = FixModPow::new(&base, &m, 256, 1000).unwrap();
    group.bench_function("fixed_base", |b| b.iter(|| fixed.modpow(black_box(&e))));
    group.finish();
}

fn bench_curve(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(3);
    let nc = named_curve("secp256r1").unwrap();
    let k = LargeInteger::random_below(nc.order(), &mut rng).unwrap();
    let mut r = nc.curve.new_point();
    c.bench_function("p256_jdbl", |b| {
        b.iter(|| nc.curve.jdbl(&mut r, black_box(&nc.generator)))
    });
    c.bench_function("p256_jmul", |b| {
        b.iter(|| nc.curve.jmul(&mut r, black_box(&nc.generator), black_box(&k)))
    });
}

criterion_group!(benches, bench_mul, bench_modpow, bench_curve);
criterion_main!(benches);
