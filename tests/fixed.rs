use apytypes::fixed::{FixedPoint, FixedSpec};
use apytypes::quantize::{OverflowMode, QuantizationMode};
use apytypes::rng::StochasticRng;

fn spec(bits: usize, int_bits: i64) -> FixedSpec {
    FixedSpec::new(bits, int_bits).unwrap()
}

fn val(v: f64, s: FixedSpec) -> FixedPoint {
    FixedPoint::from_f64_rounded(v, s, QuantizationMode::RndConv, OverflowMode::Sat)
}

/// FX-add-widen: adding two differently-specced values widens the result
/// spec by one integer bit and to the wider fraction, losing no precision.
#[test]
fn add_widens_result_spec() {
    let a = val(3.5, spec(8, 4));
    let b = val(1.25, spec(10, 2));
    let sum = a.add(&b);
    assert_eq!(sum.spec().int_bits, 5);
    assert_eq!(sum.spec().frac_bits(), 8);
    assert!((sum.to_f64() - 4.75).abs() < 1e-9);
}

/// FX-cast-rnd-conv: narrowing a cast under ties-to-even rounds the exact
/// half-way case to the nearest even retained value.
#[test]
fn cast_rounds_ties_to_even() {
    let wide = spec(16, 8);
    let narrow = spec(8, 8);
    let mut rng = StochasticRng::from_seed(1);

    // 0.5 in frac_bits=8 is exactly representable; narrowing to frac_bits=0
    // should round the tie to 0 (the nearest even integer).
    let half = val(0.5, wide);
    let narrowed = half.cast(narrow, QuantizationMode::RndConv, OverflowMode::Sat, &mut rng);
    assert_eq!(narrowed.to_f64(), 0.0);

    // 1.5 should round to 2 (nearest even).
    let one_and_half = val(1.5, wide);
    let narrowed = one_and_half.cast(narrow, QuantizationMode::RndConv, OverflowMode::Sat, &mut rng);
    assert_eq!(narrowed.to_f64(), 2.0);
}

#[test]
fn saturating_overflow_clamps_to_representable_range() {
    let s = spec(8, 4);
    let mut rng = StochasticRng::from_seed(1);
    let big = val(1000.0, spec(16, 12));
    let clamped = big.cast(s, QuantizationMode::Trn, OverflowMode::Sat, &mut rng);
    assert!(clamped.to_f64() < 16.0);
}

#[test]
fn mul_and_div_are_inverse_for_exact_values() {
    let s = spec(16, 8);
    let a = val(6.0, s);
    let b = val(3.0, s);
    let product = a.mul(&b);
    assert_eq!(product.to_f64(), 18.0);
    let quotient = product.div(&b);
    assert!((quotient.to_f64() - 6.0).abs() < 1e-6);
}

#[test]
fn neg_round_trips_through_neg() {
    let a = val(5.25, spec(16, 8));
    let back = a.neg().neg();
    assert_eq!(back.to_f64(), a.to_f64());
}

#[test]
fn decimal_round_trip_through_string() {
    let s = spec(24, 8);
    let a = val(12.375, s);
    let text = a.to_string_radix(10).unwrap();
    let parsed = FixedPoint::from_str_radix(&text, s, 10).unwrap();
    assert_eq!(parsed.to_f64(), a.to_f64());
}

#[test]
fn floor_log2_abs_matches_bit_width() {
    let a = val(1.0, spec(16, 8));
    assert_eq!(a.floor_log2_abs(), 0);
    let b = val(8.0, spec(16, 8));
    assert_eq!(b.floor_log2_abs(), 3);
}
