use apytypes::float::{FloatPoint, FloatSpec};
use apytypes::rng::StochasticRng;

fn spec() -> FloatSpec {
    FloatSpec::ieee_double()
}

fn rng() -> StochasticRng {
    StochasticRng::from_seed(3)
}

fn val(v: f64) -> FloatPoint {
    FloatPoint::from_f64(v, spec())
}

/// FP-add-subnormal: adding two subnormal values stays within the
/// subnormal range and matches host `f64` addition bit-for-bit when both
/// operands round-trip through `ieee_double`.
#[test]
fn add_subnormal_matches_host_f64() {
    let tiny_a = f64::from_bits(3);
    let tiny_b = f64::from_bits(5);
    let a = val(tiny_a);
    let b = val(tiny_b);
    let sum = a.add(&b, &mut rng());
    assert_eq!(sum.to_f64(), tiny_a + tiny_b);
}

/// FP-div-special: dividing by an exact zero yields a signed infinity,
/// and zero divided by a nonzero value yields a signed zero.
#[test]
fn div_special_cases_match_ieee() {
    let one = val(1.0);
    let zero = val(0.0);
    let neg_zero = val(-0.0);
    assert_eq!(one.div(&zero, &mut rng()).to_f64(), f64::INFINITY);
    assert_eq!(one.div(&neg_zero, &mut rng()).to_f64(), f64::NEG_INFINITY);
    assert_eq!(zero.div(&one, &mut rng()).to_f64(), 0.0);
}

#[test]
fn add_matches_host_f64_for_ordinary_values() {
    let a = val(1.5);
    let b = val(2.25);
    let sum = a.add(&b, &mut rng());
    assert_eq!(sum.to_f64(), 3.75);
}

#[test]
fn mul_matches_host_f64_for_ordinary_values() {
    let a = val(2.5);
    let b = val(-4.0);
    let product = a.mul(&b, &mut rng());
    assert_eq!(product.to_f64(), -10.0);
}

#[test]
fn scalbn_scales_by_power_of_two() {
    let a = val(1.0);
    let scaled = a.scalbn(10);
    assert_eq!(scaled.to_f64(), 1024.0);
}

#[test]
fn nan_propagates_through_arithmetic() {
    let nan = FloatPoint::nan(spec());
    let one = val(1.0);
    assert!(nan.add(&one, &mut rng()).is_nan());
    assert!(one.mul(&nan, &mut rng()).is_nan());
}

#[test]
fn cast_to_narrower_format_rounds_and_preserves_sign() {
    let narrow_spec = FloatSpec::new(5, 10, 15).unwrap();
    let a = val(3.14159);
    let narrowed = a.cast(narrow_spec, apytypes::quantize::QuantizationMode::RndConv, &mut rng());
    assert_eq!(narrowed.spec(), narrow_spec);
    assert!((narrowed.to_f64() - 3.14159).abs() < 0.01);
}
