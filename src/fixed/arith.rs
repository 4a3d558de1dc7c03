//! Fixed-point binary arithmetic: value-preserving result
//! specs, computed before any rounding, so the caller can cast the exact
//! result down afterward if they want a narrower format.

use crate::limb::{self, Limb};
use crate::quantize::{OverflowMode, QuantizationMode};
use crate::rng::StochasticRng;

use super::cast;
use super::spec::FixedSpec;

/// `a + b`, exact.
pub fn add(a: &[Limb], a_spec: FixedSpec, b: &[Limb], b_spec: FixedSpec) -> (FixedSpec, Vec<Limb>) {
    let result_spec = a_spec.add_result_spec(&b_spec);
    let (a_aligned, b_aligned) = align(a, a_spec, b, b_spec, result_spec);
    let mut out = vec![0 as Limb; result_spec.limbs()];
    limb::add_n(&mut out, &a_aligned, &b_aligned);
    (result_spec, out)
}

/// `a - b`, exact.
pub fn sub(a: &[Limb], a_spec: FixedSpec, b: &[Limb], b_spec: FixedSpec) -> (FixedSpec, Vec<Limb>) {
    let result_spec = a_spec.add_result_spec(&b_spec);
    let (a_aligned, b_aligned) = align(a, a_spec, b, b_spec, result_spec);
    let mut out = vec![0 as Limb; result_spec.limbs()];
    limb::sub_n(&mut out, &a_aligned, &b_aligned);
    (result_spec, out)
}

/// Widen both operands to `result_spec` via a lossless (shift-only, never
/// rounds or overflows) cast.
fn align(
    a: &[Limb],
    a_spec: FixedSpec,
    b: &[Limb],
    b_spec: FixedSpec,
    result_spec: FixedSpec,
) -> (Vec<Limb>, Vec<Limb>) {
    let mut rng = StochasticRng::from_seed(0); // never consulted: widening never rounds
    let a_aligned = cast::cast(a, a_spec, result_spec, QuantizationMode::Trn, OverflowMode::Wrap, &mut rng);
    let b_aligned = cast::cast(b, b_spec, result_spec, QuantizationMode::Trn, OverflowMode::Wrap, &mut rng);
    (a_aligned, b_aligned)
}

/// `a * b`, exact.
pub fn mul(a: &[Limb], a_spec: FixedSpec, b: &[Limb], b_spec: FixedSpec) -> (FixedSpec, Vec<Limb>) {
    let result_spec = a_spec.mul_result_spec(&b_spec);
    let sign = limb::is_negative(a) ^ limb::is_negative(b);

    let mut a_mag = vec![0 as Limb; a_spec.limbs()];
    limb::abs(&mut a_mag, a);
    let mut b_mag = vec![0 as Limb; b_spec.limbs()];
    limb::abs(&mut b_mag, b);

    let mut product = vec![0 as Limb; a_mag.len() + b_mag.len()];
    limb::mul_n_by_m(&mut product, &a_mag, &b_mag);

    let dst_limbs = result_spec.limbs();
    let work_limbs = dst_limbs.max(product.len());
    let mut magnitude = vec![0 as Limb; work_limbs];
    magnitude[..product.len()].copy_from_slice(&product);

    let mut signed = vec![0 as Limb; work_limbs];
    if sign {
        limb::neg(&mut signed, &magnitude);
    } else {
        signed.copy_from_slice(&magnitude);
    }

    let mut out = vec![0 as Limb; dst_limbs];
    out.copy_from_slice(&signed[..dst_limbs]);
    limb::truncate_to_bits(&mut out, result_spec.bits);
    (result_spec, out)
}

/// `a / b`. Division by zero returns a zero result rather than panicking or
/// raising; this crate picks zero uniformly so array and scalar callers
/// agree (see `DESIGN.md`).
pub fn div(a: &[Limb], a_spec: FixedSpec, b: &[Limb], b_spec: FixedSpec) -> (FixedSpec, Vec<Limb>) {
    let result_spec = a_spec.div_result_spec(&b_spec);
    let dst_limbs = result_spec.limbs();

    if limb::is_zero(b) {
        return (result_spec, vec![0 as Limb; dst_limbs]);
    }

    let sign = limb::is_negative(a) ^ limb::is_negative(b);
    let mut a_mag = vec![0 as Limb; a_spec.limbs()];
    limb::abs(&mut a_mag, a);
    let mut b_mag = vec![0 as Limb; b_spec.limbs()];
    limb::abs(&mut b_mag, b);

    let work_limbs = dst_limbs + a_spec.limbs() + b_spec.limbs() + 1;
    let mut dividend = vec![0 as Limb; work_limbs];
    {
        let mut a_ext = vec![0 as Limb; work_limbs];
        a_ext[..a_mag.len()].copy_from_slice(&a_mag);
        limb::lsl(&mut dividend, &a_ext, b_spec.bits);
    }
    let mut divisor = vec![0 as Limb; work_limbs];
    divisor[..b_mag.len()].copy_from_slice(&b_mag);

    let mut q = vec![0 as Limb; work_limbs];
    let mut r = vec![0 as Limb; work_limbs];
    limb::unsigned_div_qr(&mut q, &mut r, &dividend, &divisor);

    let mut signed = vec![0 as Limb; work_limbs];
    if sign {
        limb::neg(&mut signed, &q);
    } else {
        signed.copy_from_slice(&q);
    }

    let mut out = vec![0 as Limb; dst_limbs];
    out.copy_from_slice(&signed[..dst_limbs]);
    limb::truncate_to_bits(&mut out, result_spec.bits);
    (result_spec, out)
}

/// Unary negate: widens `bits` by one to represent `-INT_MIN` exactly.
pub fn neg(a: &[Limb], a_spec: FixedSpec) -> (FixedSpec, Vec<Limb>) {
    let result_spec = a_spec.neg_result_spec();
    let limbs = result_spec.limbs();
    let mut ext = vec![0 as Limb; limbs];
    limb::sign_extend(&mut ext, a);
    let mut out = vec![0 as Limb; limbs];
    limb::neg(&mut out, &ext);
    (result_spec, out)
}

/// `<<`/`>>`: re-label `int_bits` only, the data buffer is untouched.
pub fn shift_left(a: &[Limb], a_spec: FixedSpec, amount: i64) -> (FixedSpec, Vec<Limb>) {
    let result_spec = FixedSpec {
        bits: a_spec.bits,
        int_bits: a_spec.int_bits + amount,
    };
    (result_spec, a.to_vec())
}

pub fn shift_right(a: &[Limb], a_spec: FixedSpec, amount: i64) -> (FixedSpec, Vec<Limb>) {
    shift_left(a, a_spec, -amount)
}
