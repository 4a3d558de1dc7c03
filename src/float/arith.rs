//! Floating-point arithmetic: add/sub, multiply, divide,
//! and `scalbn`.
//!
//! Every operation decomposes its operands into the same
//! `(mantissa_with_hidden, true_exp)` shape the cast engine uses, computes
//! an exact (headroom-widened) intermediate result, and finishes through
//! one shared rounding/rebias/overflow routine ([`finish_from_raw`]) — this
//! is the same "one shared function body instead of width-specialized
//! overloads" simplification the cast engine uses, carried through to
//! arithmetic: rather than instantiate distinct `same_wl`/`diff_wl`/
//! `general` code paths the way a template-based implementation would, a
//! single generic path handles every width combination, since `man_bits`
//! never exceeds 61 and a `u128` intermediate has headroom to spare.

use crate::quantize::{self, QuantizationMode};
use crate::rng::StochasticRng;

use super::spec::{FloatData, FloatSpec};

/// Extra low-order bits of working precision kept through alignment and
/// normalization before the final rounding decision.
const EXTRA: u32 = 4;

/// Decompose `d` into `(mantissa_with_hidden, true_exp)` such that
/// `value = mantissa_with_hidden * 2^(true_exp - spec.man_bits)`, folding
/// subnormals into the same hidden-bit-included shape as normals.
fn decompose(d: FloatData, spec: FloatSpec) -> (u128, i64) {
    if d.exp == 0 {
        let mut m = d.man as u128;
        let mut shift = 0i64;
        while m & (1u128 << spec.man_bits) == 0 {
            m <<= 1;
            shift += 1;
        }
        (m, 1 - spec.bias as i64 - shift)
    } else {
        (
            d.man as u128 | (1u128 << spec.man_bits),
            d.exp as i64 - spec.bias as i64,
        )
    }
}

/// Widen (exact) or narrow (quantized) a `u128` mantissa by `shift` bits.
fn align_mantissa128(
    mantissa: u128,
    shift: i64,
    quantization: QuantizationMode,
    sign: bool,
    rng: &mut StochasticRng,
) -> u128 {
    if shift >= 0 {
        let shift = shift.min(127) as u32;
        return mantissa << shift;
    }
    let shift_amount = (-shift) as u32;
    if shift_amount >= 128 {
        let outcome = quantize::decide(quantization, sign, false, false, mantissa != 0, rng);
        return if outcome.force_lsb_one || outcome.add_ulp {
            1
        } else {
            0
        };
    }
    let g = (mantissa >> (shift_amount - 1)) & 1 == 1;
    let t_mask = (1u128 << (shift_amount - 1)) - 1;
    let t = (mantissa & t_mask) != 0;
    let mut retained = mantissa >> shift_amount;
    let retained_lsb = retained & 1 == 1;

    if quantization == QuantizationMode::StochWeighted {
        let discarded = mantissa & ((1u128 << shift_amount) - 1);
        if quantize::stochastic_weighted_carry(discarded, shift_amount, rng) {
            retained += 1;
        }
    } else {
        let outcome = quantize::decide(quantization, sign, retained_lsb, g, t, rng);
        if outcome.force_lsb_one {
            retained |= 1;
        } else if outcome.add_ulp {
            retained += 1;
        }
    }
    retained
}

/// Rebias, handle the post-cast-subnormal shift, quantize, resolve the
/// rounding carry, and resolve overflow — the shared tail of every
/// arithmetic op and of the cast engine's steps 4-8. Overflow always
/// resolves through `quantization.rounds_to_infinity`.
fn finish(
    mantissa: u128,
    src_hidden_bit: u32,
    true_exp: i64,
    dst_spec: FloatSpec,
    sign: bool,
    quantization: QuantizationMode,
    rng: &mut StochasticRng,
) -> FloatData {
    let mut exp = true_exp + dst_spec.bias as i64;
    let mut shift = dst_spec.man_bits as i64 - src_hidden_bit as i64;
    if exp <= 0 {
        shift -= 1 - exp;
        exp = 0;
    }
    let man_with_hidden = align_mantissa128(mantissa, shift, quantization, sign, rng);

    let (man_with_hidden, exp) = if exp == 0 {
        if man_with_hidden >= (1u128 << dst_spec.man_bits) {
            (man_with_hidden, 1i64)
        } else {
            (man_with_hidden, 0i64)
        }
    } else if man_with_hidden >= (1u128 << (dst_spec.man_bits + 1)) {
        (man_with_hidden >> 1, exp + 1)
    } else {
        (man_with_hidden, exp)
    };

    if exp >= dst_spec.max_exp() as i64 {
        return if quantization.rounds_to_infinity(sign) {
            FloatData::infinity(sign, dst_spec)
        } else {
            FloatData {
                sign,
                exp: dst_spec.max_exp() - 1,
                man: (1u64 << dst_spec.man_bits) - 1,
            }
        };
    }

    let man = (man_with_hidden & ((1u128 << dst_spec.man_bits) - 1)) as u64;
    FloatData {
        sign,
        exp: exp as u64,
        man,
    }
}

/// Normalize `raw` (whose hidden bit is nominally at `nominal_hidden_bit`,
/// with the pre-normalization exponent `true_exp_base`) and finish through
/// the shared rounding tail. `raw == 0` collapses to a signed zero —
/// callers are expected to have already ruled out NaN/inf operands.
fn finish_from_raw(
    raw: u128,
    nominal_hidden_bit: u32,
    true_exp_base: i64,
    dst_spec: FloatSpec,
    sign: bool,
    quantization: QuantizationMode,
    rng: &mut StochasticRng,
) -> FloatData {
    if raw == 0 {
        return FloatData::zero(sign);
    }
    let p = 127 - raw.leading_zeros();
    let true_exp = true_exp_base + (p as i64 - nominal_hidden_bit as i64);
    finish(raw, p, true_exp, dst_spec, sign, quantization, rng)
}

fn add_sub_impl(
    a: FloatData,
    b: FloatData,
    b_sign_flip: bool,
    spec: FloatSpec,
    quantization: QuantizationMode,
    rng: &mut StochasticRng,
) -> FloatData {
    let b_sign = b.sign ^ b_sign_flip;

    if a.is_nan(spec) || b.is_nan(spec) {
        return FloatData::nan(spec);
    }
    if a.is_inf(spec) && b.is_inf(spec) {
        return if a.sign == b_sign {
            FloatData::infinity(a.sign, spec)
        } else {
            FloatData::nan(spec)
        };
    }
    if a.is_inf(spec) {
        return FloatData::infinity(a.sign, spec);
    }
    if b.is_inf(spec) {
        return FloatData::infinity(b_sign, spec);
    }
    if a.is_zero() && b.is_zero() {
        return FloatData::zero(a.sign && b_sign);
    }
    if a.is_zero() {
        return FloatData { sign: b_sign, ..b };
    }
    if b.is_zero() {
        return a;
    }

    let (ma, ea) = decompose(a, spec);
    let (mb, eb) = decompose(b, spec);
    let a_ext = ma << EXTRA;
    let b_ext = mb << EXTRA;

    let exp_result = ea.max(eb);
    let shift_a = (exp_result - ea) as u32;
    let shift_b = (exp_result - eb) as u32;
    let a_aligned = shift_with_sticky(a_ext, shift_a);
    let b_aligned = shift_with_sticky(b_ext, shift_b);

    let (sum, sign) = if a.sign == b_sign {
        (a_aligned + b_aligned, a.sign)
    } else if a_aligned >= b_aligned {
        (a_aligned - b_aligned, a.sign)
    } else {
        (b_aligned - a_aligned, b_sign)
    };

    finish_from_raw(sum, spec.man_bits + EXTRA, exp_result, spec, sign, quantization, rng)
}

fn shift_with_sticky(x: u128, shift: u32) -> u128 {
    if shift == 0 {
        return x;
    }
    if shift >= 128 {
        return if x != 0 { 1 } else { 0 };
    }
    let dropped = x & ((1u128 << shift) - 1) != 0;
    let mut shifted = x >> shift;
    if dropped {
        shifted |= 1;
    }
    shifted
}

pub fn add(a: FloatData, b: FloatData, spec: FloatSpec, rng: &mut StochasticRng) -> FloatData {
    add_sub_impl(a, b, false, spec, crate::context::float_quantization_mode(), rng)
}

pub fn sub(a: FloatData, b: FloatData, spec: FloatSpec, rng: &mut StochasticRng) -> FloatData {
    add_sub_impl(a, b, true, spec, crate::context::float_quantization_mode(), rng)
}

pub fn mul(a: FloatData, b: FloatData, spec: FloatSpec, rng: &mut StochasticRng) -> FloatData {
    let quantization = crate::context::float_quantization_mode();
    let sign = a.sign ^ b.sign;

    if a.is_nan(spec) || b.is_nan(spec) {
        return FloatData::nan(spec);
    }
    let a_inf = a.is_inf(spec);
    let b_inf = b.is_inf(spec);
    if (a_inf && b.is_zero()) || (b_inf && a.is_zero()) {
        return FloatData::nan(spec);
    }
    if a_inf || b_inf {
        return FloatData::infinity(sign, spec);
    }
    if a.is_zero() || b.is_zero() {
        return FloatData::zero(sign);
    }

    let (ha, ea) = decompose(a, spec);
    let (hb, eb) = decompose(b, spec);
    let product = ha * hb;
    finish_from_raw(product, 2 * spec.man_bits, ea + eb, spec, sign, quantization, rng)
}

pub fn div(a: FloatData, b: FloatData, spec: FloatSpec, rng: &mut StochasticRng) -> FloatData {
    let quantization = crate::context::float_quantization_mode();
    let sign = a.sign ^ b.sign;

    if a.is_nan(spec) || b.is_nan(spec) {
        return FloatData::nan(spec);
    }
    let a_inf = a.is_inf(spec);
    let b_inf = b.is_inf(spec);
    if a_inf && b_inf {
        return FloatData::nan(spec);
    }
    if a.is_zero() && b.is_zero() {
        return FloatData::nan(spec);
    }
    if b_inf {
        return FloatData::zero(sign);
    }
    if a_inf {
        return FloatData::infinity(sign, spec);
    }
    if b.is_zero() {
        return FloatData::infinity(sign, spec);
    }
    if a.is_zero() {
        return FloatData::zero(sign);
    }

    let (ha, ea) = decompose(a, spec);
    let (hb, eb) = decompose(b, spec);
    let shift = spec.man_bits + EXTRA;
    let numerator = ha << shift;
    let quotient = numerator / hb;
    let remainder = numerator % hb;
    let raw = if remainder != 0 { quotient | 1 } else { quotient };

    finish_from_raw(raw, spec.man_bits + EXTRA, ea - eb, spec, sign, quantization, rng)
}

/// `x * 2^n`: relabel the exponent and re-run the cast
/// machinery so over/underflow are handled uniformly.
pub fn scalbn(x: FloatData, spec: FloatSpec, n: i64) -> FloatData {
    if x.is_nan(spec) || x.is_inf(spec) || x.is_zero() {
        return x;
    }
    let (mantissa, true_exp) = decompose(x, spec);
    let mut rng = StochasticRng::from_seed(0);
    finish(
        mantissa,
        spec.man_bits,
        true_exp + n,
        spec,
        x.sign,
        crate::context::float_quantization_mode(),
        &mut rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> FloatSpec {
        FloatSpec::ieee_double()
    }

    fn rng() -> StochasticRng {
        StochasticRng::from_seed(3)
    }

    fn from_f64(v: f64, s: FloatSpec) -> FloatData {
        let bits = v.to_bits();
        FloatData::new((bits >> 63) & 1 == 1, (bits >> 52) & 0x7FF, bits & ((1u64 << 52) - 1), s)
    }

    fn to_f64(d: FloatData) -> f64 {
        f64::from_bits(((d.sign as u64) << 63) | (d.exp << 52) | d.man)
    }

    #[test]
    fn add_matches_host_f64() {
        let s = spec();
        let a = from_f64(1.5, s);
        let b = from_f64(2.25, s);
        let out = add(a, b, s, &mut rng());
        assert_eq!(to_f64(out), 3.75);
    }

    #[test]
    fn sub_cancellation_to_zero() {
        let s = spec();
        let a = from_f64(1.5, s);
        let out = sub(a, a, s, &mut rng());
        assert!(out.is_zero());
    }

    #[test]
    fn mul_matches_host_f64() {
        let s = spec();
        let a = from_f64(1.5, s);
        let b = from_f64(-2.0, s);
        let out = mul(a, b, s, &mut rng());
        assert_eq!(to_f64(out), -3.0);
    }

    #[test]
    fn div_matches_host_f64() {
        let s = spec();
        let a = from_f64(7.0, s);
        let b = from_f64(2.0, s);
        let out = div(a, b, s, &mut rng());
        assert_eq!(to_f64(out), 3.5);
    }

    #[test]
    fn div_by_zero_is_signed_infinity() {
        let s = spec();
        let a = from_f64(1.0, s);
        let b = FloatData::zero(true);
        let out = div(a, b, s, &mut rng());
        assert!(out.is_inf(s));
        assert!(out.sign);
    }

    #[test]
    fn zero_over_zero_is_nan() {
        let s = spec();
        let out = div(FloatData::zero(false), FloatData::zero(false), s, &mut rng());
        assert!(out.is_nan(s));
    }

    #[test]
    fn inf_minus_inf_is_nan() {
        let s = spec();
        let inf = FloatData::infinity(false, s);
        let out = sub(inf, inf, s, &mut rng());
        assert!(out.is_nan(s));
    }

    #[test]
    fn scalbn_matches_manual_scaling() {
        let s = spec();
        let a = from_f64(1.25, s);
        let out = scalbn(a, s, 3);
        assert_eq!(to_f64(out), 10.0);
    }
}
