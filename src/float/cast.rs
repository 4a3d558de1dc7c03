//! Floating-point cast engine: normalize, rebias, quantize
//! the mantissa and handle the rounding carry, then resolve overflow.
//!
//! Every value is decomposed into `(mantissa_with_hidden, true_exp)` such
//! that `value = mantissa_with_hidden * 2^(true_exp - src_spec.man_bits)`,
//! the same "hidden-bit-included, one uniform exponent" shape
//! `apyfloat_util.h`'s cast routine folds subnormal and normal operands
//! into before quantizing — this lets the rest of the pipeline treat both
//! as a single mantissa/exponent pair instead of branching throughout.

use crate::quantize::{self, QuantizationMode};
use crate::rng::StochasticRng;

use super::spec::{FloatData, FloatSpec};

/// Cast `src` (laid out per `src_spec`) to `dst_spec`. Overflow always
/// resolves through `quantization.rounds_to_infinity`; floats have no
/// separate overflow mode to configure.
pub fn cast(
    src: FloatData,
    src_spec: FloatSpec,
    dst_spec: FloatSpec,
    quantization: QuantizationMode,
    rng: &mut StochasticRng,
) -> FloatData {
    let sign = src.sign;

    // Step 1: special values propagate as-is (re-tagged to dst's widths).
    if src.exp == src_spec.max_exp() {
        return if src.man == 0 {
            FloatData::infinity(sign, dst_spec)
        } else {
            FloatData::nan(dst_spec)
        };
    }
    // Step 2: zero.
    if src.is_zero() {
        return FloatData::zero(sign);
    }

    // Step 3: normalize subnormal operands into the same
    // hidden-bit-included representation as normal ones.
    let (mantissa, true_exp): (u64, i64) = if src.exp == 0 {
        let mut m = src.man;
        let mut shift = 0i64;
        while m & (1u64 << src_spec.man_bits) == 0 {
            m <<= 1;
            shift += 1;
        }
        (m, 1 - src_spec.bias as i64 - shift)
    } else {
        (src.man | (1u64 << src_spec.man_bits), src.exp as i64 - src_spec.bias as i64)
    };

    // Step 4: rebias against the destination's bias.
    let mut exp = true_exp + dst_spec.bias as i64;

    // `shift` aligns the mantissa's bit width: positive widens (exact),
    // negative narrows (needs quantization of the dropped low bits).
    let mut shift = dst_spec.man_bits as i64 - src_spec.man_bits as i64;

    // Step 5: post-cast subnormal — if the rebiased exponent isn't
    // representable, shift the extra distance into the mantissa instead
    // and clamp the stored exponent to zero.
    if exp <= 0 {
        shift -= 1 - exp;
        exp = 0;
    }

    let man_with_hidden = align_mantissa(mantissa, shift, quantization, sign, rng);

    // Step 6/7: rounding may have carried the mantissa out of its field,
    // or (from the subnormal branch) carried it up into the hidden-bit
    // position, promoting exp from 0 to 1.
    let (man_with_hidden, exp) = if exp == 0 {
        if man_with_hidden >= (1u64 << dst_spec.man_bits) {
            (man_with_hidden, 1i64)
        } else {
            (man_with_hidden, 0i64)
        }
    } else if man_with_hidden >= (1u64 << (dst_spec.man_bits + 1)) {
        (man_with_hidden >> 1, exp + 1)
    } else {
        (man_with_hidden, exp)
    };

    // Step 8: overflow.
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

    let man = man_with_hidden & ((1u64 << dst_spec.man_bits) - 1);
    FloatData {
        sign,
        exp: exp as u64,
        man,
    }
}

/// Widen (exact) or narrow (quantized) `mantissa` by `shift` bits, guarding
/// against shift amounts wider than the host word.
fn align_mantissa(
    mantissa: u64,
    shift: i64,
    quantization: QuantizationMode,
    sign: bool,
    rng: &mut StochasticRng,
) -> u64 {
    if shift >= 0 {
        let shift = shift.min(63) as u32;
        return mantissa << shift;
    }
    let shift_amount = (-shift) as u32;
    if shift_amount >= 64 {
        // Every bit of the source mantissa is discarded; only whether the
        // magnitude was nonzero (sticky) survives.
        let outcome = quantize::decide(quantization, sign, false, false, mantissa != 0, rng);
        return if outcome.force_lsb_one || outcome.add_ulp {
            1
        } else {
            0
        };
    }
    let g = (mantissa >> (shift_amount - 1)) & 1 == 1;
    let t_mask = (1u64 << (shift_amount - 1)) - 1;
    let t = (mantissa & t_mask) != 0;
    let mut retained = mantissa >> shift_amount;
    let retained_lsb = retained & 1 == 1;

    if quantization == QuantizationMode::StochWeighted {
        let discarded = (mantissa & ((1u64 << shift_amount) - 1)) as u128;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(exp_bits: u32, man_bits: u32, bias: u64) -> FloatSpec {
        FloatSpec::new(exp_bits, man_bits, bias).unwrap()
    }

    fn rng() -> StochasticRng {
        StochasticRng::from_seed(11)
    }

    #[test]
    fn widening_is_exact() {
        let src_spec = spec(5, 4, 15);
        let dst_spec = spec(8, 10, 127);
        // 1.0625 = 1.0001b -> exp=16 (true_exp=1), man=0b0001
        let src = FloatData::new(false, 16, 0b0001, src_spec);
        let out = cast(
            src,
            src_spec,
            dst_spec,
            QuantizationMode::RndConv,
            &mut rng(),
        );
        assert_eq!(out.exp, 128);
        assert_eq!(out.man, 0b0001_000000);
    }

    #[test]
    fn narrowing_rounds_ties_to_even() {
        let src_spec = spec(8, 10, 127);
        let dst_spec = spec(5, 4, 15);
        // man bits 0b0001_100000 -> dropping 6 bits, guard=1, sticky=0,
        // retained LSB = 1 (odd) -> rounds up per RNE.
        let src = FloatData::new(false, 128, 0b0001_100000, src_spec);
        let out = cast(
            src,
            src_spec,
            dst_spec,
            QuantizationMode::RndConv,
            &mut rng(),
        );
        assert_eq!(out.exp, 16);
        assert_eq!(out.man, 0b0010);
    }

    #[test]
    fn overflow_saturates_to_max_normal_for_trn_zero() {
        let src_spec = spec(8, 10, 127);
        let dst_spec = spec(4, 3, 7);
        // a huge exponent under dst's narrower bias overflows.
        let src = FloatData::new(false, 250, 0, src_spec);
        let out = cast(
            src,
            src_spec,
            dst_spec,
            QuantizationMode::TrnZero,
            &mut rng(),
        );
        assert_eq!(out.exp, dst_spec.max_exp() - 1);
        assert_eq!(out.man, (1u64 << dst_spec.man_bits) - 1);
    }

    #[test]
    fn overflow_rounds_to_infinity_by_default() {
        let src_spec = spec(8, 10, 127);
        let dst_spec = spec(4, 3, 7);
        let src = FloatData::new(false, 250, 0, src_spec);
        let out = cast(
            src,
            src_spec,
            dst_spec,
            QuantizationMode::RndInf,
            &mut rng(),
        );
        assert!(out.is_inf(dst_spec));
    }

    #[test]
    fn subnormal_source_normalizes() {
        let src_spec = spec(5, 4, 15);
        // smallest subnormal: man=1, exp=0 -> value = 2^(1-15-4) = 2^-18
        let src = FloatData::new(false, 0, 1, src_spec);
        let dst_spec = spec(8, 10, 127);
        let out = cast(
            src,
            src_spec,
            dst_spec,
            QuantizationMode::RndConv,
            &mut rng(),
        );
        // 2^-18 in dst's bias 127 space: exp = 127-18 = 109, man = 0 (exact power of two).
        assert_eq!(out.exp, 109);
        assert_eq!(out.man, 0);
    }

    #[test]
    fn special_values_pass_through() {
        let s = spec(5, 4, 15);
        let d = spec(8, 10, 127);
        let inf = FloatData::infinity(true, s);
        let out = cast(
            inf,
            s,
            d,
            QuantizationMode::RndConv,
            &mut rng(),
        );
        assert!(out.is_inf(d));
        assert!(out.sign);

        let nan = FloatData::nan(s);
        let out = cast(
            nan,
            s,
            d,
            QuantizationMode::RndConv,
            &mut rng(),
        );
        assert!(out.is_nan(d));
    }
}
