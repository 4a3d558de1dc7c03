//! Fixed-point cast engine: align fractional bases, quantize
//! the discarded bits, then apply overflow handling.
//!
//! Quantization operates on the absolute magnitude with the sign carried as
//! a separate flag, mirroring `apyfloat_util.h`'s `_qntz_func` (which
//! quantizes an unsigned mantissa and a separate `sign` bool) — the same
//! G/R/T vocabulary and per-mode table in [`crate::quantize`] is shared
//! verbatim between this cast engine and the floating-point one.

use crate::limb::{self, Limb};
use crate::quantize::{self, OverflowMode, QuantizationMode};
use crate::rng::StochasticRng;

use super::spec::FixedSpec;

/// Cast the two's-complement value `src` (laid out per `src_spec`) to
/// `dst_spec`, returning exactly `dst_spec.limbs()` limbs.
pub fn cast(
    src: &[Limb],
    src_spec: FixedSpec,
    dst_spec: FixedSpec,
    quantization: QuantizationMode,
    overflow: OverflowMode,
    rng: &mut StochasticRng,
) -> Vec<Limb> {
    debug_assert_eq!(src.len(), src_spec.limbs());
    let sign = limb::is_negative(src);

    // Work in magnitude space with one spare limb so intermediate growth
    // (alignment shift, +1 ULP rounding carry) never overflows before the
    // final overflow-mode truncation.
    let work_limbs = src_spec.limbs().max(dst_spec.limbs()) + 2;
    let mut mag = vec![0 as Limb; work_limbs];
    {
        let mut src_ext = vec![0 as Limb; work_limbs];
        limb::sign_extend(&mut src_ext, src);
        limb::abs(&mut mag, &src_ext);
    }

    let frac_diff = dst_spec.frac_bits() - src_spec.frac_bits();
    if frac_diff >= 0 {
        let shift = frac_diff as usize;
        let mut shifted = vec![0 as Limb; work_limbs];
        limb::lsl(&mut shifted, &mag, shift);
        mag = shifted;
    } else {
        let shift_amount = (-frac_diff) as usize;
        let g = if shift_amount >= 1 {
            limb::test_bit(&mag, shift_amount - 1)
        } else {
            false
        };
        let t = if shift_amount >= 1 {
            limb::or_reduce_low_n_bits(&mag, shift_amount - 1)
        } else {
            false
        };

        let mut retained = vec![0 as Limb; work_limbs];
        limb::lsr(&mut retained, &mag, shift_amount);
        let retained_lsb = limb::test_bit(&retained, 0);

        if quantization == QuantizationMode::StochWeighted {
            let bits = shift_amount.min(128) as u32;
            let discarded = limb::low_bits_as_u128(&mag, bits as usize);
            if quantize::stochastic_weighted_carry(discarded, bits, rng) {
                limb::add_pow2(&mut retained, 0);
            }
        } else {
            let outcome = quantize::decide(quantization, sign, retained_lsb, g, t, rng);
            if outcome.force_lsb_one {
                limb::set_bit(&mut retained, 0, true);
            } else if outcome.add_ulp {
                limb::add_pow2(&mut retained, 0);
            }
        }
        mag = retained;
    }

    // Reapply sign.
    let mut signed = vec![0 as Limb; work_limbs];
    if sign {
        limb::neg(&mut signed, &mag);
    } else {
        signed.copy_from_slice(&mag);
    }

    apply_overflow(&signed, dst_spec, overflow)
}

/// Reduce a (possibly wider) working buffer to `dst_spec.bits`, applying the
/// chosen overflow policy.
pub(crate) fn apply_overflow(value: &[Limb], dst_spec: FixedSpec, overflow: OverflowMode) -> Vec<Limb> {
    let dst_limbs = dst_spec.limbs();
    let mut out = vec![0 as Limb; dst_limbs];
    match overflow {
        OverflowMode::Wrap | OverflowMode::NumericStd => {
            out.copy_from_slice(&value[..dst_limbs]);
            limb::truncate_to_bits(&mut out, dst_spec.bits);
        }
        OverflowMode::Sat => {
            if fits(value, dst_spec) {
                out.copy_from_slice(&value[..dst_limbs]);
                limb::truncate_to_bits(&mut out, dst_spec.bits);
            } else if limb::is_negative(value) {
                saturate_min(&mut out, dst_spec);
            } else {
                saturate_max(&mut out, dst_spec);
            }
        }
    }
    out
}

/// Does `value` (two's complement, wider buffer) fit in `dst_spec.bits`
/// without truncation changing its value?
fn fits(value: &[Limb], dst_spec: FixedSpec) -> bool {
    let mut truncated = value[..dst_spec.limbs()].to_vec();
    limb::truncate_to_bits(&mut truncated, dst_spec.bits);
    let mut re_extended = vec![0 as Limb; value.len()];
    limb::sign_extend(&mut re_extended, &truncated);
    re_extended == value
}

fn saturate_max(out: &mut [Limb], dst_spec: FixedSpec) {
    // 0111...1 (bits-1 ones, sign bit zero).
    out.fill(Limb::MAX);
    limb::set_bit(out, dst_spec.bits - 1, false);
    for limb in &mut out[limb::bits_to_limbs(dst_spec.bits)..] {
        *limb = 0;
    }
}

fn saturate_min(out: &mut [Limb], dst_spec: FixedSpec) {
    // 1000...0 (only the sign bit set).
    out.fill(0);
    limb::set_bit(out, dst_spec.bits - 1, true);
    // sign-extend the top limb above bits-1 within its own limb.
    let limb_idx = (dst_spec.bits - 1) / limb::LIMB_BITS as usize;
    let bit_idx = (dst_spec.bits - 1) % limb::LIMB_BITS as usize;
    if bit_idx + 1 < limb::LIMB_BITS as usize {
        out[limb_idx] |= !((1u128 << (bit_idx + 1)) as Limb - 1);
    }
    for limb in &mut out[limb_idx + 1..] {
        *limb = Limb::MAX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> StochasticRng {
        StochasticRng::from_seed(7)
    }

    #[test]
    fn widen_is_value_preserving() {
        // 0.625 = 0b0101 at (bits=4, int_bits=1, frac_bits=3)
        let src_spec = FixedSpec::new(4, 1).unwrap();
        let dst_spec = FixedSpec::new(8, 3).unwrap(); // frac_bits 5, widened
        let src = [0b0101u64];
        let out = cast(
            &src,
            src_spec,
            dst_spec,
            QuantizationMode::RndConv,
            OverflowMode::Wrap,
            &mut rng(),
        );
        // widened by 2 frac bits: 0b010100
        assert_eq!(out[0], 0b010100);
    }

    #[test]
    fn cast_rnd_conv_scenario() {
        // FX-cast-rnd-conv: a = 0b0101 at (int_bits=1, frac_bits=3) = 0.625
        // cast to (int_bits=1, frac_bits=1), RND_CONV -> 0.5 (ties to even)
        let src_spec = FixedSpec::new(4, 1).unwrap();
        let dst_spec = FixedSpec::new(2, 1).unwrap();
        let src = [0b0101u64];
        let out = cast(
            &src,
            src_spec,
            dst_spec,
            QuantizationMode::RndConv,
            OverflowMode::Wrap,
            &mut rng(),
        );
        // 0.5 at frac_bits=1 -> bit pattern 0b01
        assert_eq!(out[0] & 0b11, 0b01);
    }

    #[test]
    fn saturate_clamps_positive_overflow() {
        let src_spec = FixedSpec::new(8, 8).unwrap();
        let dst_spec = FixedSpec::new(4, 4).unwrap();
        let src = [0b0111_1111u64]; // 127, doesn't fit in 4 bits signed (-8..7)
        let out = cast(
            &src,
            src_spec,
            dst_spec,
            QuantizationMode::Trn,
            OverflowMode::Sat,
            &mut rng(),
        );
        assert_eq!(out[0] & 0xF, 0b0111); // max 4-bit signed value: 7
    }

    #[test]
    fn wrap_truncates_silently() {
        let src_spec = FixedSpec::new(8, 8).unwrap();
        let dst_spec = FixedSpec::new(4, 4).unwrap();
        let src = [0b0111_1111u64];
        let out = cast(
            &src,
            src_spec,
            dst_spec,
            QuantizationMode::Trn,
            OverflowMode::Wrap,
            &mut rng(),
        );
        assert_eq!(out[0] & 0xF, 0b1111); // wraps to -1
    }
}
