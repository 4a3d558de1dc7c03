//! Shared quantization-mode vocabulary.
//!
//! Both the fixed-point cast engine (`fixed::cast`) and the floating-point
//! cast engine (`float::cast`) round using the same guard/round/sticky
//! (G/R/T) model and the same fifteen modes, dispatched through one
//! closure-free table (a plain `match` selected once per cast call) rather
//! than a compile-time-specialized template instantiated fifteen times per
//! call site — `decide` is small enough that profiling would be needed
//! before hand-specializing any one arm, and the hot limb-arithmetic loops
//! elsewhere in this crate are written as a single shared function body,
//! not duplicated per case.

use crate::rng::StochasticRng;

/// Rounding rule applied to the discarded low-order bits of a cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuantizationMode {
    /// Truncate (round toward the binary point's implied `-inf` for
    /// positive and `-inf` for negative alike, i.e. truncate in two's
    /// complement = round toward `-inf`).
    Trn,
    /// Truncate toward `+inf`.
    TrnInf,
    /// Truncate toward zero.
    TrnZero,
    /// Truncate away from zero.
    TrnAway,
    /// Truncate toward negative magnitude (sign-based truncation).
    TrnMag,
    /// Round, ties toward `+inf`.
    Rnd,
    /// Round, ties toward zero.
    RndZero,
    /// Round, ties away from zero.
    RndInf,
    /// Round, ties toward `-inf`.
    RndMinInf,
    /// Round, ties to even (convergent rounding).
    RndConv,
    /// Round, ties to odd.
    RndConvOdd,
    /// Jamming: force the retained LSB to one.
    Jam,
    /// Unbiased jamming: force the retained LSB to one only when bits were
    /// discarded.
    JamUnbiased,
    /// Stochastic rounding weighted by the discarded magnitude.
    StochWeighted,
    /// Stochastic rounding with even odds regardless of magnitude.
    StochEqual,
}

impl QuantizationMode {
    pub const ALL: [QuantizationMode; 15] = [
        QuantizationMode::Trn,
        QuantizationMode::TrnInf,
        QuantizationMode::TrnZero,
        QuantizationMode::TrnAway,
        QuantizationMode::TrnMag,
        QuantizationMode::Rnd,
        QuantizationMode::RndZero,
        QuantizationMode::RndInf,
        QuantizationMode::RndMinInf,
        QuantizationMode::RndConv,
        QuantizationMode::RndConvOdd,
        QuantizationMode::Jam,
        QuantizationMode::JamUnbiased,
        QuantizationMode::StochWeighted,
        QuantizationMode::StochEqual,
    ];

    /// Does this mode saturate to infinity (rather than to the greatest
    /// finite magnitude) on floating-point overflow, for a value of the
    /// given `sign`?
    pub fn rounds_to_infinity(self, sign: bool) -> bool {
        match self {
            QuantizationMode::TrnZero | QuantizationMode::Jam | QuantizationMode::JamUnbiased => {
                false
            }
            QuantizationMode::Trn => sign,
            QuantizationMode::TrnInf => !sign,
            _ => true,
        }
    }
}

/// Outcome of a quantization decision: whether to add one ULP to the
/// retained value, and (for `Jam`) whether to force its LSB to one.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuantizeOutcome {
    pub add_ulp: bool,
    pub force_lsb_one: bool,
}

/// Decide how to round given the guard bit `g`, the sticky bit `t` (OR of
/// every bit below guard), the sign of the value, and the LSB of the
/// already-retained magnitude (needed for ties-to-even/odd).
///
/// `StochWeighted` cannot be decided from `g`/`t` alone (it needs the full
/// discarded magnitude) — callers must special-case it using
/// [`stochastic_weighted_carry`] instead of calling this function.
pub fn decide(
    mode: QuantizationMode,
    sign: bool,
    retained_lsb: bool,
    g: bool,
    t: bool,
    rng: &mut StochasticRng,
) -> QuantizeOutcome {
    use QuantizationMode::*;
    let mut out = QuantizeOutcome::default();
    match mode {
        Trn => out.add_ulp = sign && (g || t),
        TrnInf => out.add_ulp = !sign && (g || t),
        TrnZero => out.add_ulp = false,
        TrnAway => out.add_ulp = g || t,
        TrnMag => out.add_ulp = sign,
        Rnd => out.add_ulp = g && (t || !sign),
        RndZero => out.add_ulp = g && t,
        RndInf => out.add_ulp = g,
        RndMinInf => out.add_ulp = g && (t || sign),
        RndConv => out.add_ulp = g && (retained_lsb || t),
        RndConvOdd => out.add_ulp = g && (!retained_lsb || t),
        Jam => {
            out.add_ulp = false;
            out.force_lsb_one = true;
        }
        JamUnbiased => {
            out.add_ulp = false;
            out.force_lsb_one = g || t;
        }
        StochEqual => out.add_ulp = (g || t) && rng.next_bit(),
        StochWeighted => {
            unreachable!("StochWeighted must be decided via stochastic_weighted_carry")
        }
    }
    out
}

/// Decide the `StochWeighted` rounding outcome given the discarded bits'
/// exact magnitude and bit count: draw a uniform value in
/// `[0, 2^discarded_bits)`, add it to the discarded magnitude, and report
/// whether the sum carries into the retained part.
///
/// `discarded_bits` must be `<= 128`. The stochastic addend is drawn at
/// least as wide as the value being quantized — this crate draws exactly
/// `discarded_bits` bits, which satisfies that bound and keeps the draw
/// reproducible from a seeded [`StochasticRng`].
pub fn stochastic_weighted_carry(
    discarded: u128,
    discarded_bits: u32,
    rng: &mut StochasticRng,
) -> bool {
    if discarded_bits == 0 {
        return false;
    }
    let weight = rng.next_below_u128(discarded_bits);
    let (_, carried) = if discarded_bits >= 128 {
        discarded.overflowing_add(weight)
    } else {
        let sum = discarded + weight;
        (sum, sum >= (1u128 << discarded_bits))
    };
    carried
}

/// Overflow handling applied after quantization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverflowMode {
    /// Two's-complement truncation: sign-extend the new MSB.
    Wrap,
    /// Clamp to the representable range.
    Sat,
    /// Language-defined variant of `Wrap` with fully specified behavior for
    /// every input (no UB to avoid in a Rust port, but kept distinct from
    /// `Wrap` to preserve the three-way vocabulary callers may match on).
    NumericStd,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::StochasticRng;

    #[test]
    fn trn_is_floor_like() {
        let mut rng = StochasticRng::from_seed(1);
        let o = decide(QuantizationMode::Trn, false, false, true, true, &mut rng);
        assert!(!o.add_ulp);
        let o = decide(QuantizationMode::Trn, true, false, true, true, &mut rng);
        assert!(o.add_ulp);
    }

    #[test]
    fn rnd_conv_ties_to_even() {
        let mut rng = StochasticRng::from_seed(1);
        // retained LSB even (0), guard set, no sticky: should not round up.
        let o = decide(QuantizationMode::RndConv, false, false, true, false, &mut rng);
        assert!(!o.add_ulp);
        // retained LSB odd (1): should round up to make it even.
        let o = decide(QuantizationMode::RndConv, false, true, true, false, &mut rng);
        assert!(o.add_ulp);
    }

    #[test]
    fn jam_forces_lsb() {
        let mut rng = StochasticRng::from_seed(1);
        let o = decide(QuantizationMode::Jam, false, false, false, false, &mut rng);
        assert!(o.force_lsb_one);
        assert!(!o.add_ulp);
    }

    #[test]
    fn stochastic_weighted_is_deterministic_per_seed() {
        let mut rng_a = StochasticRng::from_seed(42);
        let mut rng_b = StochasticRng::from_seed(42);
        let a = stochastic_weighted_carry(3, 4, &mut rng_a);
        let b = stochastic_weighted_carry(3, 4, &mut rng_b);
        assert_eq!(a, b);
    }
}
