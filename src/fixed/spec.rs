//! `FixedSpec`: the `(bits, int_bits)` pair that parameterizes every
//! fixed-point value.

use crate::error::{AtError, AtResult};
use crate::limb::bits_to_limbs;
use crate::quantize::{OverflowMode, QuantizationMode};

/// `bits` total and `int_bits` integer bits; `frac_bits = bits - int_bits`
/// may be negative (the value is then scaled by `2^frac_bits`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FixedSpec {
    pub bits: usize,
    pub int_bits: i64,
}

impl FixedSpec {
    /// Validates `bits >= 1`; `int_bits` has no independent range — it may
    /// legally exceed `bits` or be negative, in which case `frac_bits` is
    /// negative too.
    pub fn new(bits: usize, int_bits: i64) -> AtResult<Self> {
        if bits < 1 {
            return Err(AtError::spec_invalid(format!(
                "fixed-point bits must be >= 1, got {bits}"
            )));
        }
        Ok(Self { bits, int_bits })
    }

    /// Construct from any two of the three redundant specifiers
    /// (`bits`, `int_bits`, `frac_bits`). Supplying all three requires them
    /// to be mutually consistent.
    pub fn from_specifiers(
        bits: Option<usize>,
        int_bits: Option<i64>,
        frac_bits: Option<i64>,
    ) -> AtResult<Self> {
        match (bits, int_bits, frac_bits) {
            (Some(bits), Some(int_bits), None) => Self::new(bits, int_bits),
            (Some(bits), None, Some(frac_bits)) => Self::new(bits, bits as i64 - frac_bits),
            (None, Some(int_bits), Some(frac_bits)) => {
                Self::new((int_bits + frac_bits).max(0) as usize, int_bits)
            }
            (Some(bits), Some(int_bits), Some(frac_bits)) => {
                if bits as i64 - int_bits != frac_bits {
                    return Err(AtError::spec_invalid(
                        "bits, int_bits and frac_bits are mutually inconsistent",
                    ));
                }
                Self::new(bits, int_bits)
            }
            _ => Err(AtError::spec_invalid(
                "exactly two of bits, int_bits, frac_bits must be provided",
            )),
        }
    }

    pub fn frac_bits(&self) -> i64 {
        self.bits as i64 - self.int_bits
    }

    pub fn limbs(&self) -> usize {
        bits_to_limbs(self.bits)
    }

    /// The spec resulting from `self + other`.
    pub fn add_result_spec(&self, other: &FixedSpec) -> FixedSpec {
        let int_bits = self.int_bits.max(other.int_bits) + 1;
        let frac_bits = self.frac_bits().max(other.frac_bits());
        FixedSpec {
            bits: (int_bits + frac_bits).max(1) as usize,
            int_bits,
        }
    }

    /// The spec resulting from `self * other`.
    pub fn mul_result_spec(&self, other: &FixedSpec) -> FixedSpec {
        let int_bits = self.int_bits + other.int_bits;
        let frac_bits = self.frac_bits() + other.frac_bits();
        FixedSpec {
            bits: (int_bits + frac_bits).max(1) as usize,
            int_bits,
        }
    }

    /// The spec resulting from `self / other`.
    pub fn div_result_spec(&self, other: &FixedSpec) -> FixedSpec {
        let int_bits = self.int_bits + other.frac_bits() + 1;
        let frac_bits = self.frac_bits() + other.int_bits;
        FixedSpec {
            bits: (int_bits + frac_bits).max(1) as usize,
            int_bits,
        }
    }

    /// Negation widens `bits` by one to represent `-INT_MIN`.
    pub fn neg_result_spec(&self) -> FixedSpec {
        FixedSpec {
            bits: self.bits + 1,
            int_bits: self.int_bits + 1,
        }
    }
}

/// Default quantization/overflow applied by `cast` when the caller omits
/// them, and the process-wide default stored in [`crate::context`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedCastOption {
    pub quantization: QuantizationMode,
    pub overflow: OverflowMode,
}

impl Default for FixedCastOption {
    fn default() -> Self {
        Self {
            quantization: QuantizationMode::RndConv,
            overflow: OverflowMode::Wrap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_bits() {
        assert!(FixedSpec::new(0, 0).is_err());
    }

    #[test]
    fn negative_frac_bits_is_legal() {
        let spec = FixedSpec::new(4, 6).unwrap();
        assert_eq!(spec.frac_bits(), -2);
    }

    #[test]
    fn from_specifiers_requires_exactly_two() {
        assert!(FixedSpec::from_specifiers(None, None, Some(3)).is_err());
        assert!(FixedSpec::from_specifiers(Some(8), Some(4), None).is_ok());
    }

    #[test]
    fn from_specifiers_rejects_inconsistent_triple() {
        assert!(FixedSpec::from_specifiers(Some(8), Some(4), Some(5)).is_err());
        assert!(FixedSpec::from_specifiers(Some(8), Some(4), Some(4)).is_ok());
    }

    #[test]
    fn add_result_spec_matches_fx_add_widen_scenario() {
        let a = FixedSpec::new(6, 3).unwrap();
        let b = FixedSpec::new(6, 3).unwrap();
        let r = a.add_result_spec(&b);
        assert_eq!(r.int_bits, 4);
        assert_eq!(r.frac_bits(), 3);
    }
}
