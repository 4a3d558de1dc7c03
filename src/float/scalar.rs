//! `FloatPoint`: the arbitrary-precision floating-point scalar.

use crate::error::AtResult;
use crate::quantize::QuantizationMode;
use crate::rng::StochasticRng;

use super::arith;
use super::cast;
use super::spec::{FloatData, FloatSpec};

/// A single floating-point value: `(exp_bits, man_bits, bias)`-parameterized
/// sign/exponent/mantissa triple.
#[derive(Clone, Copy, Debug)]
pub struct FloatPoint {
    data: FloatData,
    spec: FloatSpec,
}

impl FloatPoint {
    pub fn spec(&self) -> FloatSpec {
        self.spec
    }

    pub fn data(&self) -> FloatData {
        self.data
    }

    fn from_parts(spec: FloatSpec, data: FloatData) -> Self {
        Self { data, spec }
    }

    /// From an exact `(sign, exp, man)` bit pattern.
    pub fn from_bits(sign: bool, exp: u64, man: u64, spec: FloatSpec) -> Self {
        Self::from_parts(spec, FloatData::new(sign, exp, man, spec))
    }

    pub fn to_bits(&self) -> (bool, u64, u64) {
        (self.data.sign, self.data.exp, self.data.man)
    }

    pub fn zero(sign: bool, spec: FloatSpec) -> Self {
        Self::from_parts(spec, FloatData::zero(sign))
    }

    pub fn infinity(sign: bool, spec: FloatSpec) -> Self {
        Self::from_parts(spec, FloatData::infinity(sign, spec))
    }

    pub fn nan(spec: FloatSpec) -> Self {
        Self::from_parts(spec, FloatData::nan(spec))
    }

    pub fn is_nan(&self) -> bool {
        self.data.is_nan(self.spec)
    }

    pub fn is_inf(&self) -> bool {
        self.data.is_inf(self.spec)
    }

    pub fn is_zero(&self) -> bool {
        self.data.is_zero()
    }

    /// From a host double, by casting IEEE 754 double's own bit pattern
    /// through the cast engine — this keeps every rounding/overflow edge
    /// case in one place instead of duplicating the cast engine's logic
    /// here.
    pub fn from_f64(value: f64, spec: FloatSpec) -> Self {
        Self::from_f64_rounded(value, spec, QuantizationMode::RndConv)
    }

    pub fn from_f64_rounded(value: f64, spec: FloatSpec, quantization: QuantizationMode) -> Self {
        let double_spec = FloatSpec::ieee_double();
        let bits = value.to_bits();
        let sign = (bits >> 63) & 1 == 1;
        let exp = (bits >> 52) & 0x7FF;
        let man = bits & ((1u64 << 52) - 1);
        let src = FloatData::new(sign, exp, man, double_spec);
        let mut rng = StochasticRng::from_seed(0);
        let data = cast::cast(src, double_spec, spec, quantization, &mut rng);
        Self::from_parts(spec, data)
    }

    /// `to_double()`: cast to IEEE 754 double precision with
    /// `RND_CONV`, then reinterpret the resulting bit pattern as an `f64`.
    pub fn to_f64(&self) -> f64 {
        let double_spec = FloatSpec::ieee_double();
        let mut rng = StochasticRng::from_seed(0);
        let data = cast::cast(self.data, self.spec, double_spec, QuantizationMode::RndConv, &mut rng);
        let bits = ((data.sign as u64) << 63) | (data.exp << 52) | data.man;
        f64::from_bits(bits)
    }

    /// Parse a decimal literal by routing through the host `f64` parser and
    /// then the cast engine — exact for any value within double precision's
    /// range, which covers every format this crate can usefully round-trip
    /// through `from_f64`/`to_f64` anyway.
    pub fn from_str(s: &str, spec: FloatSpec) -> AtResult<Self> {
        let trimmed = s.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| crate::error::AtError::value_invalid(format!("'{s}' is not a valid float literal")))?;
        Ok(Self::from_f64(value, spec))
    }

    pub fn to_string_repr(&self) -> String {
        if self.is_nan() {
            return "nan".to_string();
        }
        if self.is_inf() {
            return if self.data.sign {
                "-inf".to_string()
            } else {
                "inf".to_string()
            };
        }
        format!("{}", self.to_f64())
    }

    /// Cast to `dst_spec` using the shared quantization vocabulary. Overflow
    /// always resolves through `quantization.rounds_to_infinity`.
    pub fn cast(&self, dst_spec: FloatSpec, quantization: QuantizationMode, rng: &mut StochasticRng) -> Self {
        let data = cast::cast(self.data, self.spec, dst_spec, quantization, rng);
        Self::from_parts(dst_spec, data)
    }

    pub fn add(&self, other: &Self, rng: &mut StochasticRng) -> Self {
        assert_eq!(self.spec, other.spec, "add requires matching specs; cast first");
        let data = arith::add(self.data, other.data, self.spec, rng);
        Self::from_parts(self.spec, data)
    }

    pub fn sub(&self, other: &Self, rng: &mut StochasticRng) -> Self {
        assert_eq!(self.spec, other.spec, "sub requires matching specs; cast first");
        let data = arith::sub(self.data, other.data, self.spec, rng);
        Self::from_parts(self.spec, data)
    }

    pub fn mul(&self, other: &Self, rng: &mut StochasticRng) -> Self {
        assert_eq!(self.spec, other.spec, "mul requires matching specs; cast first");
        let data = arith::mul(self.data, other.data, self.spec, rng);
        Self::from_parts(self.spec, data)
    }

    pub fn div(&self, other: &Self, rng: &mut StochasticRng) -> Self {
        assert_eq!(self.spec, other.spec, "div requires matching specs; cast first");
        let data = arith::div(self.data, other.data, self.spec, rng);
        Self::from_parts(self.spec, data)
    }

    pub fn neg(&self) -> Self {
        let mut data = self.data;
        if !self.is_nan() {
            data.sign = !data.sign;
        }
        Self::from_parts(self.spec, data)
    }

    /// `x * 2^n`, exact unless it over/underflows.
    pub fn scalbn(&self, n: i64) -> Self {
        let data = arith::scalbn(self.data, self.spec, n);
        Self::from_parts(self.spec, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_f64_roundtrip_ieee_double_is_exact() {
        let spec = FloatSpec::ieee_double();
        let fp = FloatPoint::from_f64(3.25, spec);
        assert_eq!(fp.to_f64(), 3.25);
    }

    #[test]
    fn narrow_format_loses_precision_predictably() {
        let spec = FloatSpec::new(5, 10, 15).unwrap(); // IEEE "half"-ish
        let fp = FloatPoint::from_f64(1.0 / 3.0, spec);
        let back = fp.to_f64();
        assert!((back - 1.0 / 3.0).abs() < 1e-3);
    }

    #[test]
    fn zero_inf_nan_roundtrip() {
        let spec = FloatSpec::ieee_double();
        assert!(FloatPoint::zero(false, spec).is_zero());
        assert!(FloatPoint::infinity(true, spec).is_inf());
        assert!(FloatPoint::nan(spec).is_nan());
    }

    #[test]
    fn string_formatting() {
        let spec = FloatSpec::ieee_double();
        assert_eq!(FloatPoint::infinity(false, spec).to_string_repr(), "inf");
        assert_eq!(FloatPoint::infinity(true, spec).to_string_repr(), "-inf");
        assert_eq!(FloatPoint::nan(spec).to_string_repr(), "nan");
        let fp = FloatPoint::from_str("2.5", spec).unwrap();
        assert_eq!(fp.to_f64(), 2.5);
    }

    #[test]
    fn scalbn_is_exact_power_of_two_scaling() {
        let spec = FloatSpec::ieee_double();
        let fp = FloatPoint::from_f64(1.5, spec);
        let scaled = fp.scalbn(4);
        assert_eq!(scaled.to_f64(), 24.0);
    }
}
