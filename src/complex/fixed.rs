//! `ComplexFixedPoint`: a pair of [`FixedPoint`] values sharing one spec
//!.

use crate::fixed::{FixedPoint, FixedSpec};

/// `re + im*i`, both components the same [`FixedSpec`].
#[derive(Clone, Debug)]
pub struct ComplexFixedPoint {
    re: FixedPoint,
    im: FixedPoint,
}

impl ComplexFixedPoint {
    pub fn new(re: FixedPoint, im: FixedPoint) -> Self {
        debug_assert_eq!(re.spec(), im.spec(), "real/imaginary parts must share a spec");
        Self { re, im }
    }

    pub fn zero(spec: FixedSpec) -> Self {
        Self::new(FixedPoint::zero(spec), FixedPoint::zero(spec))
    }

    pub fn re(&self) -> &FixedPoint {
        &self.re
    }

    pub fn im(&self) -> &FixedPoint {
        &self.im
    }

    pub fn spec(&self) -> FixedSpec {
        self.re.spec()
    }

    pub fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    /// Component-wise.
    pub fn add(&self, other: &Self) -> Self {
        Self::new(self.re.add(&other.re), self.im.add(&other.im))
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self::new(self.re.sub(&other.re), self.im.sub(&other.im))
    }

    /// `(a+bi)(c+di) = (ac−bd) + (ad+bc)i`; every partial product and sum
    /// is computed through [`FixedPoint`]'s own value-preserving result
    /// spec, so nothing here rounds or overflows before the caller
    /// explicitly casts the result down.
    pub fn mul(&self, other: &Self) -> Self {
        let ac = self.re.mul(&other.re);
        let bd = self.im.mul(&other.im);
        let ad = self.re.mul(&other.im);
        let bc = self.im.mul(&other.re);
        Self::new(ac.sub(&bd), ad.add(&bc))
    }

    /// Smith's scaled division: scale the divisor's
    /// components down by `2^-k` (`k = floor(log2(max(|c|,|d|)))`) before
    /// squaring, so `c²+d²` never overflows the way it would computed at
    /// full scale, then rescale the quotient by `2^-k` to correct for it.
    ///
    /// Fixed-point values have no infinity/NaN representation, so the C99
    /// Annex G inf-recovery rules don't apply here — those rules govern
    /// [`crate::complex::ComplexFloat`] division
    /// instead. The only edge case a fixed-point divisor has is an exact
    /// zero, handled the same way scalar [`FixedPoint::div`] handles it:
    /// zero out rather than propagate.
    pub fn div(&self, other: &Self) -> Self {
        if other.is_zero() {
            return Self::zero(self.re.spec().div_result_spec(&other.re.spec()));
        }
        let k = other.re.floor_log2_abs().max(other.im.floor_log2_abs());
        let c_s = other.re.shift_left(-k);
        let d_s = other.im.shift_left(-k);

        let denom = c_s.mul(&c_s).add(&d_s.mul(&d_s));
        let real_num = self.re.mul(&c_s).add(&self.im.mul(&d_s));
        let imag_num = self.im.mul(&c_s).sub(&self.re.mul(&d_s));

        let qre = real_num.div(&denom).shift_left(-k);
        let qim = imag_num.div(&denom).shift_left(-k);
        Self::new(qre, qim)
    }
}
