//! `ComplexFloat`: a pair of [`FloatPoint`] values sharing one spec.

use crate::float::{FloatPoint, FloatSpec};
use crate::rng::StochasticRng;

/// `re + im*i`, both components the same [`FloatSpec`].
#[derive(Clone, Copy, Debug)]
pub struct ComplexFloat {
    re: FloatPoint,
    im: FloatPoint,
}

impl ComplexFloat {
    pub fn new(re: FloatPoint, im: FloatPoint) -> Self {
        debug_assert_eq!(re.spec(), im.spec(), "real/imaginary parts must share a spec");
        Self { re, im }
    }

    pub fn zero(spec: FloatSpec) -> Self {
        Self::new(FloatPoint::zero(false, spec), FloatPoint::zero(false, spec))
    }

    pub fn re(&self) -> FloatPoint {
        self.re
    }

    pub fn im(&self) -> FloatPoint {
        self.im
    }

    pub fn spec(&self) -> FloatSpec {
        self.re.spec()
    }

    pub fn add(&self, other: &Self, rng: &mut StochasticRng) -> Self {
        Self::new(self.re.add(&other.re, rng), self.im.add(&other.im, rng))
    }

    pub fn sub(&self, other: &Self, rng: &mut StochasticRng) -> Self {
        Self::new(self.re.sub(&other.re, rng), self.im.sub(&other.im, rng))
    }

    /// Four partial products (`ac`, `ad`, `bc`, `bd`), each a scalar float
    /// multiply, combined with two scalar float add/subs.
    /// Like scalar arithmetic, this runs one shared code path rather than
    /// width-specialized `same_wl`/`diff_wl`/`general` tiers — see
    /// [`crate::float::FloatPoint::mul`]'s doc comment.
    pub fn mul(&self, other: &Self, rng: &mut StochasticRng) -> Self {
        let ac = self.re.mul(&other.re, rng);
        let bd = self.im.mul(&other.im, rng);
        let ad = self.re.mul(&other.im, rng);
        let bc = self.im.mul(&other.re, rng);
        Self::new(ac.sub(&bd, rng), ad.add(&bc, rng))
    }

    /// Smith's scaled division with the C99 Annex G edge cases: a zero
    /// denominator with a finite numerator yields a signed infinity; an
    /// infinite numerator against a finite denominator yields infinity; a
    /// finite numerator against an infinite denominator yields signed zero.
    pub fn div(&self, other: &Self, rng: &mut StochasticRng) -> Self {
        let spec = self.spec();
        let (a, b, c, d) = (self.re, self.im, other.re, other.im);

        if c.is_zero() && d.is_zero() && !a.is_nan() && !b.is_nan() {
            // Dividing a finite numerator by an exact-zero denominator:
            // the sign of each infinite component follows the numerator's
            // sign relative to the (signed) zero real part, mirroring how
            // real division by a signed zero behaves.
            let c_sign = c.to_bits().0;
            return Self::new(
                FloatPoint::infinity(a.to_bits().0 ^ c_sign, spec),
                FloatPoint::infinity(b.to_bits().0 ^ c_sign, spec),
            );
        }
        if (a.is_inf() || b.is_inf()) && !c.is_inf() && !d.is_inf() {
            let sign_re = a.to_bits().0;
            let sign_im = b.to_bits().0;
            return Self::new(FloatPoint::infinity(sign_re, spec), FloatPoint::infinity(sign_im, spec));
        }
        if (c.is_inf() || d.is_inf()) && !a.is_inf() && !b.is_inf() {
            return Self::new(FloatPoint::zero(a.to_bits().0, spec), FloatPoint::zero(b.to_bits().0, spec));
        }

        let abs_c = c.to_f64().abs();
        let abs_d = d.to_f64().abs();
        let k = abs_c.max(abs_d).log2().floor() as i64;
        let c_s = c.scalbn(-k);
        let d_s = d.scalbn(-k);

        let denom = c_s.mul(&c_s, rng).add(&d_s.mul(&d_s, rng), rng);
        let real_num = a.mul(&c_s, rng).add(&b.mul(&d_s, rng), rng);
        let imag_num = b.mul(&c_s, rng).sub(&a.mul(&d_s, rng), rng);

        let qre = real_num.div(&denom, rng).scalbn(-k);
        let qim = imag_num.div(&denom, rng).scalbn(-k);
        Self::new(qre, qim)
    }
}
