//! `FixedPoint`: the arbitrary-precision fixed-point scalar.

use crate::bcd;
use crate::error::{AtError, AtResult};
use crate::limb::{self, Limb};
use crate::quantize::{OverflowMode, QuantizationMode};
use crate::rng::StochasticRng;
use crate::scratch::ScratchVector;

use super::arith;
use super::cast;
use super::spec::FixedSpec;

/// Inline limb capacity before `FixedPoint` spills to the heap: two 64-bit
/// limbs covers every scalar up to 128 bits without allocating.
const INLINE_LIMBS: usize = 2;

/// A single fixed-point value: `bits` total two's-complement bits, `frac_bits`
/// of them below the binary point.
#[derive(Clone, Debug)]
pub struct FixedPoint {
    data: ScratchVector<Limb, INLINE_LIMBS>,
    spec: FixedSpec,
}

impl FixedPoint {
    pub fn spec(&self) -> FixedSpec {
        self.spec
    }

    fn from_parts(spec: FixedSpec, limbs: Vec<Limb>) -> Self {
        debug_assert_eq!(limbs.len(), spec.limbs());
        Self {
            data: ScratchVector::from_iter_exact(limbs, spec.limbs()),
            spec,
        }
    }

    pub fn zero(spec: FixedSpec) -> Self {
        Self::from_parts(spec, vec![0 as Limb; spec.limbs()])
    }

    /// From an exact two's-complement bit pattern.
    pub fn from_bits(raw: &[Limb], spec: FixedSpec) -> AtResult<Self> {
        if raw.len() != spec.limbs() {
            return Err(AtError::spec_invalid(format!(
                "expected {} limbs for {}-bit spec, got {}",
                spec.limbs(),
                spec.bits,
                raw.len()
            )));
        }
        let mut data = raw.to_vec();
        limb::truncate_to_bits(&mut data, spec.bits);
        Ok(Self::from_parts(spec, data))
    }

    /// The two's-complement bit pattern as an unsigned integer of exactly
    /// `bits` low-order bits.
    pub fn to_bits(&self) -> Vec<Limb> {
        let mut out = self.data.as_slice().to_vec();
        let bits = self.spec.bits;
        let limb_idx = (bits - 1) / limb::LIMB_BITS as usize;
        let bit_idx = (bits - 1) % limb::LIMB_BITS as usize;
        if bit_idx + 1 < limb::LIMB_BITS as usize {
            let mask = (1u128 << (bit_idx + 1)) as Limb - 1;
            out[limb_idx] &= mask;
        }
        for limb in &mut out[limb_idx + 1..] {
            *limb = 0;
        }
        out
    }

    /// From a host double, rounded with `RND_INF` by default.
    pub fn from_f64(value: f64, spec: FixedSpec) -> Self {
        Self::from_f64_rounded(value, spec, QuantizationMode::RndInf, OverflowMode::Wrap)
    }

    pub fn from_f64_rounded(
        value: f64,
        spec: FixedSpec,
        quantization: QuantizationMode,
        overflow: OverflowMode,
    ) -> Self {
        if value == 0.0 {
            return Self::from_parts(spec, vec![0 as Limb; spec.limbs()]);
        }
        let bits = value.to_bits();
        let sign = (bits >> 63) & 1 == 1;
        let exp = ((bits >> 52) & 0x7FF) as i64;
        let frac = bits & ((1u64 << 52) - 1);
        let (mantissa, unbiased_exp) = if exp == 0 {
            (frac, -1022i64)
        } else {
            (frac | (1u64 << 52), exp - 1023)
        };

        let frac_bits = spec.frac_bits();
        let shift = unbiased_exp - 52 + frac_bits;
        let work_limbs = spec.limbs() + 3;
        let mut src = vec![0 as Limb; work_limbs];
        src[0] = mantissa;

        let mag = if shift >= 0 {
            let mut out = vec![0 as Limb; work_limbs];
            limb::lsl(&mut out, &src, shift as usize);
            out
        } else {
            let shift_amount = (-shift) as usize;
            let g = limb::test_bit(&src, shift_amount - 1);
            let t = limb::or_reduce_low_n_bits(&src, shift_amount - 1);
            let mut retained = vec![0 as Limb; work_limbs];
            limb::lsr(&mut retained, &src, shift_amount);
            let retained_lsb = limb::test_bit(&retained, 0);
            let mut rng = StochasticRng::from_seed(0);
            let outcome =
                crate::quantize::decide(quantization, sign, retained_lsb, g, t, &mut rng);
            if outcome.force_lsb_one {
                limb::set_bit(&mut retained, 0, true);
            } else if outcome.add_ulp {
                limb::add_pow2(&mut retained, 0);
            }
            retained
        };

        let mut signed = vec![0 as Limb; work_limbs];
        if sign {
            limb::neg(&mut signed, &mag);
        } else {
            signed.copy_from_slice(&mag);
        }
        let out = cast::apply_overflow(&signed, spec, overflow);
        Self::from_parts(spec, out)
    }

    /// Round-trips through the shared quantization vocabulary at `RND_CONV`,
    /// mirroring `to_double()`'s contract at scalar level —
    /// keeps the top 53 significand bits of the magnitude.
    pub fn to_f64(&self) -> f64 {
        let sign = limb::is_negative(self.data.as_slice());
        let mut mag = vec![0 as Limb; self.data.len()];
        limb::abs(&mut mag, self.data.as_slice());
        if limb::is_zero(&mag) {
            return 0.0;
        }
        let bit_width = limb::bit_width(&mag);
        let shift_amount = bit_width.saturating_sub(53);
        let mut mantissa_bits = vec![0 as Limb; mag.len()];
        if shift_amount == 0 {
            mantissa_bits.copy_from_slice(&mag);
        } else {
            let g = limb::test_bit(&mag, shift_amount - 1);
            let t = limb::or_reduce_low_n_bits(&mag, shift_amount - 1);
            limb::lsr(&mut mantissa_bits, &mag, shift_amount);
            let retained_lsb = limb::test_bit(&mantissa_bits, 0);
            let mut rng = StochasticRng::from_seed(0);
            let outcome = crate::quantize::decide(
                QuantizationMode::RndConv,
                sign,
                retained_lsb,
                g,
                t,
                &mut rng,
            );
            if outcome.add_ulp || outcome.force_lsb_one {
                limb::add_pow2(&mut mantissa_bits, 0);
            }
        }
        let mantissa_u64 = mantissa_bits[0];
        let exponent = shift_amount as i64 - self.spec.frac_bits();
        let value = mantissa_u64 as f64 * 2f64.powi(exponent as i32);
        if sign {
            -value
        } else {
            value
        }
    }

    /// From a host integer, rounded with `RND_INF` by default (only matters
    /// when `frac_bits < 0`).
    pub fn from_i64(value: i64, spec: FixedSpec) -> Self {
        Self::from_i64_rounded(value, spec, QuantizationMode::RndInf, OverflowMode::Wrap)
    }

    pub fn from_i64_rounded(
        value: i64,
        spec: FixedSpec,
        quantization: QuantizationMode,
        overflow: OverflowMode,
    ) -> Self {
        let sign = value < 0;
        let magnitude = value.unsigned_abs() as u128;
        let work_limbs = spec.limbs() + 3;
        let mut src = vec![0 as Limb; work_limbs];
        src[0] = magnitude as Limb;
        if work_limbs > 1 {
            src[1] = (magnitude >> 64) as Limb;
        }

        let frac_bits = spec.frac_bits();
        let mag = if frac_bits >= 0 {
            let mut out = vec![0 as Limb; work_limbs];
            limb::lsl(&mut out, &src, frac_bits as usize);
            out
        } else {
            let shift_amount = (-frac_bits) as usize;
            let g = limb::test_bit(&src, shift_amount - 1);
            let t = limb::or_reduce_low_n_bits(&src, shift_amount - 1);
            let mut retained = vec![0 as Limb; work_limbs];
            limb::lsr(&mut retained, &src, shift_amount);
            let retained_lsb = limb::test_bit(&retained, 0);
            let mut rng = StochasticRng::from_seed(0);
            let outcome =
                crate::quantize::decide(quantization, sign, retained_lsb, g, t, &mut rng);
            if outcome.force_lsb_one {
                limb::set_bit(&mut retained, 0, true);
            } else if outcome.add_ulp {
                limb::add_pow2(&mut retained, 0);
            }
            retained
        };

        let mut signed = vec![0 as Limb; work_limbs];
        if sign {
            limb::neg(&mut signed, &mag);
        } else {
            signed.copy_from_slice(&mag);
        }
        let out = cast::apply_overflow(&signed, spec, overflow);
        Self::from_parts(spec, out)
    }

    /// From a decimal-grammar string (`/-?(\d+\.?\d*|\.\d+)/`, trimmed),
    /// in `base` ∈ {2, 8, 10, 16}; non-10 bases accept integer-only
    /// magnitudes.
    pub fn from_str_radix(s: &str, spec: FixedSpec, base: u32) -> AtResult<Self> {
        let trimmed = s.trim();
        let (negative, rest) = if let Some(r) = trimmed.strip_prefix('-') {
            (true, r)
        } else {
            (false, trimmed)
        };
        if rest.is_empty() {
            return Err(AtError::value_invalid("empty numeric literal"));
        }

        if base != 10 {
            if rest.contains('.') {
                return Err(AtError::value_invalid(format!(
                    "base {base} only accepts integer-only magnitudes"
                )));
            }
            let magnitude = parse_uint_any_base(rest, base)?;
            let fb = spec.frac_bits();
            let scaled = if fb >= 0 {
                shl_big(&magnitude, fb as usize)
            } else {
                let denom = shl_big(&[1 as Limb], (-fb) as usize);
                bcd::div_round(&magnitude, &denom)
            };
            return Self::finish_from_magnitude(negative, &scaled, spec, OverflowMode::Wrap);
        }

        let mut parts = rest.splitn(2, '.');
        let int_str = parts.next().unwrap_or("");
        let frac_str = parts.next().unwrap_or("");
        if int_str.is_empty() && frac_str.is_empty() {
            return Err(AtError::value_invalid("empty numeric literal"));
        }
        if !int_str.chars().all(|c| c.is_ascii_digit())
            || !frac_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AtError::value_invalid(format!(
                "'{s}' is not a valid decimal literal"
            )));
        }
        let int_magnitude = if int_str.is_empty() {
            vec![0 as Limb]
        } else {
            parse_uint_any_base(int_str, 10)?
        };
        let frac_len = frac_str.len();
        let frac_int = if frac_str.is_empty() {
            vec![0 as Limb]
        } else {
            parse_uint_any_base(frac_str, 10)?
        };

        let pow10_len = bcd::pow10(frac_len);
        let combined = big_mul_add(&int_magnitude, &pow10_len, &frac_int);

        let fb = spec.frac_bits();
        let pow2_pos = fb.max(0) as usize;
        let pow2_neg = (-fb).max(0) as usize;
        let numerator = shl_big(&combined, pow2_pos);
        let denominator = shl_big(&pow10_len, pow2_neg);
        let magnitude = bcd::div_round(&numerator, &denominator);

        Self::finish_from_magnitude(negative, &magnitude, spec, OverflowMode::Wrap)
    }

    fn finish_from_magnitude(
        negative: bool,
        magnitude: &[Limb],
        spec: FixedSpec,
        overflow: OverflowMode,
    ) -> AtResult<Self> {
        let work_len = magnitude.len().max(spec.limbs()) + 1;
        let mut mag_ext = vec![0 as Limb; work_len];
        mag_ext[..magnitude.len()].copy_from_slice(magnitude);
        let mut signed = vec![0 as Limb; work_len];
        if negative {
            limb::neg(&mut signed, &mag_ext);
        } else {
            signed.copy_from_slice(&mag_ext);
        }
        let out = cast::apply_overflow(&signed, spec, overflow);
        Ok(Self::from_parts(spec, out))
    }

    /// `to_string(base)` for base ∈ {2, 8, 10, 16}. Powers-of-two
    /// bases are exact regroupings of the binary representation; base 10
    /// goes through the double-dabble pipeline scaled by `5^frac_bits`.
    pub fn to_string_radix(&self, base: u32) -> AtResult<String> {
        match base {
            10 => Ok(self.to_decimal_string()),
            2 | 8 | 16 => Ok(self.to_pow2_string(base)),
            other => Err(AtError::not_implemented(format!(
                "base {other} is not supported"
            ))),
        }
    }

    fn to_decimal_string(&self) -> String {
        let sign = limb::is_negative(self.data.as_slice());
        let mut mag = vec![0 as Limb; self.data.len()];
        limb::abs(&mut mag, self.data.as_slice());

        let fb = self.spec.frac_bits();
        if fb <= 0 {
            let shift = (-fb) as usize;
            let out_len = mag.len() + limb::bits_to_limbs(shift) + 1;
            let mut mag_ext = vec![0 as Limb; out_len];
            mag_ext[..mag.len()].copy_from_slice(&mag);
            let mut int_mag = vec![0 as Limb; out_len];
            limb::lsl(&mut int_mag, &mag_ext, shift);
            let int_digits = bcd::double_dabble(&int_mag);
            return bcd::format_decimal(sign, &int_digits, &[]);
        }

        let fb = fb as usize;
        let mut int_mag = vec![0 as Limb; mag.len()];
        limb::lsr(&mut int_mag, &mag, fb);
        let int_digits = bcd::double_dabble(&int_mag);

        let frac_limbs = limb::bits_to_limbs(fb);
        let mut frac_int = vec![0 as Limb; frac_limbs];
        let copy_len = frac_limbs.min(mag.len());
        frac_int[..copy_len].copy_from_slice(&mag[..copy_len]);
        let total_bits = frac_limbs * limb::LIMB_BITS as usize;
        if total_bits > fb {
            let extra = total_bits - fb;
            let top = frac_limbs - 1;
            frac_int[top] &= Limb::MAX >> extra;
        }

        let p5 = bcd::pow5(fb);
        let mut numerator = vec![0 as Limb; frac_int.len() + p5.len()];
        limb::mul_n_by_m(&mut numerator, &frac_int, &p5);
        let mut frac_digits = bcd::double_dabble(&numerator);
        while frac_digits.len() < fb {
            frac_digits.insert(0, 0);
        }
        // Trailing zero decimal digits don't change the exact value; drop
        // them for a minimal rendering (0.25000000 and 0.25 are the same
        // number).
        while frac_digits.last() == Some(&0) {
            frac_digits.pop();
        }
        bcd::format_decimal(sign, &int_digits, &frac_digits)
    }

    fn to_pow2_string(&self, base: u32) -> String {
        let bits_per_digit = match base {
            2 => 1,
            8 => 3,
            16 => 4,
            _ => unreachable!(),
        };
        let sign = limb::is_negative(self.data.as_slice());
        let mut mag = vec![0 as Limb; self.data.len()];
        limb::abs(&mut mag, self.data.as_slice());

        let fb = self.spec.frac_bits();
        let (int_mag, frac_bit_list): (Vec<Limb>, Vec<bool>) = if fb >= 0 {
            let fb = fb as usize;
            let mut out = vec![0 as Limb; mag.len()];
            limb::lsr(&mut out, &mag, fb);
            let frac_list: Vec<bool> = (0..fb).rev().map(|p| limb::test_bit(&mag, p)).collect();
            (out, frac_list)
        } else {
            let shift = (-fb) as usize;
            let out_len = mag.len() + limb::bits_to_limbs(shift);
            let mut mag_ext = vec![0 as Limb; out_len];
            mag_ext[..mag.len()].copy_from_slice(&mag);
            let mut out = vec![0 as Limb; out_len];
            limb::lsl(&mut out, &mag_ext, shift);
            (out, vec![])
        };

        let width = int_mag.len() * limb::LIMB_BITS as usize;
        let mut int_bit_list: Vec<bool> = (0..width).rev().map(|p| limb::test_bit(&int_mag, p)).collect();
        while int_bit_list.len() > 1 && !int_bit_list[0] {
            int_bit_list.remove(0);
        }

        let mut int_digits = bits_to_digits(&int_bit_list, bits_per_digit);
        while int_digits.len() > 1 && int_digits[0] == 0 {
            int_digits.remove(0);
        }
        let frac_digits = bits_to_digits_right_padded(&frac_bit_list, bits_per_digit);

        let mut s = String::new();
        if sign {
            s.push('-');
        }
        for d in &int_digits {
            s.push(digit_char(*d));
        }
        if !frac_digits.is_empty() {
            s.push('.');
            for d in &frac_digits {
                s.push(digit_char(*d));
            }
        }
        s
    }

    /// Cast to `dst_spec` using the shared quantize/overflow vocabulary.
    pub fn cast(
        &self,
        dst_spec: FixedSpec,
        quantization: QuantizationMode,
        overflow: OverflowMode,
        rng: &mut StochasticRng,
    ) -> Self {
        let out = cast::cast(
            self.data.as_slice(),
            self.spec,
            dst_spec,
            quantization,
            overflow,
            rng,
        );
        Self::from_parts(dst_spec, out)
    }

    pub fn add(&self, other: &Self) -> Self {
        let (spec, limbs) = arith::add(self.data.as_slice(), self.spec, other.data.as_slice(), other.spec);
        Self::from_parts(spec, limbs)
    }

    pub fn sub(&self, other: &Self) -> Self {
        let (spec, limbs) = arith::sub(self.data.as_slice(), self.spec, other.data.as_slice(), other.spec);
        Self::from_parts(spec, limbs)
    }

    pub fn mul(&self, other: &Self) -> Self {
        let (spec, limbs) = arith::mul(self.data.as_slice(), self.spec, other.data.as_slice(), other.spec);
        Self::from_parts(spec, limbs)
    }

    pub fn div(&self, other: &Self) -> Self {
        let (spec, limbs) = arith::div(self.data.as_slice(), self.spec, other.data.as_slice(), other.spec);
        Self::from_parts(spec, limbs)
    }

    pub fn neg(&self) -> Self {
        let (spec, limbs) = arith::neg(self.data.as_slice(), self.spec);
        Self::from_parts(spec, limbs)
    }

    /// `<<`/`>>` by a possibly-negative amount: relabels `int_bits` only,
    /// the underlying bit pattern is untouched.
    pub fn shift_left(&self, amount: i64) -> Self {
        let (spec, limbs) = arith::shift_left(self.data.as_slice(), self.spec, amount);
        Self::from_parts(spec, limbs)
    }

    pub fn shift_right(&self, amount: i64) -> Self {
        self.shift_left(-amount)
    }

    pub fn is_zero(&self) -> bool {
        limb::is_zero(self.data.as_slice())
    }

    /// `floor(log2(|self|))`, or `i64::MIN` for zero. Used by Smith's
    /// scaled complex division to pick a safe scale factor.
    pub fn floor_log2_abs(&self) -> i64 {
        let mut mag = vec![0 as Limb; self.data.len()];
        limb::abs(&mut mag, self.data.as_slice());
        let bit_width = limb::bit_width(&mag);
        if bit_width == 0 {
            return i64::MIN;
        }
        (bit_width as i64 - 1) - self.spec.frac_bits()
    }
}

fn digit_char(d: u8) -> char {
    if d < 10 {
        (b'0' + d) as char
    } else {
        (b'a' + (d - 10)) as char
    }
}

/// MSB-first bits → digit values, left-padded with zero bits to a whole
/// number of `bits_per_digit`-sized groups.
fn bits_to_digits(bits: &[bool], bits_per_digit: usize) -> Vec<u8> {
    if bits.is_empty() {
        return vec![0];
    }
    let pad = (bits_per_digit - bits.len() % bits_per_digit) % bits_per_digit;
    let mut padded = vec![false; pad];
    padded.extend_from_slice(bits);
    padded
        .chunks(bits_per_digit)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
        .collect()
}

/// Fractional bits (nearest the point first) → digit values, right-padded
/// with zero bits so the last group is complete.
fn bits_to_digits_right_padded(bits: &[bool], bits_per_digit: usize) -> Vec<u8> {
    if bits.is_empty() {
        return vec![];
    }
    let pad = (bits_per_digit - bits.len() % bits_per_digit) % bits_per_digit;
    let mut padded = bits.to_vec();
    padded.extend(std::iter::repeat(false).take(pad));
    padded
        .chunks(bits_per_digit)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
        .collect()
}

fn parse_uint_any_base(digits: &str, base: u32) -> AtResult<Vec<Limb>> {
    let mut value: Vec<Limb> = vec![0];
    for c in digits.chars() {
        let d = c
            .to_digit(base)
            .ok_or_else(|| AtError::value_invalid(format!("invalid digit '{c}' for base {base}")))?;
        value = mul_small_add(&value, base as Limb, d as Limb);
    }
    Ok(value)
}

fn mul_small_add(a: &[Limb], m: Limb, add: Limb) -> Vec<Limb> {
    let mut out = Vec::with_capacity(a.len() + 1);
    let mut carry: u128 = add as u128;
    for &limb in a {
        let acc = limb as u128 * m as u128 + carry;
        out.push(acc as Limb);
        carry = acc >> limb::LIMB_BITS;
    }
    if carry > 0 {
        out.push(carry as Limb);
    }
    out
}

fn big_mul_add(a: &[Limb], b: &[Limb], add: &[Limb]) -> Vec<Limb> {
    let mut product = vec![0 as Limb; a.len() + b.len()];
    limb::mul_n_by_m(&mut product, a, b);
    let len = product.len().max(add.len()) + 1;
    let mut p_ext = vec![0 as Limb; len];
    p_ext[..product.len()].copy_from_slice(&product);
    let mut add_ext = vec![0 as Limb; len];
    add_ext[..add.len()].copy_from_slice(add);
    let mut out = vec![0 as Limb; len];
    limb::add_n(&mut out, &p_ext, &add_ext);
    out
}

fn shl_big(a: &[Limb], shift: usize) -> Vec<Limb> {
    let result_bits = a.len() * limb::LIMB_BITS as usize + shift;
    let mut out = vec![0 as Limb; limb::bits_to_limbs(result_bits.max(1))];
    limb::lsl(&mut out, a, shift);
    out
}
