//! Fixed-point sample and coefficient types.
//!
//! Samples and coefficients are both 32-bit with 24 fractional bits. A
//! 16-bit wire sample is shifted up by 9 bits on the way in, which leaves
//! 8 bits of headroom above full scale for the recursion. Products are
//! accumulated in 64 bits and shifted back by the coefficient precision.

/// Internal audio sample.
pub type Sample = i32;

/// Filter coefficient.
pub type Coef = i32;

/// Coefficient-by-sample accumulator.
pub type Acc = i64;

/// Fractional bits of a [`Sample`].
pub const SAMPLE_FRAC_BITS: u32 = 24;

/// Fractional bits of a [`Coef`].
pub const COEF_FRAC_BITS: u32 = 24;

/// Coefficient value of 1.0.
pub const COEF_ONE: Coef = 1 << COEF_FRAC_BITS;

/// Left shift applied to 16-bit input samples.
pub const S16_SHIFT: u32 = SAMPLE_FRAC_BITS - 15;

const S16_MAX_SAMPLE: Sample = 0x7FFF << S16_SHIFT;
const S16_MIN_SAMPLE: Sample = -(0x8000 << S16_SHIFT);

/// Convert a 16-bit linear PCM sample to the internal representation.
#[inline]
pub fn s16_to_sample(x: i16) -> Sample {
    Sample::from(x) << S16_SHIFT
}

/// Convert an internal sample back to 16 bits, clipping at full scale.
#[inline]
pub fn sample_to_s16_clip(s: Sample) -> i16 {
    if s >= S16_MAX_SAMPLE {
        i16::MAX
    } else if s <= S16_MIN_SAMPLE {
        i16::MIN
    } else {
        (s >> S16_SHIFT) as i16
    }
}

/// `c * s` in accumulator precision.
#[inline]
pub fn mul_coef_sample(c: Coef, s: Sample) -> Acc {
    Acc::from(c) * Acc::from(s)
}

/// `acc + c * s`. Wraps instead of panicking on pathological input.
#[inline]
pub fn mac_coef_sample(c: Coef, s: Sample, acc: Acc) -> Acc {
    acc.wrapping_add(mul_coef_sample(c, s))
}

/// Scale an accumulator back to a sample, saturating to the sample range.
#[inline]
pub fn acc_to_sample(acc: Acc) -> Sample {
    let shifted = acc >> COEF_FRAC_BITS;
    shifted.clamp(Acc::from(Sample::MIN), Acc::from(Sample::MAX)) as Sample
}
