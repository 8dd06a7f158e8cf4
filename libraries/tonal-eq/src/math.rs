//! Fixed-point base-2 logarithm and exponential.
//!
//! Both functions work in Q15: a logarithm of `(n << 15) | f` means
//! `n + f / 32768`. They are used by the bands to move frequencies into
//! the octave-spaced table domain and back.

/// Fractional bits of a log-domain value.
pub const LOG_FRAC_BITS: u32 = 15;

/// `2^(2^-k)` in Q30, for k = 1..=15.
const EXP2_STEPS: [u64; 15] = [
    1518500250, 1276901417, 1170923762, 1121280436, 1097253708, 1085434106, 1079572136,
    1076653033, 1075196443, 1074468888, 1074105294, 1073923544, 1073832680, 1073787251,
    1073764537,
];

const MANTISSA_ONE: u64 = 1 << 30;

/// Base-2 logarithm of `x` in Q15, truncated. `log2(0)` is `i32::MIN`.
pub fn log2(x: u32) -> i32 {
    if x == 0 {
        return i32::MIN;
    }
    let int_part = 31 - x.leading_zeros();
    // Normalised mantissa in [2^31, 2^32).
    let mut m = u64::from(x) << (31 - int_part);
    let mut frac = 0i32;
    for bit in (0..LOG_FRAC_BITS).rev() {
        m = (m * m) >> 31;
        if m >= 1 << 32 {
            m >>= 1;
            frac |= 1 << bit;
        }
    }
    ((int_part as i32) << LOG_FRAC_BITS) | frac
}

/// `2^(x / 2^15)` rounded to nearest, saturating at `u32::MAX`.
pub fn exp2(x: i32) -> u32 {
    let int_part = x >> LOG_FRAC_BITS;
    let frac = x & ((1 << LOG_FRAC_BITS) - 1);

    let mut m = MANTISSA_ONE;
    for (k, step) in EXP2_STEPS.iter().enumerate() {
        if frac & (1 << (LOG_FRAC_BITS as usize - 1 - k)) != 0 {
            m = (m * step + (1 << 29)) >> 30;
        }
    }

    if int_part >= 32 {
        return u32::MAX;
    }
    if int_part >= 30 {
        let v = m << (int_part - 30);
        return u32::try_from(v).unwrap_or(u32::MAX);
    }
    let shift = (30 - int_part) as u32;
    if shift >= 63 {
        return 0;
    }
    ((m + (1 << (shift - 1))) >> shift) as u32
}
