//! Coefficient tables for the peaking and shelving bands.
//!
//! Every table maps octave-spaced frequency points and 1024-millibel gain
//! steps (from -9600 mB up to 4736 mB) to a biquad vector
//! `[b0, b1, b2, -a1, -a2]` in Q24. The peaking table adds bandwidth steps
//! of 1024 cents starting at 1 cent.
//!
//! Gain is always the innermost dimension. Entries are built as
//! `identity + deviation(gain) * shape(freq, bw)` where the denominator
//! does not depend on gain, so interpolation never leaves the stable
//! region. The two gain rows bracketing 0 dB are quantised to deviations of
//! `3m` and `-5m`, which blend to exactly zero at 0 dB: every band lands on
//! a numerator equal to its denominator, which passes samples through
//! bit-exactly regardless of frequency or bandwidth.
//!
//! Peaking sections are second-order allpass-based designs, shelves are
//! first-order allpass-based designs. Tables are built once on first use.
use std::f64::consts::PI;

use once_cell::sync::Lazy;

use crate::biquad::NUM_COEFS;
use crate::fixed::{Coef, COEF_ONE};

/// Number of gain steps in every table.
pub const GAIN_STEPS: usize = 15;

/// Gain of the first table row, in millibel.
pub const GAIN_MIN_MB: i32 = -9600;

/// Millibel between gain rows.
pub const GAIN_STEP_MB: i32 = 1024;

/// Peaking table shape: `[freq][bandwidth][gain]`.
pub const PEAKING_DIMS: [usize; 3] = [9, 4, GAIN_STEPS];

/// Low shelf table shape: `[freq][gain]`.
pub const LOW_SHELF_DIMS: [usize; 2] = [5, GAIN_STEPS];

/// High shelf table shape: `[freq][gain]`.
pub const HIGH_SHELF_DIMS: [usize; 2] = [3, GAIN_STEPS];

/// Octaves below Nyquist of the first peaking frequency row.
pub const PEAKING_FIRST_OCTAVE: i32 = -9;

/// Octaves below Nyquist of the first low shelf frequency row.
pub const LOW_SHELF_FIRST_OCTAVE: i32 = -10;

/// Octaves below Nyquist of the first high shelf frequency row.
pub const HIGH_SHELF_FIRST_OCTAVE: i32 = -2;

/// Cents between bandwidth rows; the first row is 1 cent.
pub const BANDWIDTH_STEP_CENTS: u32 = 1024;

// Rows bracketing 0 dB: -384 mB and +640 mB.
const BELOW_UNITY_ROW: usize = 9;
const ABOVE_UNITY_ROW: usize = 10;

// Widest normalised bandwidth or cutoff, kept clear of Nyquist.
const MAX_OMEGA: f64 = 0.95 * PI;

static PEAKING: Lazy<Vec<Coef>> = Lazy::new(build_peaking);
static LOW_SHELF: Lazy<Vec<Coef>> = Lazy::new(|| build_shelf(ShelfSide::Low));
static HIGH_SHELF: Lazy<Vec<Coef>> = Lazy::new(|| build_shelf(ShelfSide::High));

/// Peaking table, laid out per [`PEAKING_DIMS`].
pub fn peaking() -> &'static [Coef] {
    &PEAKING
}

/// Low shelf table, laid out per [`LOW_SHELF_DIMS`].
pub fn low_shelf() -> &'static [Coef] {
    &LOW_SHELF
}

/// High shelf table, laid out per [`HIGH_SHELF_DIMS`].
pub fn high_shelf() -> &'static [Coef] {
    &HIGH_SHELF
}

#[derive(Clone, Copy)]
enum ShelfSide {
    Low,
    High,
}

fn saturate(v: i64) -> Coef {
    v.clamp(i64::from(Coef::MIN), i64::from(Coef::MAX)) as Coef
}

fn to_coef(v: f64) -> Coef {
    saturate((v * f64::from(COEF_ONE)).round() as i64)
}

/// Linear gain deviation from unity for each gain row, normalised so the
/// interpolated gain at 0 dB is exactly 1.
fn gain_deviations() -> [f64; GAIN_STEPS] {
    let linear: [f64; GAIN_STEPS] = std::array::from_fn(|row| {
        let mb = GAIN_MIN_MB + GAIN_STEP_MB * row as i32;
        10f64.powf(f64::from(mb) / 2000.0)
    });
    let frac = f64::from(-(GAIN_MIN_MB + GAIN_STEP_MB * BELOW_UNITY_ROW as i32))
        / f64::from(GAIN_STEP_MB);
    let unity = (1.0 - frac) * linear[BELOW_UNITY_ROW] + frac * linear[ABOVE_UNITY_ROW];
    std::array::from_fn(|row| linear[row] / unity - 1.0)
}

/// Quantised deviations for a section whose gain term is scaled by `shape`.
fn quantized_deviations(deviation: &[f64; GAIN_STEPS], shape: f64) -> [i64; GAIN_STEPS] {
    let one = f64::from(COEF_ONE);
    let mut d: [i64; GAIN_STEPS] =
        std::array::from_fn(|row| (deviation[row] * shape * one).round() as i64);
    // 3m and -5m blend to zero at 3/8 of the way between the rows.
    let m = (d[BELOW_UNITY_ROW] as f64 / 3.0).round() as i64;
    d[BELOW_UNITY_ROW] = 3 * m;
    d[ABOVE_UNITY_ROW] = -5 * m;
    d
}

/// First-order allpass coefficient for a normalised angular frequency.
fn allpass_coef(omega: f64) -> f64 {
    let t = (omega.min(MAX_OMEGA) / 2.0).tan();
    (t - 1.0) / (t + 1.0)
}

fn build_peaking() -> Vec<Coef> {
    let deviation = gain_deviations();
    let one = i64::from(COEF_ONE);
    let [freqs, bandwidths, gains] = PEAKING_DIMS;
    let mut table = Vec::with_capacity(freqs * bandwidths * gains * NUM_COEFS);

    for f in 0..freqs {
        let w0 = PI * 2f64.powi(PEAKING_FIRST_OCTAVE + f as i32);
        for b in 0..bandwidths {
            let cents = f64::from(1 + BANDWIDTH_STEP_CENTS * b as u32);
            let spread = 2f64.powf(cents / 2400.0);
            let c = allpass_coef(w0 * (spread - 1.0 / spread));
            let b1 = to_coef(-w0.cos() * (1.0 - c));
            let a2 = to_coef(c);
            for dev in quantized_deviations(&deviation, (1.0 + c) / 2.0) {
                table.extend_from_slice(&[
                    saturate(one + dev),
                    b1,
                    saturate(-i64::from(a2) - dev),
                    -b1,
                    a2,
                ]);
            }
        }
    }
    table
}

fn build_shelf(side: ShelfSide) -> Vec<Coef> {
    let deviation = gain_deviations();
    let one = i64::from(COEF_ONE);
    let (dims, first_octave) = match side {
        ShelfSide::Low => (LOW_SHELF_DIMS, LOW_SHELF_FIRST_OCTAVE),
        ShelfSide::High => (HIGH_SHELF_DIMS, HIGH_SHELF_FIRST_OCTAVE),
    };
    let [freqs, gains] = dims;
    let mut table = Vec::with_capacity(freqs * gains * NUM_COEFS);

    for f in 0..freqs {
        let c = allpass_coef(PI * 2f64.powi(first_octave + f as i32));
        let pole = to_coef(c);
        let shape = match side {
            ShelfSide::Low => (1.0 + c) / 2.0,
            ShelfSide::High => (1.0 - c) / 2.0,
        };
        for dev in quantized_deviations(&deviation, shape) {
            let b1 = match side {
                ShelfSide::Low => i64::from(pole) + dev,
                ShelfSide::High => i64::from(pole) - dev,
            };
            table.extend_from_slice(&[saturate(one + dev), saturate(b1), 0, -pole, 0]);
        }
    }
    table
}
