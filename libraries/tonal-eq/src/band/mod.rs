//! Parametric bands built from a biquad filter and a coefficient table.
//!
//! A band turns human-meaningful parameters (millihertz, millibel, cents)
//! into table coordinates, looks up interpolated coefficients on
//! [`commit`](ParametricBand::commit) and hands them to its filter, which
//! takes care of ramping.

mod peaking;
mod shelving;

pub use peaking::{PeakingBand, DEFAULT_BANDWIDTH_CENTS};
pub use shelving::{ShelfKind, ShelvingBand};

use crate::biquad::{BiquadFilter, Track, MAX_CHANNELS};
use crate::error::{EqError, Result};
use crate::fixed::Sample;
use crate::math;

/// Fractional bits of the frequency table coordinate.
pub const FREQ_PRECISION_BITS: u32 = 26;

/// Fractional bits of the gain table coordinate.
pub const GAIN_PRECISION_BITS: u32 = 10;

/// Fractional bits of the bandwidth table coordinate.
pub const BANDWIDTH_PRECISION_BITS: u32 = 10;

/// Offset making every table gain coordinate non-negative.
pub const GAIN_BIAS_MB: i32 = 9600;

/// Highest sample rate whose Nyquist frequency fits in millihertz.
pub const MAX_SAMPLE_RATE: u32 = u32::MAX / 500;

/// Shared surface of peaking and shelving bands
pub trait ParametricBand {
    /// Reconfigure for a new stream format. Commits immediately.
    fn configure(&mut self, num_channels: usize, sample_rate: u32) -> Result<()>;

    /// Restore default parameters and commit immediately.
    fn reset(&mut self);

    /// Push coefficients for the current parameters into the filter.
    fn commit(&mut self, immediate: bool);

    /// Set gain in millibel. Takes effect on the next commit.
    fn set_gain(&mut self, millibel: i32);

    /// Gain in millibel
    fn gain(&self) -> i32;

    /// Set frequency in millihertz. Takes effect on the next commit.
    fn set_frequency(&mut self, millihertz: u32);

    /// Frequency in millihertz, as last requested
    fn frequency(&self) -> u32;

    /// Underlying filter
    fn filter(&self) -> &BiquadFilter;

    /// Underlying filter, mutably
    fn filter_mut(&mut self) -> &mut BiquadFilter;

    /// Zero the filter history.
    fn clear(&mut self) {
        self.filter_mut().clear();
    }

    fn enable(&mut self, immediate: bool) {
        self.filter_mut().enable(immediate);
    }

    fn disable(&mut self, immediate: bool) {
        self.filter_mut().disable(immediate);
    }

    fn process(&mut self, input: &[Sample], output: &mut [Sample], track: Track) {
        self.filter_mut().process(input, output, track);
    }

    fn process_in_place(&mut self, buffer: &mut [Sample], track: Track) {
        self.filter_mut().process_in_place(buffer, track);
    }
}

/// Check a stream format before any band state is touched.
pub(crate) fn validate_format(num_channels: usize, sample_rate: u32) -> Result<()> {
    if num_channels == 0 || num_channels > MAX_CHANNELS {
        return Err(EqError::InvalidChannels(num_channels));
    }
    if sample_rate == 0 || sample_rate > MAX_SAMPLE_RATE {
        return Err(EqError::InvalidSampleRate(sample_rate));
    }
    Ok(())
}

/// Maps millihertz to the octave-based frequency coordinate of a table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrequencyScale {
    nyquist: u32,
    // 2^42 / Nyquist
    factor: u64,
    // Normalised frequency (Q32 of Nyquist) of the first table row, as log2
    log2_min: u32,
}

impl FrequencyScale {
    pub(crate) fn new(sample_rate: u32, log2_min: u32) -> Self {
        let nyquist = sample_rate * 500;
        Self {
            nyquist,
            factor: (1u64 << 42) / u64::from(nyquist),
            log2_min,
        }
    }

    /// Nyquist frequency in millihertz
    pub(crate) fn nyquist(&self) -> u32 {
        self.nyquist
    }

    /// Table coordinate with [`FREQ_PRECISION_BITS`] fractional bits.
    ///
    /// Frequencies clamp to half of Nyquist; anything at or below the first
    /// table row maps to coordinate zero.
    pub(crate) fn coordinate(&self, millihertz: u32) -> u32 {
        let clamped = millihertz.min(self.nyquist / 2);
        let normalized = ((u64::from(clamped) * self.factor) >> 10) as u32;
        if normalized > 1 << self.log2_min {
            let octaves = math::log2(normalized) - ((self.log2_min as i32) << math::LOG_FRAC_BITS);
            (octaves as u32) << (FREQ_PRECISION_BITS - math::LOG_FRAC_BITS)
        } else {
            0
        }
    }
}

/// Integer index and 32-bit fraction of an unsigned coordinate.
#[inline]
pub(crate) fn split_coordinate(value: u32, bits: u32) -> (i32, u32) {
    ((value >> bits) as i32, value << (32 - bits))
}

/// Integer index and 32-bit fraction of a gain coordinate, which may be
/// negative for gains below the table.
#[inline]
pub(crate) fn split_gain(value: i32) -> (i32, u32) {
    (
        value >> GAIN_PRECISION_BITS,
        (value as u32) << (32 - GAIN_PRECISION_BITS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nyquist_is_in_millihertz() {
        let scale = FrequencyScale::new(48000, 23);
        assert_eq!(scale.nyquist(), 24_000_000);
    }

    #[test]
    fn half_nyquist_is_just_below_top_peaking_row() {
        // 2^42 / Nyquist truncates, so half of Nyquist lands a hair under
        // the last row.
        let scale = FrequencyScale::new(48000, 23);
        let coord = scale.coordinate(12_000_000);
        assert_eq!(split_coordinate(coord, FREQ_PRECISION_BITS), (7, 0xFFFE_0000));
        // Anything above clamps to the same coordinate.
        assert_eq!(scale.coordinate(u32::MAX), coord);
    }

    #[test]
    fn octave_steps_move_one_row() {
        let scale = FrequencyScale::new(44100, 23);
        let nyquist = scale.nyquist();
        let a = scale.coordinate(nyquist / 8);
        let b = scale.coordinate(nyquist / 4);
        assert_eq!(b - a, 1 << FREQ_PRECISION_BITS);
    }

    #[test]
    fn low_frequencies_map_to_zero() {
        let scale = FrequencyScale::new(48000, 23);
        assert_eq!(scale.coordinate(0), 0);
        // Nine octaves below Nyquist is the first row.
        assert_eq!(scale.coordinate(24_000_000 >> 9), 0);
        assert_eq!(scale.coordinate(10_000), 0);
    }

    #[test]
    fn gain_split_handles_negative_coordinates() {
        assert_eq!(split_gain(GAIN_BIAS_MB), (9, 384 << 22));
        assert_eq!(split_gain(-1), (-1, 0xFFC0_0000));
    }

    #[test]
    fn format_validation() {
        assert!(validate_format(1, 8000).is_ok());
        assert!(validate_format(2, 192_000).is_ok());
        assert_eq!(validate_format(3, 48000), Err(EqError::InvalidChannels(3)));
        assert_eq!(validate_format(1, 0), Err(EqError::InvalidSampleRate(0)));
        assert!(validate_format(1, MAX_SAMPLE_RATE + 1).is_err());
    }
}
