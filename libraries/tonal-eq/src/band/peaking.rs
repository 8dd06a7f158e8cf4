/// Peaking band: boost or cut around a center frequency
use super::{
    split_coordinate, split_gain, validate_format, FrequencyScale, ParametricBand,
    BANDWIDTH_PRECISION_BITS, FREQ_PRECISION_BITS, GAIN_BIAS_MB,
};
use crate::biquad::{BiquadFilter, NUM_COEFS};
use crate::error::Result;
use crate::interpolator::CoefInterpolator;
use crate::math;
use crate::tables;

/// log2 of the normalised frequency of the first table row (9 octaves
/// below Nyquist).
const LOG2_MIN_FREQ: u32 = 32 - 9;

/// Bandwidth after a reset, in cents.
pub const DEFAULT_BANDWIDTH_CENTS: u32 = 2400;

/// Peaking band with frequency, gain and bandwidth controls
#[derive(Debug, Clone)]
pub struct PeakingBand {
    filter: BiquadFilter,
    interp: CoefInterpolator,
    scale: FrequencyScale,
    nominal_frequency: u32,
    // Table coordinates
    frequency: u32,
    gain: i32,
    bandwidth: u32,
}

impl PeakingBand {
    /// Create a flat band and commit it immediately.
    pub fn new(num_channels: usize, sample_rate: u32) -> Result<Self> {
        validate_format(num_channels, sample_rate)?;
        let mut band = Self {
            filter: BiquadFilter::new(num_channels, sample_rate)?,
            interp: CoefInterpolator::new(&tables::PEAKING_DIMS, NUM_COEFS, tables::peaking())?,
            scale: FrequencyScale::new(sample_rate, LOG2_MIN_FREQ),
            nominal_frequency: 0,
            frequency: 0,
            gain: GAIN_BIAS_MB,
            bandwidth: DEFAULT_BANDWIDTH_CENTS - 1,
        };
        band.configure(num_channels, sample_rate)?;
        band.reset();
        Ok(band)
    }

    /// Set bandwidth in cents. Takes effect on the next commit.
    pub fn set_bandwidth(&mut self, cents: u32) {
        self.bandwidth = cents.wrapping_sub(1);
    }

    /// Bandwidth in cents
    pub fn bandwidth(&self) -> u32 {
        self.bandwidth.wrapping_add(1)
    }

    /// Lower and upper edge of the band, in millihertz.
    ///
    /// Edges sit half the bandwidth below and above the center frequency;
    /// the upper edge is clamped to Nyquist.
    pub fn band_range(&self) -> (u32, u32) {
        // Half bandwidth in octaves, Q15
        let half_bw = ((self.bandwidth.wrapping_add(1) / 2) << 15) / 1200;
        let half_bw = half_bw as i32;
        let nominal = u64::from(self.nominal_frequency);
        let nyquist = self.scale.nyquist();

        let low = ((nominal * u64::from(math::exp2(-half_bw + (16 << 15)))) >> 16) as u32;
        let high = if half_bw >= 16 << 15 {
            nyquist
        } else {
            let high = (nominal * u64::from(math::exp2(half_bw + (16 << 15)))) >> 16;
            high.min(u64::from(nyquist)) as u32
        };
        (low, high)
    }
}

impl ParametricBand for PeakingBand {
    fn configure(&mut self, num_channels: usize, sample_rate: u32) -> Result<()> {
        validate_format(num_channels, sample_rate)?;
        self.scale = FrequencyScale::new(sample_rate, LOG2_MIN_FREQ);
        self.filter.configure(num_channels, sample_rate)?;
        self.set_frequency(self.nominal_frequency);
        self.commit(true);
        Ok(())
    }

    fn reset(&mut self) {
        self.set_gain(0);
        self.set_frequency(0);
        self.set_bandwidth(DEFAULT_BANDWIDTH_CENTS);
        self.commit(true);
    }

    fn commit(&mut self, immediate: bool) {
        let (f_int, f_frac) = split_coordinate(self.frequency, FREQ_PRECISION_BITS);
        let (bw_int, bw_frac) = split_coordinate(self.bandwidth, BANDWIDTH_PRECISION_BITS);
        let (g_int, g_frac) = split_gain(self.gain);

        let mut coefs = [0; NUM_COEFS];
        self.interp
            .coefficients_into(&[f_int, bw_int, g_int], &[f_frac, bw_frac, g_frac], &mut coefs);
        self.filter.set_coefficients(&coefs, immediate);
    }

    fn set_gain(&mut self, millibel: i32) {
        self.gain = millibel.saturating_add(GAIN_BIAS_MB);
    }

    fn gain(&self) -> i32 {
        self.gain - GAIN_BIAS_MB
    }

    fn set_frequency(&mut self, millihertz: u32) {
        self.nominal_frequency = millihertz;
        self.frequency = self.scale.coordinate(millihertz);
    }

    fn frequency(&self) -> u32 {
        self.nominal_frequency
    }

    fn filter(&self) -> &BiquadFilter {
        &self.filter
    }

    fn filter_mut(&mut self) -> &mut BiquadFilter {
        &mut self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biquad::{FilterState, Track};
    use crate::fixed::{Sample, COEF_ONE};

    fn noise(len: usize) -> Vec<Sample> {
        let mut state: u32 = 0x1234_5678;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                ((state >> 16) as i16 as Sample) << 9
            })
            .collect()
    }

    #[test]
    fn create_band() {
        let band = PeakingBand::new(1, 48000).unwrap();
        assert_eq!(band.gain(), 0);
        assert_eq!(band.frequency(), 0);
        assert_eq!(band.bandwidth(), DEFAULT_BANDWIDTH_CENTS);
        assert_eq!(band.filter().state(), FilterState::Bypass);
    }

    #[test]
    fn parameters_read_back() {
        let mut band = PeakingBand::new(2, 44100).unwrap();
        band.set_gain(-1234);
        band.set_frequency(1_000_000);
        band.set_bandwidth(3600);
        assert_eq!(band.gain(), -1234);
        assert_eq!(band.frequency(), 1_000_000);
        assert_eq!(band.bandwidth(), 3600);
    }

    #[test]
    fn nominal_frequency_is_kept_unclamped() {
        let mut band = PeakingBand::new(1, 8000).unwrap();
        band.set_frequency(30_000_000);
        assert_eq!(band.frequency(), 30_000_000);
    }

    #[test]
    fn zero_bandwidth_reads_back_as_zero() {
        let mut band = PeakingBand::new(1, 48000).unwrap();
        band.set_bandwidth(0);
        assert_eq!(band.bandwidth(), 0);
        band.set_frequency(1_000_000);
        assert_eq!(band.band_range(), (1_000_000, 1_000_000));
    }

    #[test]
    fn flat_band_is_transparent() {
        let mut band = PeakingBand::new(1, 48000).unwrap();
        band.set_frequency(900_000);
        band.set_bandwidth(3600);
        band.commit(true);
        band.enable(true);
        let coefs = *band.filter().coefficients();
        assert_eq!(coefs[0], COEF_ONE);
        assert_eq!(coefs[1], -coefs[3]);
        assert_eq!(coefs[2], -coefs[4]);

        let input = noise(2048);
        let mut output = vec![0; input.len()];
        band.process(&input, &mut output, Track::Left);
        assert_eq!(input, output);
    }

    #[test]
    fn boost_changes_coefficients() {
        let mut band = PeakingBand::new(1, 48000).unwrap();
        band.set_frequency(1_000_000);
        band.set_gain(600);
        band.commit(true);
        band.enable(true);
        assert!(band.filter().coefficients()[0] > COEF_ONE);
    }

    #[test]
    fn band_range_spans_one_octave_for_1200_cents() {
        let mut band = PeakingBand::new(1, 48000).unwrap();
        band.set_frequency(1_000_000);
        band.set_bandwidth(1200);
        let (low, high) = band.band_range();
        // Half an octave either side.
        assert!((low as f64 - 707_107.0).abs() < 100.0, "low {low}");
        assert!((high as f64 - 1_414_214.0).abs() < 100.0, "high {high}");
    }

    #[test]
    fn band_range_clamps_to_nyquist() {
        let mut band = PeakingBand::new(1, 48000).unwrap();
        band.set_frequency(20_000_000);
        band.set_bandwidth(3600);
        let (_, high) = band.band_range();
        assert_eq!(high, 24_000_000);
    }

    #[test]
    fn configure_recommits_at_new_rate() {
        let mut band = PeakingBand::new(1, 48000).unwrap();
        band.set_frequency(1_000_000);
        band.set_gain(900);
        band.commit(true);
        let at_48k = *band.filter().target_coefficients();

        band.configure(1, 96000).unwrap();
        assert_eq!(band.frequency(), 1_000_000);
        assert_ne!(band.filter().target_coefficients(), &at_48k);
        let (_, high) = {
            band.set_frequency(40_000_000);
            band.band_range()
        };
        assert_eq!(high, 48_000_000);
    }

    #[test]
    fn configure_rejects_bad_format_without_changes() {
        let mut band = PeakingBand::new(2, 48000).unwrap();
        assert!(band.configure(3, 48000).is_err());
        assert!(band.configure(1, 0).is_err());
        assert_eq!(band.filter().num_channels(), 2);
    }
}
