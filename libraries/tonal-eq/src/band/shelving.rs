/// Low and high shelving bands
use super::{
    split_coordinate, split_gain, validate_format, FrequencyScale, ParametricBand,
    FREQ_PRECISION_BITS, GAIN_BIAS_MB,
};
use crate::biquad::{BiquadFilter, NUM_COEFS};
use crate::error::Result;
use crate::interpolator::CoefInterpolator;
use crate::tables;

/// Which end of the spectrum a shelf acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelfKind {
    Low,
    High,
}

impl ShelfKind {
    // log2 of the normalised frequency of the first table row
    fn log2_min_freq(self) -> u32 {
        match self {
            Self::Low => 32 - 10,
            Self::High => 32 - 2,
        }
    }

    fn interpolator(self) -> Result<CoefInterpolator> {
        match self {
            Self::Low => CoefInterpolator::new(&tables::LOW_SHELF_DIMS, NUM_COEFS, tables::low_shelf()),
            Self::High => {
                CoefInterpolator::new(&tables::HIGH_SHELF_DIMS, NUM_COEFS, tables::high_shelf())
            }
        }
    }
}

/// Shelving band with frequency and gain controls
#[derive(Debug, Clone)]
pub struct ShelvingBand {
    kind: ShelfKind,
    filter: BiquadFilter,
    interp: CoefInterpolator,
    scale: FrequencyScale,
    nominal_frequency: u32,
    // Table coordinates
    frequency: u32,
    gain: i32,
}

impl ShelvingBand {
    /// Create a flat shelf and commit it immediately.
    pub fn new(kind: ShelfKind, num_channels: usize, sample_rate: u32) -> Result<Self> {
        validate_format(num_channels, sample_rate)?;
        let mut band = Self {
            kind,
            filter: BiquadFilter::new(num_channels, sample_rate)?,
            interp: kind.interpolator()?,
            scale: FrequencyScale::new(sample_rate, kind.log2_min_freq()),
            nominal_frequency: 0,
            frequency: 0,
            gain: GAIN_BIAS_MB,
        };
        band.configure(num_channels, sample_rate)?;
        band.reset();
        Ok(band)
    }

    pub fn kind(&self) -> ShelfKind {
        self.kind
    }
}

impl ParametricBand for ShelvingBand {
    fn configure(&mut self, num_channels: usize, sample_rate: u32) -> Result<()> {
        validate_format(num_channels, sample_rate)?;
        self.scale = FrequencyScale::new(sample_rate, self.kind.log2_min_freq());
        self.filter.configure(num_channels, sample_rate)?;
        self.set_frequency(self.nominal_frequency);
        self.commit(true);
        Ok(())
    }

    /// Flat gain, with the corner at the far edge of the shelf's range.
    fn reset(&mut self) {
        self.set_gain(0);
        let corner = match self.kind {
            ShelfKind::Low => 0,
            ShelfKind::High => self.scale.nyquist(),
        };
        self.set_frequency(corner);
        self.commit(true);
    }

    fn commit(&mut self, immediate: bool) {
        let (f_int, f_frac) = split_coordinate(self.frequency, FREQ_PRECISION_BITS);
        let (g_int, g_frac) = split_gain(self.gain);

        let mut coefs = [0; NUM_COEFS];
        self.interp
            .coefficients_into(&[f_int, g_int], &[f_frac, g_frac], &mut coefs);
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
    use crate::biquad::Track;
    use crate::fixed::{Coef, Sample, COEF_ONE};

    fn sweep(len: usize) -> Vec<Sample> {
        (0..len)
            .map(|n| {
                let phase = (n * n) as f64 * 1e-4;
                ((phase.sin() * 20000.0) as i32) << 9
            })
            .collect()
    }

    // Steady-state amplitude of a sine at `hz` after the shelf.
    fn sine_gain(band: &mut ShelvingBand, hz: f64, sample_rate: f64) -> f64 {
        let len = 8192;
        let input: Vec<Sample> = (0..len)
            .map(|n| {
                let v = (2.0 * std::f64::consts::PI * hz * n as f64 / sample_rate).sin();
                (v * 8_000_000.0) as Sample
            })
            .collect();
        let mut output = vec![0; len];
        band.clear();
        band.process(&input, &mut output, Track::Left);
        let peak_in = input[len / 2..].iter().map(|s| s.abs()).max().unwrap_or(1);
        let peak_out = output[len / 2..].iter().map(|s| s.abs()).max().unwrap_or(0);
        f64::from(peak_out) / f64::from(peak_in)
    }

    fn assert_transparent(coefs: &[Coef; NUM_COEFS]) {
        assert_eq!(coefs[0], COEF_ONE);
        assert_eq!(coefs[1], -coefs[3]);
        assert_eq!(coefs[2], -coefs[4]);
    }

    #[test]
    fn reset_places_corners_at_range_edges() {
        let low = ShelvingBand::new(ShelfKind::Low, 1, 48000).unwrap();
        assert_eq!(low.frequency(), 0);
        assert_eq!(low.gain(), 0);

        let high = ShelvingBand::new(ShelfKind::High, 2, 48000).unwrap();
        assert_eq!(high.frequency(), 24_000_000);
        assert_eq!(high.kind(), ShelfKind::High);
    }

    #[test]
    fn flat_shelves_pass_samples_through() {
        for kind in [ShelfKind::Low, ShelfKind::High] {
            let mut band = ShelvingBand::new(kind, 1, 44100).unwrap();
            band.set_frequency(1_500_000);
            band.commit(true);
            band.enable(true);
            assert_transparent(band.filter().coefficients());

            let input = sweep(4096);
            let mut output = vec![0; input.len()];
            band.process(&input, &mut output, Track::Left);
            assert_eq!(input, output, "{kind:?}");
        }
    }

    #[test]
    fn low_shelf_boosts_lows_only() {
        let mut band = ShelvingBand::new(ShelfKind::Low, 1, 48000).unwrap();
        band.set_frequency(200_000);
        band.set_gain(1200);
        band.commit(true);
        band.enable(true);

        let low = sine_gain(&mut band, 40.0, 48000.0);
        let high = sine_gain(&mut band, 8000.0, 48000.0);
        assert!(low > 1.6, "low gain {low}");
        assert!((high - 1.0).abs() < 0.1, "high gain {high}");
    }

    #[test]
    fn high_shelf_cuts_highs_only() {
        let mut band = ShelvingBand::new(ShelfKind::High, 1, 48000).unwrap();
        band.set_frequency(4_000_000);
        band.set_gain(-1200);
        band.commit(true);
        band.enable(true);

        let low = sine_gain(&mut band, 100.0, 48000.0);
        let high = sine_gain(&mut band, 16000.0, 48000.0);
        assert!((low - 1.0).abs() < 0.1, "low gain {low}");
        assert!(high < 0.6, "high gain {high}");
    }

    #[test]
    fn configure_keeps_parameters() {
        let mut band = ShelvingBand::new(ShelfKind::Low, 1, 48000).unwrap();
        band.set_frequency(300_000);
        band.set_gain(-500);
        band.configure(2, 32000).unwrap();
        assert_eq!(band.frequency(), 300_000);
        assert_eq!(band.gain(), -500);
        assert_eq!(band.filter().num_channels(), 2);
    }
}
