/// Equalizer: a low shelf, a run of peaking bands and a high shelf
///
/// Bands are addressed by index: 0 is the low shelf, `1..=num_peaking` are
/// the peaking bands in ascending frequency order and the last index is the
/// high shelf. Parameter setters only stage values; call
/// [`Equalizer::commit`] to push them into the filters.
use tracing::debug;

use crate::band::{
    validate_format, ParametricBand, PeakingBand, ShelfKind, ShelvingBand, MAX_SAMPLE_RATE,
};
use crate::biquad::Track;
use crate::error::{EqError, Result};
use crate::fixed::Sample;
use crate::math;
use crate::preset::Preset;

/// Most peaking bands an equalizer can hold.
pub const MAX_PEAKING_BANDS: usize = 8;

/// Lowest center frequency used when spreading bands on reset, in millihertz.
pub const MIN_FREQUENCY_MHZ: u32 = 20_000;

/// Gain range reported to clients, in millibel.
pub const LEVEL_RANGE_MB: (i32, i32) = (-9600, 4800);

/// Shape of a band in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandKind {
    LowShelf,
    Peaking,
    HighShelf,
}

/// Full band chain with presets
#[derive(Debug, Clone)]
pub struct Equalizer {
    sample_rate: u32,
    low_shelf: ShelvingBand,
    peaking: Vec<PeakingBand>,
    high_shelf: ShelvingBand,
    presets: &'static [Preset],
    // None while bands have been edited individually
    current_preset: Option<usize>,
}

impl Equalizer {
    /// Build a chain of `band_count` bands (two shelves plus peaking bands)
    /// and reset it.
    pub fn new(
        band_count: usize,
        num_channels: usize,
        sample_rate: u32,
        presets: &'static [Preset],
    ) -> Result<Self> {
        if !(2..=MAX_PEAKING_BANDS + 2).contains(&band_count) {
            return Err(EqError::InvalidBandCount(band_count));
        }
        validate_format(num_channels, sample_rate)?;

        let peaking = (0..band_count - 2)
            .map(|_| PeakingBand::new(num_channels, sample_rate))
            .collect::<Result<Vec<_>>>()?;
        let mut eq = Self {
            sample_rate,
            low_shelf: ShelvingBand::new(ShelfKind::Low, num_channels, sample_rate)?,
            peaking,
            high_shelf: ShelvingBand::new(ShelfKind::High, num_channels, sample_rate)?,
            presets,
            current_preset: None,
        };
        eq.reset();
        debug!(
            bands = band_count,
            channels = num_channels,
            sample_rate,
            presets = presets.len(),
            "Equalizer created"
        );
        Ok(eq)
    }

    /// Reconfigure every band for a new stream format.
    ///
    /// Band parameters are kept and recommitted immediately.
    pub fn configure(&mut self, num_channels: usize, sample_rate: u32) -> Result<()> {
        validate_format(num_channels, sample_rate)?;
        for band in self.bands_mut() {
            band.configure(num_channels, sample_rate)?;
        }
        self.sample_rate = sample_rate;
        debug!(channels = num_channels, sample_rate, "Equalizer configured");
        Ok(())
    }

    /// Spread the bands evenly on a log scale between [`MIN_FREQUENCY_MHZ`]
    /// and Nyquist, flatten every gain and commit immediately.
    pub fn reset(&mut self) {
        debug_assert!(self.sample_rate <= MAX_SAMPLE_RATE);
        let bottom = math::log2(MIN_FREQUENCY_MHZ);
        let top = math::log2(self.sample_rate * 500);
        let jump = (top - bottom) / (self.peaking.len() as i32 + 2);
        let mut center = bottom + jump / 2;

        self.low_shelf.reset();
        self.low_shelf.set_frequency(math::exp2(center));
        center += jump;
        for band in &mut self.peaking {
            band.reset();
            band.set_frequency(math::exp2(center));
            center += jump;
        }
        self.high_shelf.reset();
        self.high_shelf.set_frequency(math::exp2(center));

        self.commit(true);
        self.current_preset = None;
    }

    /// Zero the history of every filter.
    pub fn clear(&mut self) {
        for band in self.bands_mut() {
            band.clear();
        }
    }

    /// Push staged parameters into every filter, in chain order.
    pub fn commit(&mut self, immediate: bool) {
        for band in self.bands_mut() {
            band.commit(immediate);
        }
    }

    pub fn enable(&mut self, immediate: bool) {
        for band in self.bands_mut() {
            band.enable(immediate);
        }
    }

    pub fn disable(&mut self, immediate: bool) {
        for band in self.bands_mut() {
            band.disable(immediate);
        }
    }

    /// Total number of bands, shelves included
    pub fn num_bands(&self) -> usize {
        self.peaking.len() + 2
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Shape of the band at `band`
    pub fn band_kind(&self, band: usize) -> Result<BandKind> {
        self.check_band(band)?;
        Ok(if band == 0 {
            BandKind::LowShelf
        } else if band == self.peaking.len() + 1 {
            BandKind::HighShelf
        } else {
            BandKind::Peaking
        })
    }

    pub fn set_gain(&mut self, band: usize, millibel: i32) -> Result<()> {
        self.band_mut(band)?.set_gain(millibel);
        self.current_preset = None;
        Ok(())
    }

    /// Gain in millibel
    pub fn gain(&self, band: usize) -> Result<i32> {
        Ok(self.band(band)?.gain())
    }

    pub fn set_frequency(&mut self, band: usize, millihertz: u32) -> Result<()> {
        self.band_mut(band)?.set_frequency(millihertz);
        self.current_preset = None;
        Ok(())
    }

    /// Frequency in millihertz
    pub fn frequency(&self, band: usize) -> Result<u32> {
        Ok(self.band(band)?.frequency())
    }

    /// Set a peaking band's bandwidth in cents.
    ///
    /// Shelves have no bandwidth; the call is accepted and has no effect.
    pub fn set_bandwidth(&mut self, band: usize, cents: u32) -> Result<()> {
        self.check_band(band)?;
        if let Some(peaking) = self.peaking_mut(band) {
            peaking.set_bandwidth(cents);
            self.current_preset = None;
        }
        Ok(())
    }

    /// Bandwidth in cents; 0 for the shelves
    pub fn bandwidth(&self, band: usize) -> Result<u32> {
        self.check_band(band)?;
        Ok(self.peaking(band).map_or(0, PeakingBand::bandwidth))
    }

    /// Frequency range a band covers, in millihertz.
    ///
    /// The low shelf spans from 0 to its corner, the high shelf from its
    /// corner to Nyquist.
    pub fn band_range(&self, band: usize) -> Result<(u32, u32)> {
        Ok(match self.band_kind(band)? {
            BandKind::LowShelf => (0, self.low_shelf.frequency()),
            BandKind::HighShelf => (self.high_shelf.frequency(), self.sample_rate * 500),
            BandKind::Peaking => self.peaking[band - 1].band_range(),
        })
    }

    pub fn num_presets(&self) -> usize {
        self.presets.len()
    }

    pub fn presets(&self) -> &'static [Preset] {
        self.presets
    }

    /// Index of the applied preset, or `None` once bands were edited
    /// individually
    pub fn current_preset(&self) -> Option<usize> {
        self.current_preset
    }

    /// Name of a preset; `None` names the custom setting.
    pub fn preset_name(&self, preset: Option<usize>) -> Result<&'static str> {
        match preset {
            None => Ok("Custom"),
            Some(index) => self
                .presets
                .get(index)
                .map(|p| p.name)
                .ok_or(EqError::InvalidPreset {
                    preset: index,
                    count: self.presets.len(),
                }),
        }
    }

    /// Stage every band's parameters from a preset.
    ///
    /// The preset only takes effect on the next [`commit`](Self::commit).
    pub fn set_preset(&mut self, preset: usize) -> Result<()> {
        let presets = self.presets;
        let config = presets.get(preset).ok_or(EqError::InvalidPreset {
            preset,
            count: presets.len(),
        })?;
        if config.bands.len() != self.num_bands() {
            return Err(EqError::PresetMismatch {
                name: config.name,
                bands: config.bands.len(),
                expected: self.num_bands(),
            });
        }
        for (band, cfg) in config.bands.iter().enumerate() {
            self.set_gain(band, cfg.gain_mb)?;
            self.set_frequency(band, cfg.freq_mhz)?;
            self.set_bandwidth(band, cfg.bandwidth_cents)?;
        }
        self.current_preset = Some(preset);
        debug!(preset, name = config.name, "Preset applied");
        Ok(())
    }

    /// Filter `input` into `output` through the whole chain.
    ///
    /// The first band reads `input`, the rest run in place on `output`.
    pub fn process(&mut self, input: &[Sample], output: &mut [Sample], track: Track) {
        self.low_shelf.process(input, output, track);
        self.run_remaining(output, track);
    }

    pub fn process_in_place(&mut self, buffer: &mut [Sample], track: Track) {
        self.low_shelf.process_in_place(buffer, track);
        self.run_remaining(buffer, track);
    }

    /// Band whose frequency is closest to `millihertz` on a log scale.
    ///
    /// Ties resolve to the lower band.
    pub fn most_relevant_band(&self, millihertz: u32) -> usize {
        let mut low = self.low_shelf.frequency();
        if millihertz <= low {
            return 0;
        }
        let mut high = self.high_shelf.frequency();
        if millihertz >= high {
            return self.peaking.len() + 1;
        }

        // Index of the band just below the target
        let mut band = self.peaking.len();
        for (i, peaking) in self.peaking.iter().enumerate() {
            let freq = peaking.frequency();
            if freq >= millihertz {
                high = freq;
                band = i;
                break;
            }
            low = freq;
        }

        // log2(0) is i32::MIN, so distances need the wider type
        let target = i64::from(math::log2(millihertz));
        if i64::from(math::log2(high)) - target < target - i64::from(math::log2(low)) {
            band + 1
        } else {
            band
        }
    }

    /// Gain range in millibel
    pub fn level_range(&self) -> (i32, i32) {
        LEVEL_RANGE_MB
    }

    fn run_remaining(&mut self, buffer: &mut [Sample], track: Track) {
        for band in &mut self.peaking {
            band.process_in_place(buffer, track);
        }
        self.high_shelf.process_in_place(buffer, track);
    }

    fn check_band(&self, band: usize) -> Result<()> {
        if band < self.num_bands() {
            Ok(())
        } else {
            Err(EqError::InvalidBand {
                band,
                count: self.num_bands(),
            })
        }
    }

    fn band(&self, band: usize) -> Result<&dyn ParametricBand> {
        Ok(match self.band_kind(band)? {
            BandKind::LowShelf => &self.low_shelf as &dyn ParametricBand,
            BandKind::HighShelf => &self.high_shelf,
            BandKind::Peaking => &self.peaking[band - 1],
        })
    }

    fn band_mut(&mut self, band: usize) -> Result<&mut dyn ParametricBand> {
        Ok(match self.band_kind(band)? {
            BandKind::LowShelf => &mut self.low_shelf as &mut dyn ParametricBand,
            BandKind::HighShelf => &mut self.high_shelf,
            BandKind::Peaking => &mut self.peaking[band - 1],
        })
    }

    fn peaking(&self, band: usize) -> Option<&PeakingBand> {
        band.checked_sub(1).and_then(|i| self.peaking.get(i))
    }

    fn peaking_mut(&mut self, band: usize) -> Option<&mut PeakingBand> {
        band.checked_sub(1).and_then(|i| self.peaking.get_mut(i))
    }

    // Chain order: low shelf, peaking bands, high shelf
    fn bands_mut(&mut self) -> impl Iterator<Item = &mut dyn ParametricBand> + '_ {
        std::iter::once(&mut self.low_shelf as &mut dyn ParametricBand)
            .chain(self.peaking.iter_mut().map(|b| b as &mut dyn ParametricBand))
            .chain(std::iter::once(&mut self.high_shelf as &mut dyn ParametricBand))
    }
}
