//! Built-in equalizer presets
//!
//! A preset holds one `{gain, frequency, bandwidth}` triple per band, in
//! band order: low shelf, peaking bands, high shelf.

use serde::Serialize;

/// Number of bands the built-in presets are laid out for.
pub const DEFAULT_BAND_COUNT: usize = 5;

/// Center frequencies of the default band layout, in millihertz.
pub const DEFAULT_FREQUENCIES: [u32; DEFAULT_BAND_COUNT] =
    [50_000, 125_000, 900_000, 3_200_000, 6_300_000];

/// Bandwidths of the default band layout, in cents. Shelves carry 0.
pub const DEFAULT_BANDWIDTHS: [u32; DEFAULT_BAND_COUNT] = [0, 3600, 3600, 2400, 0];

/// Parameters of a single band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BandConfig {
    pub gain_mb: i32,
    pub freq_mhz: u32,
    pub bandwidth_cents: u32,
}

impl BandConfig {
    const fn new(gain_mb: i32, freq_mhz: u32, bandwidth_cents: u32) -> Self {
        Self {
            gain_mb,
            freq_mhz,
            bandwidth_cents,
        }
    }
}

/// Named band configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub bands: &'static [BandConfig],
}

const fn default_bands(gains: [i32; DEFAULT_BAND_COUNT]) -> [BandConfig; DEFAULT_BAND_COUNT] {
    let f = DEFAULT_FREQUENCIES;
    let bw = DEFAULT_BANDWIDTHS;
    [
        BandConfig::new(gains[0], f[0], bw[0]),
        BandConfig::new(gains[1], f[1], bw[1]),
        BandConfig::new(gains[2], f[2], bw[2]),
        BandConfig::new(gains[3], f[3], bw[3]),
        BandConfig::new(gains[4], f[4], bw[4]),
    ]
}

const NORMAL: [BandConfig; DEFAULT_BAND_COUNT] = default_bands([0, 0, 0, 0, 0]);
const CLASSIC: [BandConfig; DEFAULT_BAND_COUNT] = default_bands([300, 400, 0, 200, -300]);
const JAZZ: [BandConfig; DEFAULT_BAND_COUNT] = default_bands([-600, 200, 400, -400, -600]);
const POP: [BandConfig; DEFAULT_BAND_COUNT] = default_bands([400, -400, 300, -400, 600]);
const ROCK: [BandConfig; DEFAULT_BAND_COUNT] = default_bands([700, 400, -400, 400, 200]);

/// Presets shipped with the equalizer, for the default 5-band layout
pub static BUILTIN_PRESETS: [Preset; 5] = [
    Preset { name: "Normal", bands: &NORMAL },
    Preset { name: "Classic", bands: &CLASSIC },
    Preset { name: "Jazz", bands: &JAZZ },
    Preset { name: "Pop", bands: &POP },
    Preset { name: "Rock", bands: &ROCK },
];

/// Index into [`BUILTIN_PRESETS`] by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuiltinPreset {
    #[default]
    Normal,
    Classic,
    Jazz,
    Pop,
    Rock,
}

impl BuiltinPreset {
    pub const ALL: [Self; 5] = [Self::Normal, Self::Classic, Self::Jazz, Self::Pop, Self::Rock];

    /// Display name, as stored in the preset table
    pub fn name(self) -> &'static str {
        BUILTIN_PRESETS[self.index()].name
    }

    /// Position in [`BUILTIN_PRESETS`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name))
    }

    pub fn preset(self) -> &'static Preset {
        &BUILTIN_PRESETS[self.index()]
    }
}
