/// Equalizer engine errors
use thiserror::Error;

/// Result type alias using `EqError`
pub type Result<T> = std::result::Result<T, EqError>;

/// Equalizer engine error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EqError {
    /// Channel count outside 1..=MAX_CHANNELS
    #[error("Invalid channel count: {0}")]
    InvalidChannels(usize),

    /// Sample rate of zero
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    /// Band index outside the band chain
    #[error("Invalid band index {band} (equalizer has {count} bands)")]
    InvalidBand { band: usize, count: usize },

    /// Preset index outside the preset table
    #[error("Invalid preset index {preset} ({count} presets available)")]
    InvalidPreset { preset: usize, count: usize },

    /// Preset laid out for a different number of bands
    #[error("Preset '{name}' has {bands} bands, equalizer has {expected}")]
    PresetMismatch {
        name: &'static str,
        bands: usize,
        expected: usize,
    },

    /// Band count the chain cannot be built with
    #[error("Invalid band count: {0}")]
    InvalidBandCount(usize),

    /// Coefficient table does not match its declared dimensions
    #[error("Invalid coefficient table: {0}")]
    InvalidTable(String),
}
