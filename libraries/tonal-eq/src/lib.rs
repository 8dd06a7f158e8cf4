//! Tonal fixed-point parametric equalizer
//!
//! This crate provides:
//! - Q24 fixed-point biquad filters with click-free coefficient ramping
//! - Multilinear interpolation over precomputed coefficient tables
//! - Peaking and shelving bands driven by millihertz / millibel / cents
//! - A band chain (low shelf, peaking bands, high shelf) with presets
//!
//! # Architecture
//!
//! ```text
//! set_gain / set_frequency / set_bandwidth
//!            │
//!            ▼
//! ┌──────────────┐   coordinates   ┌──────────────────┐
//! │ Band         │ ──────────────► │ CoefInterpolator │
//! └──────────────┘                 └──────────────────┘
//!            │ commit                       │
//!            ▼                              │ [b0 b1 b2 -a1 -a2]
//! ┌──────────────┐ ◄────────────────────────┘
//! │ BiquadFilter │  ramps toward target coefficients
//! └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use tonal_eq::{Equalizer, Track, BUILTIN_PRESETS, DEFAULT_BAND_COUNT};
//!
//! # fn example() -> tonal_eq::Result<()> {
//! let mut eq = Equalizer::new(DEFAULT_BAND_COUNT, 2, 48000, &BUILTIN_PRESETS)?;
//! eq.set_preset(4)?; // Rock
//! eq.commit(true);
//! eq.enable(true);
//!
//! // Interleaved stereo, Q24 samples
//! let input = vec![0; 2 * 256];
//! let mut output = vec![0; input.len()];
//! eq.process(&input, &mut output, Track::Left);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![deny(unsafe_code)]

pub mod band;
pub mod biquad;
mod equalizer;
mod error;
pub mod fixed;
pub mod interpolator;
pub mod math;
mod preset;
pub mod tables;

pub use band::{ParametricBand, PeakingBand, ShelfKind, ShelvingBand};
pub use biquad::{BiquadFilter, FilterState, Track};
pub use equalizer::{BandKind, Equalizer, LEVEL_RANGE_MB, MAX_PEAKING_BANDS, MIN_FREQUENCY_MHZ};
pub use error::{EqError, Result};
pub use fixed::{Coef, Sample};
pub use interpolator::CoefInterpolator;
pub use preset::{
    BandConfig, BuiltinPreset, Preset, BUILTIN_PRESETS, DEFAULT_BANDWIDTHS, DEFAULT_BAND_COUNT,
    DEFAULT_FREQUENCIES,
};
