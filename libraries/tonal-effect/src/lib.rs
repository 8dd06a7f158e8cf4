//! Tonal effect control layer
//!
//! Wraps the `tonal-eq` engine in a host-facing audio effect:
//! - Lifecycle (`Initialized` / `Active` / released) and stream configuration
//! - Typed parameter access plus the raw parameter block wire format
//! - Raw command dispatch for hosts that speak integer command codes
//! - 16-bit PCM conversion with write or accumulate output
//!
//! # Example
//!
//! ```rust
//! use tonal_effect::{EqParam, EqParamSet, EqualizerEffect, ParamValue, ProcessStatus};
//!
//! # fn example() -> tonal_effect::Result<()> {
//! let mut effect = EqualizerEffect::new()?;
//! effect.set_param(&EqParamSet::CurrentPreset(1))?;
//! assert_eq!(
//!     effect.get_param(&EqParam::PresetName(Some(1)))?,
//!     ParamValue::Name("Classic")
//! );
//!
//! effect.enable()?;
//! let input = vec![0i16; 480];
//! let mut output = vec![0i16; 480];
//! assert_eq!(effect.process(&input, &mut output)?, ProcessStatus::Processed);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![deny(unsafe_code)]

pub mod adapter;
pub mod command;
pub mod config;
mod context;
pub mod descriptor;
mod error;
pub mod param;

pub use adapter::{FormatAdapter, ADAPTER_BUFFER_SAMPLES};
pub use command::EffectCommand;
pub use config::{AccessMode, BufferConfig, ChannelLayout, EffectConfig, PcmFormat};
pub use context::{EffectState, EqualizerEffect, ProcessStatus};
pub use descriptor::{EffectDescriptor, EQUALIZER_DESCRIPTOR};
pub use error::{
    EffectError, Result, STATUS_INVALID_ARGUMENT, STATUS_NOT_SUPPORTED, STATUS_NO_DATA,
};
pub use param::{BandProperties, EqParam, EqParamSet, ParamBlock, ParamId, ParamValue};
