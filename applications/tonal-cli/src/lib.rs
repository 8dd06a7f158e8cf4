//! Tonal driver library
//!
//! Feeds 16-bit PCM files through the equalizer effect. The binary wraps
//! these pieces; they are exposed for testing.

pub mod config;
pub mod error;
pub mod pcm;
pub mod pipeline;

pub use config::CliConfig;
pub use error::{CliError, Result};
pub use pcm::{AudioData, Container};
pub use pipeline::{process_audio, EqSetup, ProcessReport};
