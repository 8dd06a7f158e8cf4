//! Stream configuration negotiated with the host
//!
//! Wire layout (little endian), one record per buffer, input then output:
//!
//! ```text
//! u32 sample rate | u32 channel layout | u8 format | u8 access | u16 mask
//! ```

use serde::{Deserialize, Serialize};
use tonal_eq::band::MAX_SAMPLE_RATE;

use crate::error::{EffectError, Result};

/// Size of one encoded buffer record
pub const BUFFER_CONFIG_SIZE: usize = 12;

/// Size of an encoded `EffectConfig`
pub const EFFECT_CONFIG_SIZE: usize = 2 * BUFFER_CONFIG_SIZE;

/// Mask value announcing that every field is set
const CONFIG_ALL: u16 = 0x003F;

/// Channel layout of an interleaved buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    Mono,
    Stereo,
    Quad,
    Surround,
}

impl ChannelLayout {
    /// Number of interleaved channels
    pub fn channel_count(self) -> usize {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
            Self::Quad => 4,
            Self::Surround => 6,
        }
    }

    fn code(self) -> u32 {
        match self {
            Self::Mono => 0x1,
            Self::Stereo => 0x3,
            Self::Quad => 0x33,
            Self::Surround => 0x3F,
        }
    }

    fn from_code(code: u32) -> Result<Self> {
        match code {
            0x1 => Ok(Self::Mono),
            0x3 => Ok(Self::Stereo),
            0x33 => Ok(Self::Quad),
            0x3F => Ok(Self::Surround),
            _ => Err(EffectError::invalid(format!("unknown channel layout {code:#x}"))),
        }
    }
}

/// Sample encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PcmFormat {
    Pcm16,
    Pcm8,
    Pcm32,
    Pcm8_24,
    Float,
}

impl PcmFormat {
    fn code(self) -> u8 {
        match self {
            Self::Pcm16 => 1,
            Self::Pcm8 => 2,
            Self::Pcm32 => 3,
            Self::Pcm8_24 => 4,
            Self::Float => 5,
        }
    }

    fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Self::Pcm16),
            2 => Ok(Self::Pcm8),
            3 => Ok(Self::Pcm32),
            4 => Ok(Self::Pcm8_24),
            5 => Ok(Self::Float),
            _ => Err(EffectError::invalid(format!("unknown sample format {code}"))),
        }
    }
}

/// How a buffer is accessed while processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// Output overwrites the buffer
    Write,
    /// Buffer is only read
    Read,
    /// Output is added onto the buffer
    Accumulate,
}

impl AccessMode {
    fn code(self) -> u8 {
        match self {
            Self::Write => 0,
            Self::Read => 1,
            Self::Accumulate => 2,
        }
    }

    fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Write),
            1 => Ok(Self::Read),
            2 => Ok(Self::Accumulate),
            _ => Err(EffectError::invalid(format!("unknown access mode {code}"))),
        }
    }
}

/// Configuration of one side of the effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    pub sample_rate: u32,
    pub channels: ChannelLayout,
    pub format: PcmFormat,
    pub access: AccessMode,
}

impl BufferConfig {
    fn write_to(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[4..8].copy_from_slice(&self.channels.code().to_le_bytes());
        out[8] = self.format.code();
        out[9] = self.access.code();
        out[10..12].copy_from_slice(&CONFIG_ALL.to_le_bytes());
    }

    fn read_from(bytes: &[u8]) -> Result<Self> {
        let word = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        Ok(Self {
            sample_rate: word(0),
            channels: ChannelLayout::from_code(word(4))?,
            format: PcmFormat::from_code(bytes[8])?,
            access: AccessMode::from_code(bytes[9])?,
        })
    }
}

/// Input and output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectConfig {
    pub input: BufferConfig,
    pub output: BufferConfig,
}

impl Default for EffectConfig {
    /// 48 kHz mono 16-bit, read input, write output
    fn default() -> Self {
        let side = |access| BufferConfig {
            sample_rate: 48000,
            channels: ChannelLayout::Mono,
            format: PcmFormat::Pcm16,
            access,
        };
        Self {
            input: side(AccessMode::Read),
            output: side(AccessMode::Write),
        }
    }
}

impl EffectConfig {
    /// Check that the effect can run this configuration
    ///
    /// Returns the channel count on success.
    pub fn validate(&self) -> Result<usize> {
        let (input, output) = (&self.input, &self.output);
        if input.sample_rate != output.sample_rate {
            return Err(EffectError::invalid(format!(
                "input rate {} differs from output rate {}",
                input.sample_rate, output.sample_rate
            )));
        }
        if input.sample_rate == 0 || input.sample_rate > MAX_SAMPLE_RATE {
            return Err(EffectError::invalid(format!(
                "unsupported sample rate {}",
                input.sample_rate
            )));
        }
        if input.channels != output.channels {
            return Err(EffectError::invalid("input and output channel layouts differ"));
        }
        if !matches!(input.channels, ChannelLayout::Mono | ChannelLayout::Stereo) {
            return Err(EffectError::invalid(format!(
                "unsupported channel layout {:?}",
                input.channels
            )));
        }
        if !matches!(output.access, AccessMode::Write | AccessMode::Accumulate) {
            return Err(EffectError::invalid(format!(
                "unsupported output access {:?}",
                output.access
            )));
        }
        if input.format != output.format {
            return Err(EffectError::invalid("input and output formats differ"));
        }
        if input.format != PcmFormat::Pcm16 {
            return Err(EffectError::invalid(format!(
                "unsupported sample format {:?}",
                input.format
            )));
        }
        Ok(input.channels.channel_count())
    }

    pub fn to_bytes(&self) -> [u8; EFFECT_CONFIG_SIZE] {
        let mut out = [0u8; EFFECT_CONFIG_SIZE];
        self.input.write_to(&mut out[..BUFFER_CONFIG_SIZE]);
        self.output.write_to(&mut out[BUFFER_CONFIG_SIZE..]);
        out
    }

    /// Decode a configuration; the slice must be exactly `EFFECT_CONFIG_SIZE` bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != EFFECT_CONFIG_SIZE {
            return Err(EffectError::invalid(format!(
                "config is {} bytes, expected {EFFECT_CONFIG_SIZE}",
                bytes.len()
            )));
        }
        Ok(Self {
            input: BufferConfig::read_from(&bytes[..BUFFER_CONFIG_SIZE])?,
            output: BufferConfig::read_from(&bytes[BUFFER_CONFIG_SIZE..])?,
        })
    }
}
