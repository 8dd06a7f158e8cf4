/// Driver configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when no path is given, if present
pub const DEFAULT_CONFIG_FILE: &str = "tonal.toml";

/// Largest block the driver hands to the effect in one call
pub const MAX_BLOCK_FRAMES: usize = 1 << 16;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_audio")]
    pub audio: AudioSettings,

    #[serde(default)]
    pub eq: EqSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AudioSettings {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_channels")]
    pub channels: u16,

    /// Frames per process call
    #[serde(default = "default_block_frames")]
    pub block_frames: usize,

    /// Mix the equalized signal onto the dry input instead of replacing it
    #[serde(default)]
    pub accumulate: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EqSettings {
    /// Preset name or index
    #[serde(default)]
    pub preset: Option<String>,

    /// Per-band levels in millibels, applied after the preset
    #[serde(default)]
    pub levels: Vec<i32>,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise [`DEFAULT_CONFIG_FILE`] is
    /// read when present. Environment variables prefixed `TONAL_` override
    /// the file, with `__` between nested keys (`TONAL_AUDIO__SAMPLE_RATE`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("TONAL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 || self.audio.sample_rate > tonal_eq::band::MAX_SAMPLE_RATE
        {
            return Err(CliError::Config(format!(
                "Unsupported sample rate {}",
                self.audio.sample_rate
            )));
        }

        if !(1..=2).contains(&self.audio.channels) {
            return Err(CliError::Config(format!(
                "Only mono or stereo is supported, got {} channels",
                self.audio.channels
            )));
        }

        if self.audio.block_frames == 0 || self.audio.block_frames > MAX_BLOCK_FRAMES {
            return Err(CliError::Config(format!(
                "Block size must be 1..={MAX_BLOCK_FRAMES} frames, got {}",
                self.audio.block_frames
            )));
        }

        if self.eq.levels.len() > tonal_eq::DEFAULT_BAND_COUNT {
            return Err(CliError::Config(format!(
                "{} levels given for {} bands",
                self.eq.levels.len(),
                tonal_eq::DEFAULT_BAND_COUNT
            )));
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))
    }
}

// Default values
fn default_audio() -> AudioSettings {
    AudioSettings {
        sample_rate: default_sample_rate(),
        channels: default_channels(),
        block_frames: default_block_frames(),
        accumulate: false,
    }
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_channels() -> u16 {
    2
}

fn default_block_frames() -> usize {
    256
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            audio: default_audio(),
            eq: EqSettings::default(),
        }
    }
}
