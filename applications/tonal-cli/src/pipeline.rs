//! Drives an equalizer effect through its command interface

use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::pcm::AudioData;
use tonal_eq::BuiltinPreset;
use tonal_effect::param::encode_set_request;
use tonal_effect::{
    AccessMode, ChannelLayout, EffectCommand, EffectConfig, EqParamSet, EqualizerEffect,
    ProcessStatus,
};

/// Equalizer settings for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EqSetup {
    pub preset: Option<usize>,
    /// (band, millibels), applied after the preset
    pub levels: Vec<(usize, i32)>,
}

impl EqSetup {
    /// Settings from the `[eq]` section of a config
    pub fn from_config(config: &CliConfig) -> Result<Self> {
        let preset = config.eq.preset.as_deref().map(parse_preset).transpose()?;
        Ok(Self {
            preset,
            levels: config.eq.levels.iter().copied().enumerate().collect(),
        })
    }
}

/// Summary of a processing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessReport {
    pub frames: usize,
    pub blocks: usize,
    pub peak_in: u16,
    pub peak_out: u16,
}

/// Preset by index or case-insensitive name
pub fn parse_preset(text: &str) -> Result<usize> {
    if let Ok(index) = text.parse::<usize>() {
        return Ok(index);
    }
    BuiltinPreset::from_name(text)
        .map(BuiltinPreset::index)
        .ok_or_else(|| CliError::InvalidArgument(format!("Unknown preset '{text}'")))
}

/// Parse `BAND=MILLIBELS`
pub fn parse_level(text: &str) -> Result<(usize, i32)> {
    let invalid = || CliError::InvalidArgument(format!("Expected BAND=MILLIBELS, got '{text}'"));
    let (band, level) = text.split_once('=').ok_or_else(invalid)?;
    let band = band.trim().parse().map_err(|_| invalid())?;
    let level = level.trim().parse().map_err(|_| invalid())?;
    Ok((band, level))
}

/// Effect configuration for a stream
pub fn effect_config(sample_rate: u32, channels: u16, accumulate: bool) -> Result<EffectConfig> {
    let layout = match channels {
        1 => ChannelLayout::Mono,
        2 => ChannelLayout::Stereo,
        n => {
            return Err(CliError::UnsupportedAudio(format!(
                "{n} channels, only mono or stereo is supported"
            )))
        }
    };
    let mut config = EffectConfig::default();
    for side in [&mut config.input, &mut config.output] {
        side.sample_rate = sample_rate;
        side.channels = layout;
    }
    if accumulate {
        config.output.access = AccessMode::Accumulate;
    }
    Ok(config)
}

/// Build an effect configured for `audio` with `setup` applied and enabled
pub fn prepare_effect(
    audio: &AudioData,
    setup: &EqSetup,
    accumulate: bool,
) -> Result<EqualizerEffect> {
    let mut effect = EqualizerEffect::new()?;
    let config = effect_config(audio.sample_rate, audio.channels, accumulate)?;
    send_status(&mut effect, EffectCommand::SetConfig, &config.to_bytes(), "SET_CONFIG")?;

    if let Some(preset) = setup.preset {
        let request = encode_set_request(&EqParamSet::CurrentPreset(preset));
        send_status(&mut effect, EffectCommand::SetParam, &request, "preset")?;
    }
    for &(band, millibel) in &setup.levels {
        let request = encode_set_request(&EqParamSet::BandLevel { band, millibel });
        send_status(&mut effect, EffectCommand::SetParam, &request, "band level")?;
    }
    send_status(&mut effect, EffectCommand::Enable, &[], "ENABLE")?;
    Ok(effect)
}

/// Equalize `audio` in place, `block_frames` frames per process call
///
/// With `accumulate` the result is the dry signal plus the equalized one,
/// saturated.
pub fn process_audio(
    audio: &mut AudioData,
    setup: &EqSetup,
    block_frames: usize,
    accumulate: bool,
) -> Result<ProcessReport> {
    if block_frames == 0 {
        return Err(CliError::InvalidArgument("block size of zero".to_string()));
    }
    let mut effect = prepare_effect(audio, setup, accumulate)?;
    let peak_in = peak(&audio.samples);

    let block = block_frames * usize::from(audio.channels);
    let mut output = vec![0i16; block];
    let mut blocks = 0;
    for chunk in audio.samples.chunks_mut(block) {
        let out = &mut output[..chunk.len()];
        // Accumulate mixes the equalized signal onto the dry input
        if accumulate {
            out.copy_from_slice(chunk);
        }
        match effect.process(chunk, out)? {
            ProcessStatus::Processed => chunk.copy_from_slice(out),
            ProcessStatus::NoData => {
                return Err(CliError::Rejected {
                    request: "process".to_string(),
                    status: ProcessStatus::NoData.status(),
                })
            }
        }
        blocks += 1;
    }

    let report = ProcessReport {
        frames: audio.frames(),
        blocks,
        peak_in,
        peak_out: peak(&audio.samples),
    };
    tracing::info!(
        frames = report.frames,
        blocks = report.blocks,
        peak_in = report.peak_in,
        peak_out = report.peak_out,
        "Processing complete"
    );
    Ok(report)
}

fn send_status(
    effect: &mut EqualizerEffect,
    command: EffectCommand,
    cmd: &[u8],
    request: &str,
) -> Result<()> {
    let mut reply = [0u8; 4];
    effect.command(command.code(), cmd, &mut reply)?;
    let status = i32::from_le_bytes(reply);
    if status != 0 {
        return Err(CliError::Rejected {
            request: request.to_string(),
            status,
        });
    }
    tracing::debug!("{} accepted", request);
    Ok(())
}

fn peak(samples: &[i16]) -> u16 {
    samples.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preset() {
        assert_eq!(parse_preset("3").unwrap(), 3);
        assert_eq!(parse_preset("ROCK").unwrap(), 4);
        assert_eq!(parse_preset("classic").unwrap(), 1);
        assert!(parse_preset("metal").is_err());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("2=-300").unwrap(), (2, -300));
        assert_eq!(parse_level(" 0 = 450 ").unwrap(), (0, 450));
        assert!(parse_level("2:-300").is_err());
        assert!(parse_level("x=1").is_err());
        assert!(parse_level("1=").is_err());
    }

    #[test]
    fn test_effect_config_layout() {
        let config = effect_config(44100, 2, true).unwrap();
        assert_eq!(config.validate().unwrap(), 2);
        assert_eq!(config.output.access, AccessMode::Accumulate);
        assert!(effect_config(44100, 3, false).is_err());
    }

    #[test]
    fn test_rejected_setup_reports_status() {
        let audio = AudioData {
            sample_rate: 48000,
            channels: 1,
            samples: vec![0; 16],
        };
        let setup = EqSetup {
            preset: Some(9),
            levels: vec![],
        };
        match prepare_effect(&audio, &setup, false) {
            Err(CliError::Rejected { status, .. }) => assert_eq!(status, -22),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_flat_processing_is_exact() {
        let samples: Vec<i16> = (0..3000).map(|i| ((i * 37) % 2000 - 1000) as i16).collect();
        let mut audio = AudioData {
            sample_rate: 44100,
            channels: 2,
            samples: samples.clone(),
        };
        let report = process_audio(&mut audio, &EqSetup::default(), 100, false).unwrap();
        assert_eq!(report.frames, 1500);
        assert_eq!(report.blocks, 15);
        assert_eq!(audio.samples, samples);
    }
}
