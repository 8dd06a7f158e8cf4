//! 16-bit PCM containers: raw little-endian and WAV

use crate::error::{CliError, Result};
use std::fs;
use std::path::Path;

/// Interleaved 16-bit audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioData {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioData {
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }
}

/// Container of an audio file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Raw,
    Wav,
}

impl Container {
    /// WAV when the extension says so
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("wav") => Self::Wav,
            _ => Self::Raw,
        }
    }
}

/// Read raw interleaved samples; the format is not stored in the file
pub fn read_raw(path: &Path, sample_rate: u32, channels: u16) -> Result<AudioData> {
    if channels == 0 {
        return Err(CliError::InvalidArgument("channel count of zero".to_string()));
    }
    let bytes = fs::read(path)?;
    if bytes.len() % 2 != 0 {
        return Err(CliError::UnsupportedAudio(format!(
            "{} has an odd byte count",
            path.display()
        )));
    }
    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();
    if samples.len() % usize::from(channels) != 0 {
        return Err(CliError::UnsupportedAudio(format!(
            "{} samples do not divide into {channels} channels",
            samples.len()
        )));
    }
    Ok(AudioData {
        sample_rate,
        channels,
        samples,
    })
}

pub fn write_raw(path: &Path, audio: &AudioData) -> Result<()> {
    let bytes: Vec<u8> = audio.samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    fs::write(path, bytes)?;
    Ok(())
}

/// Read a 16-bit integer WAV file
pub fn read_wav(path: &Path) -> Result<AudioData> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(CliError::UnsupportedAudio(format!(
            "{} is {}-bit {:?}, only 16-bit integer PCM is supported",
            path.display(),
            spec.bits_per_sample,
            spec.sample_format
        )));
    }
    let samples = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(AudioData {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        samples,
    })
}

pub fn write_wav(path: &Path, audio: &AudioData) -> Result<()> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &audio.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_from_extension() {
        assert_eq!(Container::from_path(Path::new("a/b.WAV")), Container::Wav);
        assert_eq!(Container::from_path(Path::new("a/b.pcm")), Container::Raw);
        assert_eq!(Container::from_path(Path::new("noext")), Container::Raw);
    }

    #[test]
    fn test_frames() {
        let audio = AudioData {
            sample_rate: 8000,
            channels: 2,
            samples: vec![0; 10],
        };
        assert_eq!(audio.frames(), 5);
    }
}
