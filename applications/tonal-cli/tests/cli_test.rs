//! Driver round trips through real files
//!
//! Uses tempfile for scratch directories and the built binary for the
//! end-to-end cases.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use tonal_cli::{
    config::CliConfig,
    pcm::{self, AudioData},
    pipeline::{self, EqSetup},
};

// ============================================================================
// TEST UTILITIES
// ============================================================================

fn tone(sample_rate: u32, channels: u16, frames: usize, freq: f64, amplitude: f64) -> AudioData {
    let mut samples = Vec::with_capacity(frames * usize::from(channels));
    for i in 0..frames {
        let t = i as f64 / f64::from(sample_rate);
        let value = ((2.0 * std::f64::consts::PI * freq * t).sin() * amplitude) as i16;
        for _ in 0..channels {
            samples.push(value);
        }
    }
    AudioData {
        sample_rate,
        channels,
        samples,
    }
}

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tonal-cli"))
}

fn write_config(dir: &Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("tonal.toml");
    std::fs::write(&path, text).unwrap();
    path
}

// ============================================================================
// 1. FILE FORMATS
// ============================================================================

#[test]
fn raw_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.pcm");
    let audio = tone(48000, 2, 500, 440.0, 9000.0);
    pcm::write_raw(&path, &audio).unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 2000);
    assert_eq!(pcm::read_raw(&path, 48000, 2).unwrap(), audio);
}

#[test]
fn raw_rejects_partial_frames() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("odd.pcm");
    std::fs::write(&path, [0u8; 5]).unwrap();
    assert!(pcm::read_raw(&path, 48000, 1).is_err());
    std::fs::write(&path, [0u8; 6]).unwrap();
    assert!(pcm::read_raw(&path, 48000, 2).is_err());
    assert_eq!(pcm::read_raw(&path, 48000, 1).unwrap().samples.len(), 3);
}

#[test]
fn wav_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");
    let audio = tone(44100, 1, 1000, 1000.0, 12000.0);
    pcm::write_wav(&path, &audio).unwrap();
    assert_eq!(pcm::read_wav(&path).unwrap(), audio);
}

#[test]
fn wav_rejects_float() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("float.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    writer.write_sample(0.5f32).unwrap();
    writer.finalize().unwrap();
    assert!(pcm::read_wav(&path).is_err());
}

// ============================================================================
// 2. CONFIGURATION FILES
// ============================================================================

#[test]
fn config_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        "[audio]\nsample_rate = 22050\nchannels = 1\n\n[eq]\npreset = \"jazz\"\nlevels = [100, 200]\n",
    );
    let config = CliConfig::load(Some(path.as_path())).unwrap();
    config.validate().unwrap();
    assert_eq!(config.audio.sample_rate, 22050);
    assert_eq!(config.audio.block_frames, 256);

    let setup = EqSetup::from_config(&config).unwrap();
    assert_eq!(setup.preset, Some(2));
    assert_eq!(setup.levels, vec![(0, 100), (1, 200)]);
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    assert!(CliConfig::load(Some(dir.path().join("nope.toml").as_path())).is_err());
}

// ============================================================================
// 3. PROCESSING
// ============================================================================

#[test]
fn preset_boosts_bass_tone() {
    let mut audio = tone(48000, 2, 9600, 40.0, 6000.0);
    let setup = EqSetup {
        preset: Some(4),
        levels: vec![],
    };
    let report = pipeline::process_audio(&mut audio, &setup, 480, false).unwrap();
    assert_eq!(report.blocks, 20);
    assert!(report.peak_out > report.peak_in);
}

#[test]
fn accumulate_mixes_with_dry_signal() {
    let original = tone(48000, 1, 2000, 1000.0, 5000.0);
    let mut audio = original.clone();
    pipeline::process_audio(&mut audio, &EqSetup::default(), 256, true).unwrap();
    for (out, dry) in audio.samples.iter().zip(&original.samples) {
        assert_eq!(i32::from(*out), 2 * i32::from(*dry));
    }
}

// ============================================================================
// 4. BINARY
// ============================================================================

#[test]
fn binary_processes_wav_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    pcm::write_wav(&input, &tone(44100, 2, 4410, 60.0, 4000.0)).unwrap();

    let status = binary()
        .current_dir(dir.path())
        .args(["process", "--preset", "rock", "--gain", "2=-300", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let processed = pcm::read_wav(&output).unwrap();
    assert_eq!(processed.sample_rate, 44100);
    assert_eq!(processed.channels, 2);
    assert_eq!(processed.frames(), 4410);
}

#[test]
fn binary_flat_raw_is_unchanged() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.pcm");
    let output = dir.path().join("out.pcm");
    let audio = tone(16000, 1, 1600, 300.0, 20000.0);
    pcm::write_raw(&input, &audio).unwrap();

    let status = binary()
        .current_dir(dir.path())
        .args(["process", "--sample-rate", "16000", "--channels", "1", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&input).unwrap());
}

#[test]
fn binary_rejects_unknown_preset() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.pcm");
    pcm::write_raw(&input, &tone(48000, 2, 10, 100.0, 100.0)).unwrap();
    let status = binary()
        .current_dir(dir.path())
        .args(["process", "--preset", "metal", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out.pcm"))
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn binary_lists_presets() {
    let dir = TempDir::new().unwrap();
    let output = binary().current_dir(dir.path()).arg("presets").output().unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert_eq!(text.lines().count(), 5);
    assert!(text.contains("Rock"));
}
