/// Tonal - fixed-point equalizer driver
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tonal_cli::{
    config::CliConfig,
    pcm::{self, AudioData, Container},
    pipeline::{self, EqSetup},
};
use tonal_eq::BUILTIN_PRESETS;
use tonal_effect::{EqParam, EqualizerEffect, ParamValue};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tonal-cli")]
#[command(about = "Fixed-point parametric equalizer", long_about = None)]
struct Cli {
    /// Configuration file path (default: tonal.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Equalize a raw PCM or WAV file
    Process {
        /// Input file (16-bit little-endian PCM, or WAV)
        #[arg(short, long)]
        input: PathBuf,
        /// Output file, written in the input's container
        #[arg(short, long)]
        output: PathBuf,
        /// Treat both files as WAV regardless of extension
        #[arg(long)]
        wav: bool,
        /// Preset name or index
        #[arg(short, long)]
        preset: Option<String>,
        /// Band level as BAND=MILLIBELS, repeatable
        #[arg(short, long = "gain")]
        gains: Vec<String>,
        /// Sample rate of raw input
        #[arg(long)]
        sample_rate: Option<u32>,
        /// Channel count of raw input
        #[arg(long)]
        channels: Option<u16>,
        /// Frames per process call
        #[arg(long)]
        block: Option<usize>,
        /// Mix the equalized signal onto the dry input
        #[arg(long)]
        accumulate: bool,
    },
    /// List the builtin presets
    Presets,
    /// Print band centre frequencies and ranges
    Bands {
        /// Sample rate to lay the bands out for
        #[arg(long)]
        sample_rate: Option<u32>,
    },
    /// Print the effective configuration as TOML
    ShowConfig,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tonal_cli=info,tonal_effect=warn,tonal_eq=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Process {
            input,
            output,
            wav,
            preset,
            gains,
            sample_rate,
            channels,
            block,
            accumulate,
        } => {
            if let Some(rate) = sample_rate {
                config.audio.sample_rate = rate;
            }
            if let Some(channels) = channels {
                config.audio.channels = channels;
            }
            if let Some(block) = block {
                config.audio.block_frames = block;
            }
            if preset.is_some() {
                config.eq.preset = preset;
            }
            config.audio.accumulate |= accumulate;
            config.validate()?;

            let mut setup = EqSetup::from_config(&config)?;
            for gain in &gains {
                setup.levels.push(pipeline::parse_level(gain)?);
            }
            let container = if wav {
                Container::Wav
            } else {
                Container::from_path(&input)
            };
            process_file(&input, &output, container, &config, &setup)?;
        }
        Commands::Presets => list_presets(),
        Commands::Bands { sample_rate } => {
            if let Some(rate) = sample_rate {
                config.audio.sample_rate = rate;
            }
            config.validate()?;
            print_bands(&config)?;
        }
        Commands::ShowConfig => {
            config.validate()?;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn process_file(
    input: &Path,
    output: &Path,
    container: Container,
    config: &CliConfig,
    setup: &EqSetup,
) -> anyhow::Result<()> {
    let mut audio = match container {
        Container::Wav => pcm::read_wav(input),
        Container::Raw => pcm::read_raw(input, config.audio.sample_rate, config.audio.channels),
    }
    .with_context(|| format!("Failed to read {}", input.display()))?;

    tracing::info!(
        "Processing {} ({} Hz, {} ch, {} frames)",
        input.display(),
        audio.sample_rate,
        audio.channels,
        audio.frames()
    );

    let report = pipeline::process_audio(
        &mut audio,
        setup,
        config.audio.block_frames,
        config.audio.accumulate,
    )
    .context("Equalizer rejected the stream")?;

    write_output(output, container, &audio)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} frames in {} blocks, peak {} -> {}",
        report.frames, report.blocks, report.peak_in, report.peak_out
    );
    Ok(())
}

fn write_output(path: &Path, container: Container, audio: &AudioData) -> tonal_cli::Result<()> {
    match container {
        Container::Wav => pcm::write_wav(path, audio),
        Container::Raw => pcm::write_raw(path, audio),
    }
}

fn list_presets() {
    for (index, preset) in BUILTIN_PRESETS.iter().enumerate() {
        let gains: Vec<String> = preset
            .bands
            .iter()
            .map(|band| format!("{:+}", band.gain_mb))
            .collect();
        println!("{index}: {:<8} {} mB", preset.name, gains.join(" "));
    }
}

fn print_bands(config: &CliConfig) -> anyhow::Result<()> {
    let mut effect = EqualizerEffect::new()?;
    effect.set_config(pipeline::effect_config(
        config.audio.sample_rate,
        config.audio.channels,
        false,
    )?)?;

    let ParamValue::U16(count) = effect.get_param(&EqParam::NumBands)? else {
        anyhow::bail!("Unexpected band count reply");
    };
    for band in 0..usize::from(count) {
        let center = effect.get_param(&EqParam::CenterFrequency(band))?;
        let range = effect.get_param(&EqParam::BandFrequencyRange(band))?;
        if let (ParamValue::U32(center), ParamValue::U32Pair(lo, hi)) = (center, range) {
            println!(
                "band {band}: centre {:>9.1} Hz, range {:>9.1} - {:>9.1} Hz",
                f64::from(center) / 1000.0,
                f64::from(lo) / 1000.0,
                f64::from(hi) / 1000.0
            );
        }
    }
    Ok(())
}
