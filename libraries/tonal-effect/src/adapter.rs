//! 16-bit PCM adapter around the equalizer
//!
//! The host exchanges interleaved 16-bit samples; the equalizer runs on
//! Q24 samples. The adapter converts through a fixed internal buffer so the
//! processing path never allocates.

use tonal_eq::fixed::{s16_to_sample, sample_to_s16_clip};
use tonal_eq::{Equalizer, Sample, Track};

use crate::config::{AccessMode, PcmFormat};
use crate::error::{EffectError, Result};

/// Size of the intermediate buffer in samples
pub const ADAPTER_BUFFER_SAMPLES: usize = 4096;

/// Converts host buffers to and from the equalizer's sample format
#[derive(Debug, Clone)]
pub struct FormatAdapter {
    num_channels: usize,
    format: PcmFormat,
    access: AccessMode,
    buffer: Vec<Sample>,
}

impl FormatAdapter {
    pub fn new(num_channels: usize, format: PcmFormat, access: AccessMode) -> Result<Self> {
        let mut adapter = Self {
            num_channels: 1,
            format: PcmFormat::Pcm16,
            access: AccessMode::Write,
            buffer: vec![0; ADAPTER_BUFFER_SAMPLES],
        };
        adapter.configure(num_channels, format, access)?;
        Ok(adapter)
    }

    /// Change the stream layout; rejected settings leave the adapter as it was
    pub fn configure(
        &mut self,
        num_channels: usize,
        format: PcmFormat,
        access: AccessMode,
    ) -> Result<()> {
        if !(1..=2).contains(&num_channels) {
            return Err(EffectError::invalid(format!(
                "adapter supports 1 or 2 channels, got {num_channels}"
            )));
        }
        if format != PcmFormat::Pcm16 {
            return Err(EffectError::invalid(format!(
                "adapter only converts 16-bit PCM, got {format:?}"
            )));
        }
        if access == AccessMode::Read {
            return Err(EffectError::invalid("output buffer cannot be read-only"));
        }
        self.num_channels = num_channels;
        self.format = format;
        self.access = access;
        Ok(())
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    pub fn access(&self) -> AccessMode {
        self.access
    }

    /// Frames converted per pass through the internal buffer
    pub fn max_frames_per_chunk(&self) -> usize {
        ADAPTER_BUFFER_SAMPLES / self.num_channels
    }

    /// Run `eq` over `input`, writing or accumulating into `output`
    ///
    /// Both buffers must hold the same whole number of frames.
    pub fn process(
        &mut self,
        eq: &mut Equalizer,
        input: &[i16],
        output: &mut [i16],
        track: Track,
    ) -> Result<()> {
        self.check_lengths(input.len(), output.len())?;
        let chunk = self.max_frames_per_chunk() * self.num_channels;
        for (src, dst) in input.chunks(chunk).zip(output.chunks_mut(chunk)) {
            self.run_chunk(eq, src, track);
            self.store(dst);
        }
        Ok(())
    }

    /// Same as [`process`](Self::process) with one buffer as input and output
    pub fn process_in_place(
        &mut self,
        eq: &mut Equalizer,
        buffer: &mut [i16],
        track: Track,
    ) -> Result<()> {
        self.check_lengths(buffer.len(), buffer.len())?;
        let chunk = self.max_frames_per_chunk() * self.num_channels;
        for block in buffer.chunks_mut(chunk) {
            self.run_chunk(eq, block, track);
            self.store(block);
        }
        Ok(())
    }

    /// Fail unless both buffers hold the same whole number of frames
    pub(crate) fn check_lengths(&self, input: usize, output: usize) -> Result<()> {
        if input != output {
            return Err(EffectError::invalid(format!(
                "input has {input} samples, output has {output}"
            )));
        }
        if input % self.num_channels != 0 {
            return Err(EffectError::invalid(format!(
                "{input} samples is not a whole number of {}-channel frames",
                self.num_channels
            )));
        }
        Ok(())
    }

    fn run_chunk(&mut self, eq: &mut Equalizer, src: &[i16], track: Track) {
        let work = &mut self.buffer[..src.len()];
        for (w, &s) in work.iter_mut().zip(src) {
            *w = s16_to_sample(s);
        }
        eq.process_in_place(work, track);
    }

    fn store(&self, dst: &mut [i16]) {
        let processed = self.buffer[..dst.len()].iter().map(|&s| sample_to_s16_clip(s));
        match self.access {
            AccessMode::Accumulate => {
                for (d, p) in dst.iter_mut().zip(processed) {
                    *d = d.saturating_add(p);
                }
            }
            AccessMode::Write | AccessMode::Read => {
                for (d, p) in dst.iter_mut().zip(processed) {
                    *d = p;
                }
            }
        }
    }
}
