//! Equalizer effect instance and its control surface

use tracing::{debug, info, warn};
use uuid::Uuid;

use tonal_eq::{
    Equalizer, Track, BUILTIN_PRESETS, DEFAULT_BANDWIDTHS, DEFAULT_BAND_COUNT,
    DEFAULT_FREQUENCIES,
};

use crate::adapter::FormatAdapter;
use crate::command::EffectCommand;
use crate::config::{EffectConfig, EFFECT_CONFIG_SIZE};
use crate::descriptor::{EffectDescriptor, EQUALIZER_DESCRIPTOR};
use crate::error::{EffectError, Result, STATUS_NO_DATA};
use crate::param::{
    encode_block, BandProperties, EqParam, EqParamSet, ParamBlock, ParamValue,
    PARAM_HEADER_SIZE,
};

/// Sample rate the engine is built with before the first configuration
const INIT_SAMPLE_RATE: u32 = 44100;

/// Lifecycle of an effect instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectState {
    /// Released; every call fails
    Uninitialized,
    /// Configured but not processing
    Initialized,
    /// Processing
    Active,
}

/// Outcome of a process call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Processed,
    /// Effect is not enabled; buffers were left untouched
    NoData,
}

impl ProcessStatus {
    pub fn status(self) -> i32 {
        match self {
            Self::Processed => 0,
            Self::NoData => STATUS_NO_DATA,
        }
    }
}

/// A graphic equalizer effect driven by host commands
///
/// Every mutating call commits its changes immediately, so the next
/// process call hears the new settings without ramping.
#[derive(Debug)]
pub struct EqualizerEffect {
    state: EffectState,
    config: EffectConfig,
    equalizer: Equalizer,
    adapter: FormatAdapter,
}

impl EqualizerEffect {
    pub fn new() -> Result<Self> {
        let config = EffectConfig::default();
        let mut effect = Self {
            state: EffectState::Uninitialized,
            config,
            equalizer: default_equalizer()?,
            adapter: FormatAdapter::new(1, config.output.format, config.output.access)?,
        };
        effect.apply_defaults()?;
        effect.state = EffectState::Initialized;
        info!("Equalizer effect created");
        Ok(effect)
    }

    /// Create the implementation named by `uuid`
    pub fn create(uuid: &Uuid) -> Result<Self> {
        if !EQUALIZER_DESCRIPTOR.matches(uuid) {
            return Err(EffectError::invalid(format!("no effect with uuid {uuid}")));
        }
        Self::new()
    }

    pub fn descriptor(&self) -> &'static EffectDescriptor {
        &EQUALIZER_DESCRIPTOR
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn equalizer(&self) -> &Equalizer {
        &self.equalizer
    }

    /// Restore default bands and the default configuration
    pub fn init(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.apply_defaults()
    }

    pub fn set_config(&mut self, config: EffectConfig) -> Result<()> {
        self.ensure_initialized()?;
        self.apply_config(config)
    }

    /// Re-apply the stored configuration
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.apply_config(self.config)
    }

    pub fn enable(&mut self) -> Result<()> {
        match self.state {
            EffectState::Uninitialized => Err(EffectError::Uninitialized),
            EffectState::Active => Err(EffectError::NotSupported("effect already enabled".into())),
            EffectState::Initialized => {
                self.state = EffectState::Active;
                info!("Equalizer effect enabled");
                Ok(())
            }
        }
    }

    pub fn disable(&mut self) -> Result<()> {
        match self.state {
            EffectState::Uninitialized => Err(EffectError::Uninitialized),
            EffectState::Initialized => Err(EffectError::NotSupported("effect not enabled".into())),
            EffectState::Active => {
                self.state = EffectState::Initialized;
                info!("Equalizer effect disabled");
                Ok(())
            }
        }
    }

    pub fn release(&mut self) {
        self.state = EffectState::Uninitialized;
        info!("Equalizer effect released");
    }

    pub fn get_param(&self, param: &EqParam) -> Result<ParamValue> {
        self.ensure_initialized()?;
        let eq = &self.equalizer;
        Ok(match *param {
            EqParam::NumBands => ParamValue::U16(eq.num_bands() as u16),
            EqParam::CurrentPreset => ParamValue::I16(preset_code(eq.current_preset())),
            EqParam::NumPresets => ParamValue::U16(eq.num_presets() as u16),
            EqParam::BandLevel(band) => ParamValue::I16(level_i16(eq.gain(band)?)),
            EqParam::BandForFrequency(millihertz) => {
                ParamValue::U16(eq.most_relevant_band(millihertz) as u16)
            }
            EqParam::LevelRange => {
                let (lo, hi) = eq.level_range();
                ParamValue::I16Pair(level_i16(lo), level_i16(hi))
            }
            EqParam::BandFrequencyRange(band) => {
                let (lo, hi) = eq.band_range(band)?;
                ParamValue::U32Pair(lo, hi)
            }
            EqParam::CenterFrequency(band) => ParamValue::U32(eq.frequency(band)?),
            EqParam::PresetName(preset) => ParamValue::Name(eq.preset_name(preset)?),
            EqParam::Properties => {
                let mut values = vec![
                    preset_code(eq.current_preset()),
                    eq.num_bands() as i16,
                ];
                for band in 0..eq.num_bands() {
                    values.push(level_i16(eq.gain(band)?));
                }
                ParamValue::I16List(values)
            }
        })
    }

    pub fn set_param(&mut self, param: &EqParamSet) -> Result<()> {
        self.ensure_initialized()?;
        match param {
            EqParamSet::CurrentPreset(preset) => self.equalizer.set_preset(*preset)?,
            EqParamSet::BandLevel { band, millibel } => {
                self.equalizer.set_gain(*band, *millibel)?;
            }
            EqParamSet::Properties(props) => self.apply_properties(props)?,
        }
        self.equalizer.commit(true);
        Ok(())
    }

    /// Process `input` into `output` as track 0
    ///
    /// Buffers are checked before the state, so mismatched lengths are an
    /// invalid argument even while the effect is not enabled.
    pub fn process(&mut self, input: &[i16], output: &mut [i16]) -> Result<ProcessStatus> {
        self.adapter.check_lengths(input.len(), output.len())?;
        if self.check_active()? == ProcessStatus::NoData {
            return Ok(ProcessStatus::NoData);
        }
        self.adapter
            .process(&mut self.equalizer, input, output, Track::Left)?;
        Ok(ProcessStatus::Processed)
    }

    pub fn process_in_place(&mut self, buffer: &mut [i16], track: Track) -> Result<ProcessStatus> {
        self.adapter.check_lengths(buffer.len(), buffer.len())?;
        if self.check_active()? == ProcessStatus::NoData {
            return Ok(ProcessStatus::NoData);
        }
        self.adapter
            .process_in_place(&mut self.equalizer, buffer, track)?;
        Ok(ProcessStatus::Processed)
    }

    /// Dispatch a raw host command, returning the number of reply bytes written
    pub fn command(&mut self, code: u32, cmd: &[u8], reply: &mut [u8]) -> Result<usize> {
        self.ensure_initialized()?;
        let command = EffectCommand::from_code(code)?;
        debug!(?command, cmd_len = cmd.len(), "Effect command");

        match command {
            EffectCommand::Init => {
                let slot = status_slot(reply)?;
                let status = status_of(self.init());
                write_status(slot, status)
            }
            EffectCommand::SetConfig => {
                if cmd.len() != EFFECT_CONFIG_SIZE {
                    return Err(EffectError::invalid(format!(
                        "config payload of {} bytes",
                        cmd.len()
                    )));
                }
                let slot = status_slot(reply)?;
                let status =
                    status_of(EffectConfig::from_bytes(cmd).and_then(|c| self.set_config(c)));
                write_status(slot, status)
            }
            EffectCommand::GetConfig => {
                let slot = reply
                    .get_mut(..EFFECT_CONFIG_SIZE)
                    .ok_or_else(|| EffectError::invalid("reply too small for config"))?;
                slot.copy_from_slice(&self.config.to_bytes());
                Ok(EFFECT_CONFIG_SIZE)
            }
            EffectCommand::Reset => {
                self.reset()?;
                Ok(0)
            }
            EffectCommand::Enable => {
                let slot = status_slot(reply)?;
                self.enable()?;
                write_status(slot, 0)
            }
            EffectCommand::Disable => {
                let slot = status_slot(reply)?;
                self.disable()?;
                write_status(slot, 0)
            }
            EffectCommand::GetParam => self.get_param_command(cmd, reply),
            EffectCommand::SetParam => {
                let block = parse_request(cmd)?;
                let slot = status_slot(reply)?;
                let status = status_of(
                    block
                        .full_value()
                        .and_then(|value| EqParamSet::decode(block.param, value))
                        .and_then(|param| self.set_param(&param)),
                );
                write_status(slot, status)
            }
            EffectCommand::SetDevice | EffectCommand::SetVolume | EffectCommand::SetAudioMode => {
                Ok(0)
            }
        }
    }

    fn get_param_command(&self, cmd: &[u8], reply: &mut [u8]) -> Result<usize> {
        let block = parse_request(cmd)?;
        let result = EqParam::decode(block.param)
            .and_then(|param| self.get_param(&param))
            .and_then(|value| value.encode(block.vsize));
        let (status, value) = match result {
            Ok(value) => (0, value),
            Err(e) => {
                warn!("Parameter read rejected: {}", e);
                (e.status(), Vec::new())
            }
        };
        let encoded = encode_block(status, block.param, &value, value.len());
        let reply_len = reply.len();
        let slot = reply.get_mut(..encoded.len()).ok_or_else(|| {
            EffectError::invalid(format!(
                "reply of {reply_len} bytes, {} needed",
                encoded.len()
            ))
        })?;
        slot.copy_from_slice(&encoded);
        Ok(encoded.len())
    }

    fn apply_defaults(&mut self) -> Result<()> {
        let mut equalizer = default_equalizer()?;
        for band in 0..DEFAULT_BAND_COUNT {
            equalizer.set_gain(band, 0)?;
            equalizer.set_frequency(band, DEFAULT_FREQUENCIES[band])?;
            equalizer.set_bandwidth(band, DEFAULT_BANDWIDTHS[band])?;
        }
        equalizer.enable(true);
        self.equalizer = equalizer;
        self.apply_config(EffectConfig::default())
    }

    fn apply_config(&mut self, config: EffectConfig) -> Result<()> {
        let channels = config.validate().map_err(|e| {
            warn!("Configuration rejected: {}", e);
            e
        })?;
        self.equalizer
            .configure(channels, config.input.sample_rate)?;
        self.adapter
            .configure(channels, config.output.format, config.output.access)?;
        self.config = config;
        debug!(
            sample_rate = config.input.sample_rate,
            channels,
            access = ?config.output.access,
            "Equalizer effect configured"
        );
        Ok(())
    }

    fn apply_properties(&mut self, props: &BandProperties) -> Result<()> {
        if let Some(preset) = props.preset {
            return Ok(self.equalizer.set_preset(preset)?);
        }
        let bands = self.equalizer.num_bands();
        let fits = |len: usize| len == bands;
        if !fits(props.gains.len())
            || !props.frequencies.as_ref().map_or(true, |f| fits(f.len()))
            || !props.bandwidths.as_ref().map_or(true, |b| fits(b.len()))
        {
            return Err(EffectError::invalid(format!(
                "properties for {} bands, equalizer has {bands}",
                props.gains.len()
            )));
        }
        for (band, &gain) in props.gains.iter().enumerate() {
            self.equalizer.set_gain(band, gain)?;
        }
        if let Some(freqs) = &props.frequencies {
            for (band, &freq) in freqs.iter().enumerate() {
                self.equalizer.set_frequency(band, freq)?;
            }
        }
        if let Some(bws) = &props.bandwidths {
            for (band, &bw) in bws.iter().enumerate() {
                self.equalizer.set_bandwidth(band, bw)?;
            }
        }
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.state == EffectState::Uninitialized {
            return Err(EffectError::Uninitialized);
        }
        Ok(())
    }

    fn check_active(&self) -> Result<ProcessStatus> {
        match self.state {
            EffectState::Uninitialized => Err(EffectError::Uninitialized),
            EffectState::Initialized => Ok(ProcessStatus::NoData),
            EffectState::Active => Ok(ProcessStatus::Processed),
        }
    }
}

fn default_equalizer() -> Result<Equalizer> {
    Ok(Equalizer::new(
        DEFAULT_BAND_COUNT,
        1,
        INIT_SAMPLE_RATE,
        &BUILTIN_PRESETS,
    )?)
}

fn preset_code(preset: Option<usize>) -> i16 {
    preset.map_or(-1, |p| p as i16)
}

fn level_i16(millibel: i32) -> i16 {
    millibel.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn parse_request(cmd: &[u8]) -> Result<ParamBlock<'_>> {
    let block = ParamBlock::parse(cmd)?;
    if block.param.len() < 4 {
        return Err(EffectError::invalid(format!(
            "request of {} bytes carries no parameter id",
            cmd.len().saturating_sub(PARAM_HEADER_SIZE)
        )));
    }
    Ok(block)
}

fn status_slot(reply: &mut [u8]) -> Result<&mut [u8]> {
    reply
        .get_mut(..4)
        .ok_or_else(|| EffectError::invalid("reply too small for status"))
}

fn status_of(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            warn!("Effect request rejected: {}", e);
            e.status()
        }
    }
}

fn write_status(slot: &mut [u8], status: i32) -> Result<usize> {
    slot.copy_from_slice(&status.to_le_bytes());
    Ok(4)
}
