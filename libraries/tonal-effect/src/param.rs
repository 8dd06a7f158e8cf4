//! Equalizer parameters and the parameter block wire format
//!
//! A parameter block is laid out little endian as:
//!
//! ```text
//! i32 status | u32 psize | u32 vsize | param[psize] | pad to 4 | value[vsize]
//! ```
//!
//! The param part is a sequence of i32 words: the parameter id, then an
//! argument for the per-band and per-preset parameters.

use crate::error::{EffectError, Result};

/// Size of the status / psize / vsize header
pub const PARAM_HEADER_SIZE: usize = 12;

/// Parameter identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamId {
    NumBands,
    CurrentPreset,
    NumPresets,
    BandLevel,
    GetBand,
    LevelRange,
    BandFreqRange,
    CenterFreq,
    PresetName,
    Properties,
}

impl ParamId {
    pub fn code(self) -> i32 {
        match self {
            Self::NumBands => 0,
            Self::CurrentPreset => 1,
            Self::NumPresets => 2,
            Self::BandLevel => 3,
            Self::GetBand => 4,
            Self::LevelRange => 5,
            Self::BandFreqRange => 6,
            Self::CenterFreq => 7,
            Self::PresetName => 8,
            Self::Properties => 9,
        }
    }

    pub fn from_code(code: i32) -> Result<Self> {
        Ok(match code {
            0 => Self::NumBands,
            1 => Self::CurrentPreset,
            2 => Self::NumPresets,
            3 => Self::BandLevel,
            4 => Self::GetBand,
            5 => Self::LevelRange,
            6 => Self::BandFreqRange,
            7 => Self::CenterFreq,
            8 => Self::PresetName,
            9 => Self::Properties,
            _ => return Err(EffectError::invalid(format!("unknown parameter {code}"))),
        })
    }
}

/// A parameter read request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqParam {
    NumBands,
    CurrentPreset,
    NumPresets,
    /// Gain of a band in millibels
    BandLevel(usize),
    /// Band that best covers a frequency in millihertz
    BandForFrequency(u32),
    LevelRange,
    BandFrequencyRange(usize),
    CenterFrequency(usize),
    /// Preset name, `None` for the custom setting
    PresetName(Option<usize>),
    Properties,
}

impl EqParam {
    pub fn id(&self) -> ParamId {
        match self {
            Self::NumBands => ParamId::NumBands,
            Self::CurrentPreset => ParamId::CurrentPreset,
            Self::NumPresets => ParamId::NumPresets,
            Self::BandLevel(_) => ParamId::BandLevel,
            Self::BandForFrequency(_) => ParamId::GetBand,
            Self::LevelRange => ParamId::LevelRange,
            Self::BandFrequencyRange(_) => ParamId::BandFreqRange,
            Self::CenterFrequency(_) => ParamId::CenterFreq,
            Self::PresetName(_) => ParamId::PresetName,
            Self::Properties => ParamId::Properties,
        }
    }

    /// Decode the param words of a read request
    pub fn decode(param: &[u8]) -> Result<Self> {
        let id = ParamId::from_code(word(param, 0)?)?;
        Ok(match id {
            ParamId::NumBands => Self::NumBands,
            ParamId::CurrentPreset => Self::CurrentPreset,
            ParamId::NumPresets => Self::NumPresets,
            ParamId::BandLevel => Self::BandLevel(index(word(param, 1)?)?),
            ParamId::GetBand => Self::BandForFrequency(word(param, 1)? as u32),
            ParamId::LevelRange => Self::LevelRange,
            ParamId::BandFreqRange => Self::BandFrequencyRange(index(word(param, 1)?)?),
            ParamId::CenterFreq => Self::CenterFrequency(index(word(param, 1)?)?),
            ParamId::PresetName => Self::PresetName(preset_index(word(param, 1)?)?),
            ParamId::Properties => Self::Properties,
        })
    }

    /// Encode as param words
    pub fn encode(&self) -> Vec<u8> {
        let arg = match *self {
            Self::BandLevel(band) | Self::BandFrequencyRange(band) | Self::CenterFrequency(band) => {
                Some(band as i32)
            }
            Self::BandForFrequency(millihertz) => Some(millihertz as i32),
            Self::PresetName(preset) => Some(preset.map_or(-1, |p| p as i32)),
            _ => None,
        };
        words(std::iter::once(self.id().code()).chain(arg))
    }
}

/// Value returned by a parameter read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    U16(u16),
    I16(i16),
    I16Pair(i16, i16),
    U32(u32),
    U32Pair(u32, u32),
    /// NUL-terminated on the wire
    Name(&'static str),
    I16List(Vec<i16>),
}

impl ParamValue {
    /// Encode into at most `capacity` bytes
    ///
    /// Fixed-size values fail when they do not fit. Names are truncated
    /// to `capacity - 1` bytes and always NUL-terminated.
    pub fn encode(&self, capacity: usize) -> Result<Vec<u8>> {
        let bytes = match self {
            Self::U16(v) => v.to_le_bytes().to_vec(),
            Self::I16(v) => v.to_le_bytes().to_vec(),
            Self::I16Pair(a, b) => [a.to_le_bytes(), b.to_le_bytes()].concat(),
            Self::U32(v) => v.to_le_bytes().to_vec(),
            Self::U32Pair(a, b) => [a.to_le_bytes(), b.to_le_bytes()].concat(),
            Self::I16List(list) => list.iter().flat_map(|v| v.to_le_bytes()).collect(),
            Self::Name(name) => {
                if capacity == 0 {
                    return Err(EffectError::invalid("no room for preset name"));
                }
                let len = name.len().min(capacity - 1);
                let mut bytes = name.as_bytes()[..len].to_vec();
                bytes.push(0);
                return Ok(bytes);
            }
        };
        if bytes.len() > capacity {
            return Err(EffectError::invalid(format!(
                "value needs {} bytes, {capacity} available",
                bytes.len()
            )));
        }
        Ok(bytes)
    }
}

/// Band settings carried by a properties write
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BandProperties {
    /// Preset to apply, `None` to apply the explicit values below
    pub preset: Option<usize>,
    pub gains: Vec<i32>,
    pub frequencies: Option<Vec<u32>>,
    pub bandwidths: Option<Vec<u32>>,
}

/// A parameter write request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EqParamSet {
    CurrentPreset(usize),
    BandLevel { band: usize, millibel: i32 },
    Properties(BandProperties),
}

impl EqParamSet {
    /// Decode the param and value parts of a write request
    pub fn decode(param: &[u8], value: &[u8]) -> Result<Self> {
        match ParamId::from_code(word(param, 0)?)? {
            ParamId::CurrentPreset => {
                let preset = word(value, 0)?;
                let preset = usize::try_from(preset)
                    .map_err(|_| EffectError::invalid(format!("invalid preset {preset}")))?;
                Ok(Self::CurrentPreset(preset))
            }
            ParamId::BandLevel => Ok(Self::BandLevel {
                band: index(word(param, 1)?)?,
                millibel: word(value, 0)?,
            }),
            ParamId::Properties => decode_properties(value).map(Self::Properties),
            id => Err(EffectError::invalid(format!("parameter {id:?} is read-only"))),
        }
    }

    /// Encode as (param, value) parts
    pub fn encode(&self) -> (Vec<u8>, Vec<u8>) {
        match self {
            Self::CurrentPreset(preset) => (
                words([ParamId::CurrentPreset.code()]),
                words([*preset as i32]),
            ),
            Self::BandLevel { band, millibel } => (
                words([ParamId::BandLevel.code(), *band as i32]),
                words([*millibel]),
            ),
            Self::Properties(props) => {
                let count = props.gains.len() as i32;
                let mut values = vec![props.preset.map_or(-1, |p| p as i32), count];
                values.extend(props.gains.iter().copied());
                if let Some(freqs) = &props.frequencies {
                    values.extend(freqs.iter().map(|&f| f as i32));
                    if let Some(bws) = &props.bandwidths {
                        values.extend(bws.iter().map(|&b| b as i32));
                    }
                }
                (words([ParamId::Properties.code()]), words(values))
            }
        }
    }
}

fn decode_properties(value: &[u8]) -> Result<BandProperties> {
    if value.len() % 4 != 0 || value.len() < 8 {
        return Err(EffectError::invalid(format!(
            "properties value of {} bytes",
            value.len()
        )));
    }
    let values: Vec<i32> = value
        .chunks_exact(4)
        .map(|w| i32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .collect();

    match values[0] {
        -1 => {}
        preset => {
            return preset_index(preset)?
                .map(|p| BandProperties {
                    preset: Some(p),
                    ..BandProperties::default()
                })
                .ok_or_else(|| EffectError::invalid(format!("invalid preset {preset}")));
        }
    }

    let count = usize::try_from(values[1])
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| EffectError::invalid(format!("invalid band count {}", values[1])))?;
    let rest = &values[2..];
    let groups = rest.len() / count;
    if rest.len() % count != 0 || !(1..=3).contains(&groups) {
        return Err(EffectError::invalid(format!(
            "{} values do not describe {count} bands",
            rest.len()
        )));
    }
    let group = |g: usize| rest[g * count..(g + 1) * count].to_vec();
    let unsigned = |g: usize| group(g).into_iter().map(|v| v as u32).collect::<Vec<_>>();
    Ok(BandProperties {
        preset: None,
        gains: group(0),
        frequencies: (groups >= 2).then(|| unsigned(1)),
        bandwidths: (groups == 3).then(|| unsigned(2)),
    })
}

/// A parsed parameter block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamBlock<'a> {
    pub status: i32,
    pub param: &'a [u8],
    /// Declared value size
    pub vsize: usize,
    /// Value bytes present in the block, at most `vsize`
    pub value: &'a [u8],
}

impl<'a> ParamBlock<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < PARAM_HEADER_SIZE {
            return Err(EffectError::invalid(format!(
                "parameter block of {} bytes",
                bytes.len()
            )));
        }
        let status = word(bytes, 0)?;
        let psize = word(bytes, 1)? as u32 as usize;
        let vsize = word(bytes, 2)? as u32 as usize;
        let param = bytes
            .get(PARAM_HEADER_SIZE..PARAM_HEADER_SIZE.saturating_add(psize))
            .ok_or_else(|| EffectError::invalid(format!("param of {psize} bytes overruns block")))?;
        let value = bytes
            .get(value_offset(psize)..)
            .map_or(&[][..], |rest| &rest[..rest.len().min(vsize)]);
        Ok(Self {
            status,
            param,
            vsize,
            value,
        })
    }

    /// Value bytes, failing unless all `vsize` bytes are present
    pub fn full_value(&self) -> Result<&'a [u8]> {
        if self.value.len() == self.vsize {
            Ok(self.value)
        } else {
            Err(EffectError::invalid(format!(
                "value of {} bytes declared, {} present",
                self.vsize,
                self.value.len()
            )))
        }
    }
}

/// Offset of the value part for a given param size
pub fn value_offset(psize: usize) -> usize {
    PARAM_HEADER_SIZE + psize.saturating_add(3) / 4 * 4
}

/// Build a parameter block
pub fn encode_block(status: i32, param: &[u8], value: &[u8], vsize: usize) -> Vec<u8> {
    let offset = value_offset(param.len());
    let mut out = Vec::with_capacity(offset + value.len());
    out.extend_from_slice(&status.to_le_bytes());
    out.extend_from_slice(&(param.len() as u32).to_le_bytes());
    out.extend_from_slice(&(vsize as u32).to_le_bytes());
    out.extend_from_slice(param);
    out.resize(offset, 0);
    out.extend_from_slice(value);
    out
}

/// Read request asking for up to `capacity` value bytes
pub fn encode_get_request(param: &EqParam, capacity: usize) -> Vec<u8> {
    encode_block(0, &param.encode(), &[], capacity)
}

/// Write request
pub fn encode_set_request(param: &EqParamSet) -> Vec<u8> {
    let (param, value) = param.encode();
    encode_block(0, &param, &value, value.len())
}

fn word(bytes: &[u8], at: usize) -> Result<i32> {
    bytes
        .get(at * 4..at * 4 + 4)
        .map(|w| i32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .ok_or_else(|| EffectError::invalid(format!("missing word {at} in {} bytes", bytes.len())))
}

fn words(values: impl IntoIterator<Item = i32>) -> Vec<u8> {
    values.into_iter().flat_map(i32::to_le_bytes).collect()
}

fn index(value: i32) -> Result<usize> {
    usize::try_from(value).map_err(|_| EffectError::invalid(format!("invalid band {value}")))
}

fn preset_index(value: i32) -> Result<Option<usize>> {
    match value {
        -1 => Ok(None),
        v => usize::try_from(v)
            .map(Some)
            .map_err(|_| EffectError::invalid(format!("invalid preset {v}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_ids() {
        for code in 0..10 {
            assert_eq!(ParamId::from_code(code).unwrap().code(), code);
        }
        assert!(ParamId::from_code(10).is_err());
        assert!(ParamId::from_code(-1).is_err());
    }

    #[test]
    fn test_decode_requires_argument() {
        assert!(EqParam::decode(&words([3])).is_err());
        assert_eq!(
            EqParam::decode(&words([3, 2])).unwrap(),
            EqParam::BandLevel(2)
        );
        assert!(EqParam::decode(&words([3, -2])).is_err());
        assert_eq!(
            EqParam::decode(&words([8, -1])).unwrap(),
            EqParam::PresetName(None)
        );
        assert_eq!(EqParam::decode(&words([0])).unwrap(), EqParam::NumBands);
    }

    #[test]
    fn test_name_truncation() {
        let name = ParamValue::Name("Classic");
        assert_eq!(name.encode(64).unwrap(), b"Classic\0");
        assert_eq!(name.encode(4).unwrap(), b"Cla\0");
        assert_eq!(name.encode(1).unwrap(), b"\0");
        assert!(name.encode(0).is_err());
    }

    #[test]
    fn test_fixed_value_capacity() {
        assert!(ParamValue::U32Pair(1, 2).encode(7).is_err());
        assert_eq!(ParamValue::U32Pair(1, 2).encode(8).unwrap().len(), 8);
        assert_eq!(
            ParamValue::I16List(vec![-1, 5, 300]).encode(16).unwrap(),
            vec![0xFF, 0xFF, 5, 0, 0x2C, 0x01]
        );
    }

    #[test]
    fn test_block_layout_pads_param() {
        let block = encode_block(-22, &[1, 2, 3, 4, 5, 6], &[9, 9], 2);
        assert_eq!(block.len(), 12 + 8 + 2);
        assert_eq!(&block[18..20], &[0, 0]);

        let parsed = ParamBlock::parse(&block).unwrap();
        assert_eq!(parsed.status, -22);
        assert_eq!(parsed.param, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(parsed.vsize, 2);
        assert_eq!(parsed.value, &[9, 9]);
    }

    #[test]
    fn test_parse_rejects_short_blocks() {
        assert!(ParamBlock::parse(&[0; 11]).is_err());
        let mut block = encode_block(0, &words([0]), &[], 2);
        block.truncate(14);
        assert!(ParamBlock::parse(&block).is_err());
    }

    #[test]
    fn test_properties_groups() {
        let explicit = |values: Vec<i32>| decode_properties(&words(values));

        let gains = explicit(vec![-1, 2, 100, -100]).unwrap();
        assert_eq!(gains.gains, vec![100, -100]);
        assert!(gains.frequencies.is_none());

        let full = explicit(vec![-1, 2, 1, 2, 3000, 4000, 50, 60]).unwrap();
        assert_eq!(full.frequencies, Some(vec![3000, 4000]));
        assert_eq!(full.bandwidths, Some(vec![50, 60]));

        assert!(explicit(vec![-1, 2, 1]).is_err());
        assert!(explicit(vec![-1, 0]).is_err());
        assert!(explicit(vec![-1, 1, 1, 2, 3, 4]).is_err());
        assert!(explicit(vec![-2, 1, 0]).is_err());

        let preset = explicit(vec![3, 5]).unwrap();
        assert_eq!(preset.preset, Some(3));
        assert!(preset.gains.is_empty());
    }

    #[test]
    fn test_set_request_decodes() {
        let request = EqParamSet::BandLevel {
            band: 4,
            millibel: -700,
        };
        let block = encode_set_request(&request);
        let parsed = ParamBlock::parse(&block).unwrap();
        assert_eq!(
            EqParamSet::decode(parsed.param, parsed.full_value().unwrap()).unwrap(),
            request
        );
        assert!(EqParamSet::decode(&words([0]), &words([1])).is_err());
    }
}
