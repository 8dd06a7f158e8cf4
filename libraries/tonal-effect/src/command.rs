//! Host command codes

use crate::error::{EffectError, Result};

/// Commands accepted by [`EqualizerEffect::command`](crate::EqualizerEffect::command)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectCommand {
    Init,
    SetConfig,
    Reset,
    Enable,
    Disable,
    SetParam,
    GetParam,
    SetDevice,
    SetVolume,
    SetAudioMode,
    GetConfig,
}

impl EffectCommand {
    pub const ALL: [Self; 11] = [
        Self::Init,
        Self::SetConfig,
        Self::Reset,
        Self::Enable,
        Self::Disable,
        Self::SetParam,
        Self::GetParam,
        Self::SetDevice,
        Self::SetVolume,
        Self::SetAudioMode,
        Self::GetConfig,
    ];

    pub fn code(self) -> u32 {
        match self {
            Self::Init => 0,
            Self::SetConfig => 1,
            Self::Reset => 2,
            Self::Enable => 3,
            Self::Disable => 4,
            Self::SetParam => 5,
            Self::GetParam => 8,
            Self::SetDevice => 9,
            Self::SetVolume => 10,
            Self::SetAudioMode => 11,
            Self::GetConfig => 14,
        }
    }

    pub fn from_code(code: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| EffectError::invalid(format!("unknown command {code}")))
    }
}
