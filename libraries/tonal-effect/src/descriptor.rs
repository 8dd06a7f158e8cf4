//! Effect identity advertised to the host

use serde::Serialize;
use uuid::Uuid;

/// Effect type shared by every equalizer implementation
pub const EQUALIZER_TYPE_UUID: Uuid = Uuid::from_u128(0x0bed_4300_ddd6_11db_8f34_0002_a5d5_c51b);

/// This implementation
pub const EQUALIZER_UUID: Uuid = Uuid::from_u128(0xe25a_a840_543b_11df_98a5_0002_a5d5_c51b);

/// Control API version, major in the high half
pub const EFFECT_API_VERSION: u32 = 2 << 16;

/// Insert effect
pub const FLAG_TYPE_INSERT: u32 = 0;

/// Placed last in an insert chain
pub const FLAG_INSERT_LAST: u32 = 2 << 3;

/// Static description of an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectDescriptor {
    pub type_uuid: Uuid,
    pub uuid: Uuid,
    pub api_version: u32,
    pub flags: u32,
    /// CPU load in tenths of MIPS
    pub cpu_load: u16,
    /// Memory usage in KB
    pub memory_usage: u16,
    pub name: &'static str,
    pub implementor: &'static str,
}

impl EffectDescriptor {
    /// Whether `uuid` names this implementation
    pub fn matches(&self, uuid: &Uuid) -> bool {
        self.uuid == *uuid
    }
}

pub const EQUALIZER_DESCRIPTOR: EffectDescriptor = EffectDescriptor {
    type_uuid: EQUALIZER_TYPE_UUID,
    uuid: EQUALIZER_UUID,
    api_version: EFFECT_API_VERSION,
    flags: FLAG_TYPE_INSERT | FLAG_INSERT_LAST,
    cpu_load: 0,
    memory_usage: 1,
    name: "Graphic Equalizer",
    implementor: "Tonal Contributors",
};
