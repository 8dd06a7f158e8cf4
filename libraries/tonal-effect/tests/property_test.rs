//! Property-based tests for the effect control layer
//!
//! Hosts hand over arbitrary bytes; nothing they send may panic the effect
//! or leave it unable to process.

use proptest::prelude::*;
use tonal_effect::param::{encode_block, encode_set_request};
use tonal_effect::{EffectCommand, EffectConfig, EqParamSet, EqualizerEffect, ProcessStatus};

proptest! {
    /// Property: arbitrary command payloads never panic
    #[test]
    fn arbitrary_commands_never_panic(
        code in 0u32..16,
        cmd in prop::collection::vec(any::<u8>(), 0..96),
        reply_len in 0usize..128
    ) {
        let mut effect = EqualizerEffect::new().unwrap();
        let mut reply = vec![0u8; reply_len];
        if let Ok(written) = effect.command(code, &cmd, &mut reply) {
            prop_assert!(written <= reply_len);
        }
    }

    /// Property: well-formed parameter blocks with arbitrary words never panic
    #[test]
    fn arbitrary_parameter_words_never_panic(
        id in 0i32..10,
        arg in any::<i32>(),
        value in prop::collection::vec(any::<i32>(), 0..20),
        vsize in 0usize..64
    ) {
        let mut effect = EqualizerEffect::new().unwrap();
        let param: Vec<u8> = [id, arg].iter().flat_map(|w| w.to_le_bytes()).collect();
        let value: Vec<u8> = value.iter().flat_map(|w| w.to_le_bytes()).collect();
        let mut reply = vec![0u8; 256];

        let set = encode_block(0, &param, &value, value.len());
        prop_assert_eq!(
            effect.command(EffectCommand::SetParam.code(), &set, &mut reply).unwrap(),
            4
        );
        let get = encode_block(0, &param, &[], vsize);
        let written = effect.command(EffectCommand::GetParam.code(), &get, &mut reply).unwrap();
        prop_assert!(written >= 20);

        effect.enable().unwrap();
        let input = vec![1000i16; 256];
        let mut output = vec![0i16; 256];
        prop_assert_eq!(effect.process(&input, &mut output).unwrap(), ProcessStatus::Processed);
    }

    /// Property: any gain written over the wire reads back saturated to i16
    #[test]
    fn band_level_reads_back(band in 0usize..5, millibel in -9600i32..4800) {
        let mut effect = EqualizerEffect::new().unwrap();
        let mut reply = [0u8; 4];
        let request = encode_set_request(&EqParamSet::BandLevel { band, millibel });
        effect.command(EffectCommand::SetParam.code(), &request, &mut reply).unwrap();
        prop_assert_eq!(i32::from_le_bytes(reply), 0);
        prop_assert_eq!(effect.equalizer().gain(band).unwrap(), millibel);
    }

    /// Property: decoding arbitrary config bytes never panics
    #[test]
    fn config_decode_never_panics(bytes in prop::array::uniform24(any::<u8>())) {
        if let Ok(config) = EffectConfig::from_bytes(&bytes) {
            let mut effect = EqualizerEffect::new().unwrap();
            let accepted = effect.set_config(config).is_ok();
            prop_assert_eq!(accepted, config.validate().is_ok());
        }
    }
}
