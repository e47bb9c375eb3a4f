// Encode/decode of the motohawk example message loaded from a JSON descriptor

use anyhow::Result;
use can_signal_codec::{
    frame, CodecConfig, CodecError, MessageCodec, MessageDefinition, RawValue, SignalValue,
};

const GOLDEN: [u8; 8] = [0xA5, 0xB6, 0xD9, 0x00, 0x00, 0x00, 0x00, 0x00];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn load_message() -> Result<MessageDefinition> {
    let text = include_str!("fixtures/motohawk.json");
    Ok(serde_json::from_str(text)?)
}

fn float_value(value: &SignalValue) -> f64 {
    match value {
        SignalValue::Float(v) => *v,
        other => panic!("expected a numeric value, got {:?}", other),
    }
}

#[test]
fn test_fixture_loads() -> Result<()> {
    init_logging();
    let message = load_message()?;

    assert_eq!(message.id, 0x1F0);
    assert_eq!(message.signals.len(), 3);
    assert_eq!(message.sender.as_deref(), Some("PCM1"));
    assert!(!message.is_extended);

    let radius = message.signal("AverageRadius").unwrap();
    assert_eq!(radius.factor, 0.1);
    assert_eq!(radius.offset, 0.0);

    let enable = message.signal("Enable").unwrap();
    assert_eq!(enable.factor, 1.0);
    assert_eq!(enable.choices.as_ref().unwrap().get(1), Some("Enabled"));
    Ok(())
}

#[test]
fn test_decode_golden_frame() -> Result<()> {
    init_logging();
    let message = load_message()?;
    let codec = MessageCodec::new(&message, &CodecConfig::default())?;

    let decoded = codec.decode(&GOLDEN)?;
    assert_eq!(decoded.signals.len(), 3);

    let temperature = decoded.get("Temperature").unwrap();
    assert_eq!(temperature.raw, Some(RawValue::Signed(-586)));
    assert!((float_value(&temperature.value) - 244.14).abs() < 1e-9);

    let radius = decoded.get("AverageRadius").unwrap();
    assert_eq!(radius.raw, Some(RawValue::Unsigned(18)));
    assert!((float_value(&radius.value) - 1.8).abs() < 1e-9);

    let enable = decoded.get("Enable").unwrap();
    assert_eq!(enable.to_string(), "Enable: ENABLED");
    Ok(())
}

#[test]
fn test_encode_matches_golden_signal_bits() -> Result<()> {
    init_logging();
    let message = load_message()?;
    let codec = MessageCodec::new(&message, &CodecConfig::default())?;

    let frame = codec.encode(&[
        ("Temperature", SignalValue::Float(244.14)),
        ("AverageRadius", SignalValue::Float(1.8)),
        (
            "Enable",
            SignalValue::Choice {
                raw: RawValue::Unsigned(1),
                name: None,
            },
        ),
    ])?;

    // Bytes 0 and 1 are fully owned by signals; byte 2 keeps only the
    // Temperature bits, the golden frame has residue in its low bits
    assert_eq!(frame::hex_string(&frame[..2]), "a5b6");
    assert_eq!(frame[2], GOLDEN[2] & 0xE0);

    let again = codec.decode(&frame)?;
    let original = codec.decode(&GOLDEN)?;
    for (a, b) in again.signals.iter().zip(original.signals.iter()) {
        assert_eq!(a.raw, b.raw, "signal {}", a.name);
    }
    Ok(())
}

#[test]
fn test_range_checks() -> Result<()> {
    init_logging();
    let message = load_message()?;
    let codec = MessageCodec::new(&message, &CodecConfig::default())?;

    let temperature = codec.signal("Temperature")?;
    assert_eq!(temperature.range().interval(), Some((-2048, 2047)));
    assert!(temperature.physical_in_range(229.52));
    assert!(temperature.physical_in_range(270.47));
    assert!(!temperature.physical_in_range(270.48));

    let radius = codec.signal("AverageRadius")?;
    assert_eq!(radius.range().interval(), Some((0, 50)));

    let mut data = GOLDEN;
    let err = codec
        .pack(&mut data, "AverageRadius", &SignalValue::Float(6.3))
        .unwrap_err();
    assert!(matches!(err, CodecError::OutOfRange { .. }));
    assert_eq!(data, GOLDEN);
    Ok(())
}

#[test]
fn test_repack_preserves_neighbours() -> Result<()> {
    init_logging();
    let message = load_message()?;
    let codec = MessageCodec::new(&message, &CodecConfig::default())?;

    let mut data = GOLDEN;
    codec.pack(&mut data, "AverageRadius", &SignalValue::Float(0.0))?;
    assert_eq!(data[0], 0xA5 & !0x7E);
    assert_eq!(data[1..], GOLDEN[1..]);

    codec.clear_signal(&mut data, "Enable")?;
    assert_eq!(data[0], 0x01);

    let decoded = codec.decode(&data)?;
    assert_eq!(decoded.get("Temperature").unwrap().raw, Some(RawValue::Signed(-586)));
    assert_eq!(
        decoded.get("Enable").unwrap().value,
        SignalValue::Choice {
            raw: RawValue::Unsigned(0),
            name: Some("DISABLED".to_string())
        }
    );
    Ok(())
}
