// Priority/PGN derivation through the public message API

use anyhow::Result;
use can_signal_codec::{
    j1939, ByteOrder, CodecConfig, MessageCodec, MessageDefinition, Protocol, SignalDefinition,
    SignalValue, TypeClass,
};

fn ccvs1() -> MessageDefinition {
    MessageDefinition::new(0x18FE_F100, "CCVS1", 8)
        .with_extended(true)
        .with_cycle_time(100)
        .with_protocol(Protocol::J1939)
        .add_signal(
            SignalDefinition::new("WheelBasedVehicleSpeed", 8, 16, ByteOrder::LittleEndian)
                .with_scaling(1.0 / 256.0, 0.0)
                .with_bounds(Some(0.0), Some(250.996))
                .with_unit("km/h")
                .with_spn(84),
        )
        .add_signal(
            SignalDefinition::new("ParkingBrakeSwitch", 26, 2, ByteOrder::LittleEndian)
                .with_unit("bool")
                .with_spn(70),
        )
}

#[test]
fn test_broadcast_identifier() {
    assert_eq!(j1939::priority(0x18FE_F100), 6);
    assert_eq!(j1939::pgn(0x18FE_F100), 0xFEF1);
}

#[test]
fn test_message_capability() -> Result<()> {
    let message = ccvs1();
    let codec = MessageCodec::new(&message, &CodecConfig::default())?;

    assert_eq!(codec.priority(), 6);
    assert_eq!(codec.pgn(), Some(0xFEF1));
    let id = codec.j1939().unwrap();
    assert_eq!(id.source_address, 0x00);
    assert_eq!(message.cycle_time_ms, 100);
    assert_eq!(message.signal("WheelBasedVehicleSpeed").unwrap().spn, Some(84));
    assert_eq!(
        codec.signal("ParkingBrakeSwitch")?.type_class(),
        TypeClass::Boolean
    );
    Ok(())
}

#[test]
fn test_j1939_payload() -> Result<()> {
    let message = ccvs1();
    let codec = MessageCodec::new(&message, &CodecConfig::default())?;

    let frame = codec.encode(&[
        ("WheelBasedVehicleSpeed", SignalValue::Float(88.5)),
        ("ParkingBrakeSwitch", SignalValue::Boolean(true)),
    ])?;
    // 88.5 * 256 = 22656 = 0x5880
    assert_eq!(&frame[1..4], &[0x80, 0x58, 0x04]);

    let decoded = codec.decode(&frame)?;
    assert_eq!(
        decoded.get("WheelBasedVehicleSpeed").unwrap().value,
        SignalValue::Float(88.5)
    );
    assert_eq!(
        decoded.get("ParkingBrakeSwitch").unwrap().value,
        SignalValue::Boolean(true)
    );
    assert!(!codec.signal("WheelBasedVehicleSpeed")?.physical_in_range(251.0));
    Ok(())
}
