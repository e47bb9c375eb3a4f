// Exhaustive sweeps over start bit, length and byte order

use can_signal_codec::{
    BitLayout, ByteOrder, CodecConfig, RawValue, SignalCodec, SignalDefinition, ValueType,
};

const FRAME_LEN: usize = 8;

/// Every (start, length, order) whose bits stay inside an 8-byte frame
fn valid_geometries() -> Vec<(u16, u16, ByteOrder)> {
    let mut out = Vec::new();
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        for start in 0..64u16 {
            for length in 1..=64u16 {
                let layout = BitLayout::new(start, length, order);
                if layout.byte_span().end <= FRAME_LEN {
                    out.push((start, length, order));
                }
            }
        }
    }
    out
}

/// Sample raw values across the field width, including both extremes
fn sample_values(length: u16) -> Vec<u64> {
    let max = if length == 64 {
        u64::MAX
    } else {
        (1u64 << length) - 1
    };
    let mut values = vec![0, 1, max, max >> 1, (max >> 1) + 1, 0x5555_5555_5555_5555 & max];
    values.push(0xAAAA_AAAA_AAAA_AAAA & max);
    values.dedup();
    values
}

#[test]
fn test_segments_partition_field() {
    for (start, length, order) in valid_geometries() {
        let layout = BitLayout::new(start, length, order);

        let owned: u32 = layout.segments().iter().map(|s| s.mask.count_ones()).sum();
        assert_eq!(owned, length as u32, "{:?} {}|{}", order, start, length);

        let mut indices: Vec<usize> = layout.segments().iter().map(|s| s.byte_index).collect();
        indices.dedup();
        assert_eq!(indices.len(), layout.segments().len(), "byte visited twice");

        // Packing all ones sets exactly the masked bits
        let mut data = [0u8; FRAME_LEN];
        layout.pack(&mut data, u64::MAX);
        let set: u32 = data.iter().map(|b| b.count_ones()).sum();
        assert_eq!(set, length as u32, "{:?} {}|{}", order, start, length);
    }
}

#[test]
fn test_round_trip_into_zeroed_buffer() {
    for (start, length, order) in valid_geometries() {
        let layout = BitLayout::new(start, length, order);
        for value in sample_values(length) {
            let mut data = [0u8; FRAME_LEN];
            layout.pack(&mut data, value);
            assert_eq!(
                layout.extract(&data),
                value,
                "{:?} {}|{} value {:#x}",
                order,
                start,
                length,
                value
            );
        }
    }
}

#[test]
fn test_pack_leaves_foreign_bits_alone() {
    for (start, length, order) in valid_geometries() {
        let layout = BitLayout::new(start, length, order);
        let mut data = [0xFFu8; FRAME_LEN];
        layout.pack(&mut data, 0);

        let mut expected = [0xFFu8; FRAME_LEN];
        for s in layout.segments() {
            expected[s.byte_index] &= !s.mask;
        }
        assert_eq!(data, expected, "{:?} {}|{}", order, start, length);
    }
}

#[test]
fn test_signed_codec_round_trip() {
    let config = CodecConfig::default();
    for (start, length, order) in valid_geometries() {
        let signal = SignalDefinition::new("Field", start, length, order)
            .with_value_type(ValueType::Signed);
        let codec = SignalCodec::new(&signal, &config).unwrap();

        let (min, max) = codec.range().interval().unwrap();
        for value in [min, -1, 0, max] {
            let raw = RawValue::Signed(value as i64);
            let mut data = [0u8; FRAME_LEN];
            codec.pack_raw(&mut data, raw).unwrap();
            assert_eq!(
                codec.unpack_raw(&data).unwrap(),
                raw,
                "{:?} {}|{}",
                order,
                start,
                length
            );
        }
    }
}
