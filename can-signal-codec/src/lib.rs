//! CAN Signal Codec Library
//!
//! A stateless library that turns CAN signal descriptions into exact
//! byte-level pack/unpack operations over a caller-owned frame buffer.
//!
//! # Architecture
//!
//! Everything is derived from an immutable message/signal description:
//! - `layout` splits a field into byte-confined segments for either byte order
//! - `backing` picks the machine type of a field and sign-extends raw values
//! - `range` computes the admissible raw interval from declared and native bounds
//! - `signal_codec` packs and unpacks numeric, boolean, enum and string signals
//! - `message_codec` bundles a message's signals and encodes/decodes whole frames
//! - `j1939` derives priority and PGN from 29-bit identifiers
//!
//! The library does NOT:
//! - Parse DBC/ARXML or any other database format
//! - Read or write log files
//! - Resolve multiplexed signal trees (they are rejected or skipped)
//!
//! Concurrent packs into the same buffer must be serialized by the caller.
//!
//! # Example Usage
//!
//! ```
//! use can_signal_codec::{
//!     ByteOrder, CodecConfig, MessageCodec, MessageDefinition, SignalDefinition,
//!     SignalValue, ValueType,
//! };
//!
//! let message = MessageDefinition::new(0x1F0, "ExampleMessage", 8).add_signal(
//!     SignalDefinition::new("Temperature", 0, 12, ByteOrder::BigEndian)
//!         .with_value_type(ValueType::Signed)
//!         .with_scaling(0.01, 250.0)
//!         .with_unit("degK"),
//! );
//!
//! let codec = MessageCodec::new(&message, &CodecConfig::default()).unwrap();
//! let frame = codec
//!     .encode(&[("Temperature", SignalValue::Float(244.14))])
//!     .unwrap();
//! assert_eq!(&frame[..3], &[0x01, 0xB6, 0xC0]);
//!
//! let decoded = codec.decode(&frame).unwrap();
//! println!("{}", decoded);
//! ```

// Public modules
pub mod backing;
pub mod config;
pub mod frame;
pub mod j1939;
pub mod layout;
pub mod message_codec;
pub mod range;
pub mod signal_codec;
pub mod signals;
pub mod types;

// Re-export main types for convenience
pub use backing::{sign_extend, BackingType, BackingWidth};
pub use config::{CodecConfig, MultiplexPolicy, UnitKeywords};
pub use j1939::J1939Id;
pub use layout::{BitLayout, Orientation, Segment, ShiftDirection};
pub use message_codec::MessageCodec;
pub use range::RawRange;
pub use signal_codec::SignalCodec;
pub use signals::{
    canonical_name, ByteOrder, ChoiceTable, MessageDefinition, MultiplexRole, MultiplexerInfo,
    Protocol, SignalDefinition, TypeClass, ValueType,
};
pub use types::{
    CodecError, CodecWarning, DecodedFrame, DecodedSignal, RawValue, Result, SignalValue,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an empty message builds a codec and decodes to nothing
        let message = MessageDefinition::new(0x100, "Empty", 8);
        let codec = MessageCodec::new(&message, &CodecConfig::default()).unwrap();
        let decoded = codec.decode(&codec.new_frame()).unwrap();
        assert!(decoded.signals.is_empty());
        assert!(!VERSION.is_empty());
    }
}
