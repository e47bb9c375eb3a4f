//! Core types for the CAN signal codec library
//!
//! This module defines the values that flow in and out of the codec: the error
//! type, raw bit-pattern values, physical signal values and decoded signals.
//! None of these types hold buffers; the codec always works on a caller-owned
//! frame buffer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors that can occur while building codecs or packing signals
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Value out of range for signal '{signal}': raw {raw}")]
    OutOfRange { signal: String, raw: RawValue },

    #[error("Frame buffer too short: need {needed} bytes, got {actual}")]
    BufferTooShort { needed: usize, actual: usize },

    #[error("Signal not found: {0}")]
    SignalNotFound(String),

    #[error("Invalid signal definition: {0}")]
    InvalidSignalDefinition(String),

    #[error("Multiplexed signal '{signal}' in message '{message}' is not supported")]
    MultiplexedSignal { message: String, signal: String },

    #[error("Signal '{signal}' expects a {expected} value")]
    ValueTypeMismatch {
        signal: String,
        expected: &'static str,
    },

    #[error("Signal '{signal}' has no choice named '{choice}'")]
    UnknownChoice { signal: String, choice: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// A raw value as stored in the frame, before scale/offset conversion
///
/// The variant follows the signal's backing type: signed integer fields are
/// carried as `Signed` after sign extension, float fields as `Float`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl RawValue {
    /// Widen to f64 for physical conversion
    pub fn as_f64(&self) -> f64 {
        match self {
            RawValue::Unsigned(v) => *v as f64,
            RawValue::Signed(v) => *v as f64,
            RawValue::Float(v) => *v,
        }
    }

    /// Integer view used by range checks, `None` for float values
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            RawValue::Unsigned(v) => Some(*v as i128),
            RawValue::Signed(v) => Some(*v as i128),
            RawValue::Float(_) => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Unsigned(v) => write!(f, "{}", v),
            RawValue::Signed(v) => write!(f, "{}", v),
            RawValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Signal value types accepted by `pack` and produced by `unpack`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalValue {
    /// Physical value after scaling/offset
    Float(f64),
    /// Boolean flag (raw 0/1)
    Boolean(bool),
    /// Enumerated value with its disambiguated choice name, if declared
    Choice {
        raw: RawValue,
        name: Option<String>,
    },
    /// Text carried one byte per character
    Text(String),
}

impl SignalValue {
    /// Convert signal value to f64, `None` for text
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SignalValue::Float(v) => Some(*v),
            SignalValue::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
            SignalValue::Choice { raw, .. } => Some(raw.as_f64()),
            SignalValue::Text(_) => None,
        }
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Float(v) => write!(f, "{}", v),
            SignalValue::Boolean(v) => write!(f, "{}", if *v { "true" } else { "false" }),
            SignalValue::Choice { name: Some(name), .. } => write!(f, "{}", name),
            SignalValue::Choice { name: None, .. } => write!(f, "UNDEFINED"),
            SignalValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A decoded signal with its current value
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSignal {
    /// Signal name
    pub name: String,
    /// Decoded value
    pub value: SignalValue,
    /// Engineering unit (e.g., "km/h", "V"), printed after numeric values
    pub unit: Option<String>,
    /// Raw value before scaling, `None` for string signals
    pub raw: Option<RawValue>,
}

impl fmt::Display for DecodedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)?;
        if let (SignalValue::Float(_), Some(unit)) = (&self.value, &self.unit) {
            let unit = unit.trim();
            if !unit.is_empty() && unit != "-" {
                write!(f, " {}", unit)?;
            }
        }
        Ok(())
    }
}

/// All decoded signals of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Message name
    pub message_name: String,
    /// Signals in message order
    pub signals: Vec<DecodedSignal>,
}

impl DecodedFrame {
    /// Look up a decoded signal by name
    pub fn get(&self, name: &str) -> Option<&DecodedSignal> {
        self.signals.iter().find(|s| s.name == name)
    }
}

impl fmt::Display for DecodedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, signal) in self.signals.iter().enumerate() {
            if i > 0 {
                write!(f, "  ")?;
            }
            write!(f, "{}", signal)?;
        }
        Ok(())
    }
}

/// Non-fatal conditions recorded while building a message codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecWarning {
    /// A multiplexed signal was left out of the codec
    MultiplexedSignalSkipped { message: String, signal: String },
}

impl fmt::Display for CodecWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecWarning::MultiplexedSignalSkipped { message, signal } => write!(
                f,
                "multiplexed signal '{}' in message '{}' skipped",
                signal, message
            ),
        }
    }
}
