//! Signal and message descriptors
//!
//! The immutable description of a frame handed over by an external database
//! layer. Everything the codec derives (segments, backing types, bounds,
//! choice names) is computed from these records and never written back.

use crate::config::UnitKeywords;
use crate::j1939::J1939Id;
use crate::layout::BitLayout;
use crate::signals::choices::ChoiceTable;
use crate::types::{CodecError, Result};
use serde::{Deserialize, Serialize};

/// A complete CAN message definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDefinition {
    /// CAN message ID (11-bit or 29-bit)
    pub id: u32,
    /// Message name
    pub name: String,
    /// Message size in bytes
    pub size: usize,
    /// True if the frame uses a 29-bit identifier
    #[serde(default)]
    pub is_extended: bool,
    /// Cycle time in milliseconds, 0 when unset
    #[serde(default)]
    pub cycle_time_ms: u32,
    /// Protocol family the identifier follows, if any
    #[serde(default)]
    pub protocol: Option<Protocol>,
    /// Sender ECU name (optional)
    #[serde(default)]
    pub sender: Option<String>,
    /// All signals in this message, in frame order
    pub signals: Vec<SignalDefinition>,
}

/// A CAN signal definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDefinition {
    /// Signal name
    pub name: String,
    /// Start bit in the CAN frame (MSB for big-endian, LSB for little-endian)
    pub start_bit: u16,
    /// Length in bits
    pub length: u16,
    /// Byte order
    pub byte_order: ByteOrder,
    /// Value type (signed/unsigned/float)
    #[serde(default)]
    pub value_type: ValueType,
    /// Scale factor to convert raw value to physical value
    #[serde(default = "default_factor")]
    pub factor: f64,
    /// Offset to add after scaling
    #[serde(default)]
    pub offset: f64,
    /// Minimum physical value, if declared
    #[serde(default)]
    pub min: Option<f64>,
    /// Maximum physical value, if declared
    #[serde(default)]
    pub max: Option<f64>,
    /// Engineering unit (e.g., "km/h", "degK", "V")
    #[serde(default)]
    pub unit: Option<String>,
    /// How the raw value is interpreted, classified from the unit when unset
    #[serde(default)]
    pub type_class: Option<TypeClass>,
    /// Value table for enum-like values (raw_value -> description)
    #[serde(default)]
    pub choices: Option<ChoiceTable>,
    /// J1939 suspect parameter number
    #[serde(default)]
    pub spn: Option<u32>,
    /// Multiplexing role (None if not multiplexed)
    #[serde(default)]
    pub multiplexer: Option<MultiplexRole>,
}

fn default_factor() -> f64 {
    1.0
}

/// Byte order for signal extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Little-endian (Intel format)
    LittleEndian,
    /// Big-endian (Motorola format)
    BigEndian,
}

/// Value type for signal interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Signed integer
    Signed,
    /// Unsigned integer
    #[default]
    Unsigned,
    /// IEEE-754 float, 32 or 64 bits wide
    Float,
}

/// Type class of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeClass {
    #[default]
    Numeric,
    Boolean,
    Enum,
    String,
}

impl TypeClass {
    /// Classify a signal from its unit text.
    ///
    /// Enum is only chosen when the signal actually carries choices.
    pub fn classify(unit: Option<&str>, has_choices: bool, keywords: &UnitKeywords) -> Self {
        let Some(unit) = unit.map(str::trim) else {
            return TypeClass::Numeric;
        };

        let matches = |list: &[String]| list.iter().any(|k| k.eq_ignore_ascii_case(unit));

        if matches(&keywords.string_units) {
            TypeClass::String
        } else if has_choices && matches(&keywords.enum_units) {
            TypeClass::Enum
        } else if matches(&keywords.bool_units) {
            TypeClass::Boolean
        } else {
            TypeClass::Numeric
        }
    }

    /// Lower-case name used in messages
    pub fn name(self) -> &'static str {
        match self {
            TypeClass::Numeric => "numeric",
            TypeClass::Boolean => "boolean",
            TypeClass::Enum => "enum",
            TypeClass::String => "string",
        }
    }
}

/// Protocol family of a message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// SAE J1939 (29-bit identifier with priority and PGN)
    J1939,
}

/// Multiplexer information for multiplexed signals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplexerInfo {
    /// Name of the multiplexer signal that controls this signal
    pub multiplexer_signal: String,
    /// Multiplexer value(s) for which this signal is active
    pub multiplexer_values: Vec<u64>,
}

/// Role of a signal in a multiplexed message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplexRole {
    /// The selector whose value picks the active signal set
    Multiplexor,
    /// A signal only present for some selector values
    Multiplexed(MultiplexerInfo),
}

impl SignalDefinition {
    /// Create an unsigned numeric signal with identity scaling
    pub fn new(name: impl Into<String>, start_bit: u16, length: u16, byte_order: ByteOrder) -> Self {
        Self {
            name: name.into(),
            start_bit,
            length,
            byte_order,
            value_type: ValueType::Unsigned,
            factor: 1.0,
            offset: 0.0,
            min: None,
            max: None,
            unit: None,
            type_class: None,
            choices: None,
            spn: None,
            multiplexer: None,
        }
    }

    /// Builder method: set the value type
    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Builder method: set factor and offset
    pub fn with_scaling(mut self, factor: f64, offset: f64) -> Self {
        self.factor = factor;
        self.offset = offset;
        self
    }

    /// Builder method: set declared physical bounds
    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Builder method: set the unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Builder method: set the type class
    pub fn with_type_class(mut self, type_class: TypeClass) -> Self {
        self.type_class = Some(type_class);
        self
    }

    /// Builder method: attach a choice table
    pub fn with_choices(mut self, choices: ChoiceTable) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Builder method: set the J1939 SPN
    pub fn with_spn(mut self, spn: u32) -> Self {
        self.spn = Some(spn);
        self
    }

    /// Builder method: set the multiplexing role
    pub fn with_multiplexer(mut self, role: MultiplexRole) -> Self {
        self.multiplexer = Some(role);
        self
    }

    /// Declared type class, or the one the unit text selects
    pub fn resolve_type_class(&self, keywords: &UnitKeywords) -> TypeClass {
        self.type_class.unwrap_or_else(|| {
            TypeClass::classify(
                self.unit.as_deref(),
                self.choices.as_ref().is_some_and(|c| !c.is_empty()),
                keywords,
            )
        })
    }

    pub fn is_signed(&self) -> bool {
        self.value_type == ValueType::Signed
    }

    pub fn is_float(&self) -> bool {
        self.value_type == ValueType::Float
    }

    pub fn is_multiplexed(&self) -> bool {
        self.multiplexer.is_some()
    }

    fn invalid(&self, reason: String) -> Result<()> {
        Err(CodecError::InvalidSignalDefinition(format!(
            "{}: {}",
            self.name, reason
        )))
    }

    /// Check length, scale and type class independently of any frame
    pub fn validate_shape(&self, keywords: &UnitKeywords) -> Result<()> {
        let type_class = self.resolve_type_class(keywords);

        if self.length == 0 || self.length > 64 {
            return self.invalid(format!("length {} outside 1..=64", self.length));
        }
        if self.factor == 0.0 || !self.factor.is_finite() {
            return self.invalid(format!("scale {} must be finite and non-zero", self.factor));
        }
        if self.is_float() && self.length != 32 && self.length != 64 {
            return self.invalid(format!(
                "float signal must be 32 or 64 bits, got {}",
                self.length
            ));
        }
        if type_class == TypeClass::String && self.length % 8 != 0 {
            return self.invalid(format!("string length {} is not whole bytes", self.length));
        }
        if self.is_float() && matches!(type_class, TypeClass::Enum | TypeClass::String) {
            return self.invalid(format!("{} signal cannot be float-backed", type_class.name()));
        }
        Ok(())
    }

    /// Check the signal geometry against a frame of `frame_size` bytes
    pub fn validate(&self, frame_size: usize, keywords: &UnitKeywords) -> Result<()> {
        self.validate_shape(keywords)?;

        let end = BitLayout::from_signal(self).byte_span().end;
        if end > frame_size {
            return self.invalid(format!(
                "bits span {} bytes but frame has {}",
                end, frame_size
            ));
        }
        if self.resolve_type_class(keywords) == TypeClass::String {
            let end = self.start_bit as usize / 8 + self.length as usize / 8;
            if end > frame_size {
                return self.invalid(format!(
                    "text spans {} bytes but frame has {}",
                    end, frame_size
                ));
            }
        }

        Ok(())
    }
}

impl MessageDefinition {
    /// Create a standard-frame message without signals
    pub fn new(id: u32, name: impl Into<String>, size: usize) -> Self {
        Self {
            id,
            name: name.into(),
            size,
            is_extended: false,
            cycle_time_ms: 0,
            protocol: None,
            sender: None,
            signals: Vec::new(),
        }
    }

    /// Builder method: mark the identifier as 29-bit
    pub fn with_extended(mut self, extended: bool) -> Self {
        self.is_extended = extended;
        self
    }

    /// Builder method: set cycle time
    pub fn with_cycle_time(mut self, cycle_time_ms: u32) -> Self {
        self.cycle_time_ms = cycle_time_ms;
        self
    }

    /// Builder method: tag the protocol family
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Builder method: append a signal
    pub fn add_signal(mut self, signal: SignalDefinition) -> Self {
        self.signals.push(signal);
        self
    }

    /// Find a signal by name
    pub fn signal(&self, name: &str) -> Option<&SignalDefinition> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// True if this message has multiplexed signals
    pub fn is_multiplexed(&self) -> bool {
        self.signals.iter().any(SignalDefinition::is_multiplexed)
    }

    /// J1939 fields of the identifier, only for J1939-tagged messages
    pub fn j1939(&self) -> Option<J1939Id> {
        match self.protocol {
            Some(Protocol::J1939) => Some(J1939Id::from_raw(self.id)),
            None => None,
        }
    }

    /// Check message size and every signal's geometry
    pub fn validate(&self, keywords: &UnitKeywords) -> Result<()> {
        if self.size == 0 {
            return Err(CodecError::InvalidSignalDefinition(format!(
                "message '{}' has zero length",
                self.name
            )));
        }
        for signal in &self.signals {
            signal.validate(self.size, keywords)?;
        }
        Ok(())
    }
}
