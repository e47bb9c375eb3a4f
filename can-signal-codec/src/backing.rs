//! Backing integer/float types and sign extension
//!
//! Every signal is carried in the smallest machine type that holds its bit
//! length. The backing type decides native bounds and how an unpacked bit
//! pattern is reinterpreted.

use crate::signals::{SignalDefinition, ValueType};
use crate::types::RawValue;
use std::fmt;

/// Width of the machine type backing a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BackingWidth {
    W8,
    W16,
    W32,
    W64,
}

impl BackingWidth {
    /// Smallest width holding `length` bits
    pub fn for_length(length: u16) -> Self {
        match length {
            0..=8 => BackingWidth::W8,
            9..=16 => BackingWidth::W16,
            17..=32 => BackingWidth::W32,
            _ => BackingWidth::W64,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            BackingWidth::W8 => 8,
            BackingWidth::W16 => 16,
            BackingWidth::W32 => 32,
            BackingWidth::W64 => 64,
        }
    }

    /// All ones across the width
    pub fn mask(self) -> u64 {
        match self {
            BackingWidth::W64 => u64::MAX,
            w => (1u64 << w.bits()) - 1,
        }
    }
}

/// Interpretation of the backing bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackingKind {
    Unsigned,
    Signed,
    Float,
}

/// Machine type a signal's raw value lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackingType {
    pub kind: BackingKind,
    pub width: BackingWidth,
}

impl BackingType {
    pub fn new(value_type: ValueType, length: u16) -> Self {
        let kind = match value_type {
            ValueType::Unsigned => BackingKind::Unsigned,
            ValueType::Signed => BackingKind::Signed,
            ValueType::Float => BackingKind::Float,
        };
        Self {
            kind,
            width: BackingWidth::for_length(length),
        }
    }

    pub fn for_signal(signal: &SignalDefinition) -> Self {
        Self::new(signal.value_type, signal.length)
    }

    pub fn is_float(&self) -> bool {
        self.kind == BackingKind::Float
    }

    /// Inclusive native integer bounds, `None` for float types
    pub fn native_bounds(&self) -> Option<(i128, i128)> {
        let bits = self.width.bits();
        match self.kind {
            BackingKind::Unsigned => Some((0, self.width.mask() as i128)),
            BackingKind::Signed => Some((-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)),
            BackingKind::Float => None,
        }
    }

    /// Largest finite magnitude of a float type
    pub fn float_limit(&self) -> f64 {
        match self.width {
            BackingWidth::W32 => f32::MAX as f64,
            _ => f64::MAX,
        }
    }

    /// Build a raw value of this type from an integer, `None` if it does not fit
    pub fn raw_from_i128(&self, value: i128) -> Option<RawValue> {
        let (min, max) = self.native_bounds()?;
        if value < min || value > max {
            return None;
        }
        Some(match self.kind {
            BackingKind::Signed => RawValue::Signed(value as i64),
            _ => RawValue::Unsigned(value as u64),
        })
    }

    /// Re-tag a raw value as this type, `None` if it is not representable
    pub fn normalize(&self, raw: RawValue) -> Option<RawValue> {
        match (self.kind, raw) {
            (BackingKind::Float, RawValue::Float(v)) => {
                (!v.is_finite() || v.abs() <= self.float_limit()).then_some(raw)
            }
            (BackingKind::Float, _) | (_, RawValue::Float(_)) => None,
            (_, r) => self.raw_from_i128(r.as_i128()?),
        }
    }

    /// Bit pattern of a normalized raw value, truncated to the backing width
    pub fn to_bits(&self, raw: RawValue) -> u64 {
        match raw {
            RawValue::Unsigned(v) => v & self.width.mask(),
            RawValue::Signed(v) => (v as u64) & self.width.mask(),
            RawValue::Float(v) => match self.width {
                BackingWidth::W32 => (v as f32).to_bits() as u64,
                _ => v.to_bits(),
            },
        }
    }

    /// Interpret an extracted field of `length` bits
    pub fn raw_from_bits(&self, length: u16, bits: u64) -> RawValue {
        match self.kind {
            BackingKind::Unsigned => RawValue::Unsigned(bits),
            BackingKind::Signed => RawValue::Signed(sign_extend(self.width, length, bits)),
            BackingKind::Float => match self.width {
                BackingWidth::W32 => RawValue::Float(f32::from_bits(bits as u32) as f64),
                _ => RawValue::Float(f64::from_bits(bits)),
            },
        }
    }
}

impl fmt::Display for BackingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.width) {
            (BackingKind::Float, BackingWidth::W32) => write!(f, "float"),
            (BackingKind::Float, _) => write!(f, "double"),
            (BackingKind::Signed, w) => write!(f, "int{}", w.bits()),
            (BackingKind::Unsigned, w) => write!(f, "uint{}", w.bits()),
        }
    }
}

/// Inclusive bounds representable in the field's own bit length
pub fn field_bounds(kind: BackingKind, length: u16) -> (i128, i128) {
    let length = length as u32;
    match kind {
        BackingKind::Signed => (-(1i128 << (length - 1)), (1i128 << (length - 1)) - 1),
        _ => (0, (1i128 << length) - 1),
    }
}

/// Sign-extend a `length`-bit field held in a `width`-bit backing type.
///
/// If the field's top bit is set, every bit from `length` up to the width is
/// filled with ones before the pattern is read as two's complement.
pub fn sign_extend(width: BackingWidth, length: u16, raw: u64) -> i64 {
    let mut value = raw & width.mask();
    let length = length as u32;

    if length < width.bits() && value & (1u64 << (length - 1)) != 0 {
        value |= (!0u64 << length) & width.mask();
    }

    match width {
        BackingWidth::W8 => value as u8 as i8 as i64,
        BackingWidth::W16 => value as u16 as i16 as i64,
        BackingWidth::W32 => value as u32 as i32 as i64,
        BackingWidth::W64 => value as i64,
    }
}
