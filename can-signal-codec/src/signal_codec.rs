//! Per-signal pack/unpack
//!
//! A `SignalCodec` composes the immutable signal record with everything
//! derived from it: bit layout, backing type, raw range and disambiguated
//! choice names. Packing validates strictly before the buffer is touched, so
//! a failed pack leaves the frame exactly as it was.

use crate::backing::{field_bounds, BackingType};
use crate::config::CodecConfig;
use crate::layout::{BitLayout, Segment};
use crate::range::RawRange;
use crate::signals::{SignalDefinition, TypeClass};
use crate::types::{CodecError, DecodedSignal, RawValue, Result, SignalValue};
use std::collections::BTreeMap;
use std::ops::Range;

/// Codec for one signal of a message
#[derive(Debug, Clone)]
pub struct SignalCodec<'a> {
    signal: &'a SignalDefinition,
    /// Declared class, or the one the configured unit keywords select
    type_class: TypeClass,
    backing: BackingType,
    layout: BitLayout,
    range: RawRange,
    /// Disambiguated choice names, enum signals only
    choices: Option<BTreeMap<i64, String>>,
    string_terminators: Vec<u8>,
}

impl<'a> SignalCodec<'a> {
    /// Derive the codec artifacts of a signal
    pub fn new(signal: &'a SignalDefinition, config: &CodecConfig) -> Result<Self> {
        signal.validate_shape(&config.units)?;

        let type_class = signal.resolve_type_class(&config.units);
        let backing = BackingType::for_signal(signal);
        let layout = BitLayout::from_signal(signal);
        let range = RawRange::for_signal(signal, backing, type_class);
        let choices = match (type_class, &signal.choices) {
            (TypeClass::Enum, Some(table)) => Some(table.unique_names()),
            _ => None,
        };

        log::trace!(
            "signal {}: {} {} over {} segment(s), range {:?}",
            signal.name,
            type_class.name(),
            backing,
            layout.segments().len(),
            range
        );

        Ok(Self {
            signal,
            type_class,
            backing,
            layout,
            range,
            choices,
            string_terminators: config.string_terminators.clone(),
        })
    }

    pub fn signal(&self) -> &'a SignalDefinition {
        self.signal
    }

    pub fn name(&self) -> &str {
        &self.signal.name
    }

    pub fn type_class(&self) -> TypeClass {
        self.type_class
    }

    pub fn backing(&self) -> BackingType {
        self.backing
    }

    pub fn layout(&self) -> &BitLayout {
        &self.layout
    }

    /// Segments in pack orientation
    pub fn segments(&self) -> &[Segment] {
        self.layout.segments()
    }

    pub fn range(&self) -> &RawRange {
        &self.range
    }

    /// Disambiguated choice names keyed by raw value
    pub fn choice_names(&self) -> Option<&BTreeMap<i64, String>> {
        self.choices.as_ref()
    }

    /// Frame bytes this signal occupies
    pub fn byte_span(&self) -> Range<usize> {
        match self.type_class {
            TypeClass::String => {
                let first = self.signal.start_bit as usize / 8;
                first..first + self.signal.length as usize / 8
            }
            _ => self.layout.byte_span(),
        }
    }

    /// Physical value to raw value of the backing type
    ///
    /// Integer signals round to the nearest raw value; float signals keep the
    /// quotient as is.
    pub fn encode(&self, physical: f64) -> Result<RawValue> {
        let quotient = (physical - self.signal.offset) / self.signal.factor;
        if self.backing.is_float() {
            return Ok(RawValue::Float(quotient));
        }

        let rounded = quotient.round();
        let out_of_range = || CodecError::OutOfRange {
            signal: self.signal.name.clone(),
            raw: RawValue::Float(rounded),
        };
        if !rounded.is_finite() {
            return Err(out_of_range());
        }
        self.backing
            .raw_from_i128(rounded as i128)
            .ok_or_else(out_of_range)
    }

    /// Raw value to physical value
    pub fn decode(&self, raw: RawValue) -> f64 {
        raw.as_f64() * self.signal.factor + self.signal.offset
    }

    /// Range predicate over raw values
    pub fn raw_in_range(&self, raw: RawValue) -> bool {
        self.admit(raw).is_ok()
    }

    /// Range predicate over physical values
    pub fn physical_in_range(&self, physical: f64) -> bool {
        matches!(self.encode(physical), Ok(raw) if self.raw_in_range(raw))
    }

    /// Normalize a raw value and check it against the field and the range
    fn admit(&self, raw: RawValue) -> Result<RawValue> {
        let out_of_range = || CodecError::OutOfRange {
            signal: self.signal.name.clone(),
            raw,
        };

        let normalized = self.backing.normalize(raw).ok_or_else(out_of_range)?;
        if let Some(value) = normalized.as_i128() {
            let (min, max) = field_bounds(self.backing.kind, self.signal.length);
            if value < min || value > max {
                return Err(out_of_range());
            }
        }
        if !self.range.contains(normalized) {
            return Err(out_of_range());
        }
        Ok(normalized)
    }

    fn check_buffer(&self, data: &[u8]) -> Result<()> {
        let needed = self.byte_span().end;
        if data.len() < needed {
            return Err(CodecError::BufferTooShort {
                needed,
                actual: data.len(),
            });
        }
        Ok(())
    }

    fn mismatch(&self) -> CodecError {
        CodecError::ValueTypeMismatch {
            signal: self.signal.name.clone(),
            expected: self.type_class.name(),
        }
    }

    /// Pack a raw value into the signal's bits
    pub fn pack_raw(&self, data: &mut [u8], raw: RawValue) -> Result<()> {
        self.check_buffer(data)?;
        let raw = self.admit(raw).map_err(|e| {
            log::debug!("rejecting raw {} for signal {}", raw, self.signal.name);
            e
        })?;
        self.layout.pack(data, self.backing.to_bits(raw));
        Ok(())
    }

    /// Pack a physical value
    pub fn pack_physical(&self, data: &mut [u8], physical: f64) -> Result<()> {
        self.check_buffer(data)?;
        let raw = self.encode(physical)?;
        self.pack_raw(data, raw)
    }

    /// Pack an enum signal by choice name
    ///
    /// Both the disambiguated name and the declared name are accepted.
    pub fn pack_choice(&self, data: &mut [u8], name: &str) -> Result<()> {
        let raw = self.choice_raw(name).ok_or_else(|| CodecError::UnknownChoice {
            signal: self.signal.name.clone(),
            choice: name.to_string(),
        })?;
        self.pack_raw(data, RawValue::Signed(raw))
    }

    fn choice_raw(&self, name: &str) -> Option<i64> {
        let unique = self.choices.as_ref()?;
        unique
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(raw, _)| *raw)
            .or_else(|| {
                self.signal
                    .choices
                    .as_ref()?
                    .iter()
                    .find(|(_, n)| *n == name)
                    .map(|(raw, _)| raw)
            })
    }

    /// Disambiguated name of a raw value; values outside the table's key
    /// range have no name
    fn choice_name(&self, raw: RawValue) -> Option<String> {
        let key = i64::try_from(raw.as_i128()?).ok()?;
        self.choices.as_ref()?.get(&key).cloned()
    }

    /// Copy text into a string signal's bytes
    ///
    /// The field is zeroed first. Text longer than the field is cut after the
    /// last whole character that fits.
    pub fn pack_str(&self, data: &mut [u8], text: &str) -> Result<()> {
        if self.type_class != TypeClass::String {
            return Err(self.mismatch());
        }
        self.check_buffer(data)?;

        let span = &mut data[self.byte_span()];
        let room = span.len();
        let end = text
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .take_while(|&end| end <= room)
            .last()
            .unwrap_or(0);
        span.fill(0);
        span[..end].copy_from_slice(&text.as_bytes()[..end]);
        Ok(())
    }

    /// Pack a value according to the signal's type class
    pub fn pack(&self, data: &mut [u8], value: &SignalValue) -> Result<()> {
        match (self.type_class, value) {
            (TypeClass::String, SignalValue::Text(text)) => self.pack_str(data, text),
            (TypeClass::String, _) | (_, SignalValue::Text(_)) => Err(self.mismatch()),
            (TypeClass::Enum, SignalValue::Choice { raw, .. }) => self.pack_raw(data, *raw),
            (TypeClass::Boolean, SignalValue::Boolean(flag)) => {
                self.pack_raw(data, RawValue::Unsigned(*flag as u64))
            }
            (_, SignalValue::Choice { .. }) => Err(self.mismatch()),
            (_, SignalValue::Float(physical)) => self.pack_physical(data, *physical),
            (_, SignalValue::Boolean(flag)) => {
                self.pack_physical(data, if *flag { 1.0 } else { 0.0 })
            }
        }
    }

    /// Extract the raw value, sign-extended for signed signals
    pub fn unpack_raw(&self, data: &[u8]) -> Result<RawValue> {
        self.check_buffer(data)?;
        let bits = self.layout.extract(data);
        Ok(self.backing.raw_from_bits(self.signal.length, bits))
    }

    /// Read a string signal up to the first terminator byte
    pub fn unpack_str(&self, data: &[u8]) -> Result<String> {
        if self.type_class != TypeClass::String {
            return Err(self.mismatch());
        }
        self.check_buffer(data)?;

        let bytes: Vec<u8> = data[self.byte_span()]
            .iter()
            .copied()
            .take_while(|b| !self.string_terminators.contains(b))
            .collect();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Unpack a value according to the signal's type class
    pub fn unpack(&self, data: &[u8]) -> Result<SignalValue> {
        Ok(self.unpack_signal(data)?.value)
    }

    /// Unpack into a named, unit-carrying decoded signal
    pub fn unpack_signal(&self, data: &[u8]) -> Result<DecodedSignal> {
        let (value, raw) = match self.type_class {
            TypeClass::String => (SignalValue::Text(self.unpack_str(data)?), None),
            class => {
                let raw = self.unpack_raw(data)?;
                let value = match class {
                    TypeClass::Boolean => SignalValue::Boolean(raw.as_f64() != 0.0),
                    TypeClass::Enum => SignalValue::Choice {
                        raw,
                        name: self.choice_name(raw),
                    },
                    _ => SignalValue::Float(self.decode(raw)),
                };
                (value, Some(raw))
            }
        };

        Ok(DecodedSignal {
            name: self.signal.name.clone(),
            value,
            unit: self.signal.unit.clone(),
            raw,
        })
    }

    /// Zero the signal's bits
    pub fn clear(&self, data: &mut [u8]) -> Result<()> {
        self.check_buffer(data)?;
        match self.type_class {
            TypeClass::String => data[self.byte_span()].fill(0),
            _ => self.layout.clear(data),
        }
        Ok(())
    }
}
