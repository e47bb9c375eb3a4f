//! Admissible raw-value interval of a signal
//!
//! The interval is the intersection of the backing type's native range, the
//! range of the field's own bit length, and the declared physical bounds
//! converted to raw units. Sides that coincide with the native range need no
//! comparison; when both do the check is trivially true.

use crate::backing::{field_bounds, BackingType};
use crate::signals::{SignalDefinition, TypeClass};
use crate::types::RawValue;

/// Raw range predicate of a signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawRange {
    /// Enum and string signals: validity is structural, not numeric
    Unchecked,
    Integer {
        min: i128,
        max: i128,
        check_min: bool,
        check_max: bool,
    },
    Float {
        min: f64,
        max: f64,
        check_min: bool,
        check_max: bool,
    },
}

impl RawRange {
    /// Derive the admissible raw interval of a signal
    pub fn for_signal(signal: &SignalDefinition, backing: BackingType, type_class: TypeClass) -> Self {
        if matches!(type_class, TypeClass::Enum | TypeClass::String) {
            return RawRange::Unchecked;
        }

        let (declared_min, declared_max) = declared_raw_bounds(signal);

        match backing.native_bounds() {
            Some((native_min, native_max)) => {
                let (field_min, field_max) = field_bounds(backing.kind, signal.length);
                let min = declared_min
                    .map(RawBound::truncated)
                    .map_or(field_min, |m| m.max(field_min));
                let max = declared_max
                    .map(RawBound::truncated)
                    .map_or(field_max, |m| m.min(field_max));
                RawRange::Integer {
                    min,
                    max,
                    check_min: min > native_min,
                    check_max: max < native_max,
                }
            }
            None => {
                let limit = backing.float_limit();
                let min = declared_min.map_or(-limit, |m| m.value.max(-limit));
                let max = declared_max.map_or(limit, |m| m.value.min(limit));
                RawRange::Float {
                    min,
                    max,
                    check_min: min > -limit,
                    check_max: max < limit,
                }
            }
        }
    }

    /// True when every value of the backing type passes
    pub fn is_trivial(&self) -> bool {
        match self {
            RawRange::Unchecked => true,
            RawRange::Integer {
                check_min,
                check_max,
                ..
            }
            | RawRange::Float {
                check_min,
                check_max,
                ..
            } => !check_min && !check_max,
        }
    }

    /// Closed-interval membership of a raw value already normalized to the
    /// signal's backing type
    pub fn contains(&self, raw: RawValue) -> bool {
        match *self {
            RawRange::Unchecked => true,
            RawRange::Integer {
                min,
                max,
                check_min,
                check_max,
            } => {
                if !check_min && !check_max {
                    return true;
                }
                let Some(value) = raw.as_i128() else {
                    return false;
                };
                (!check_min || value >= min) && (!check_max || value <= max)
            }
            RawRange::Float {
                min,
                max,
                check_min,
                check_max,
            } => {
                if !check_min && !check_max {
                    return true;
                }
                let RawValue::Float(value) = raw else {
                    return false;
                };
                (!check_min || value >= min) && (!check_max || value <= max)
            }
        }
    }

    /// Inclusive integer interval, `None` for unchecked and float ranges
    pub fn interval(&self) -> Option<(i128, i128)> {
        match *self {
            RawRange::Integer { min, max, .. } => Some((min, max)),
            _ => None,
        }
    }
}

/// A declared bound converted to raw units
#[derive(Debug, Clone, Copy)]
struct RawBound {
    value: f64,
    /// Rounding error of the conversion: a few ULPs of its larger operand
    tolerance: f64,
}

impl RawBound {
    /// Integer truncation toward zero.
    ///
    /// Values within conversion rounding error of an integer snap to it
    /// first, so a bound like -2047.9999999999998 stays -2048.
    fn truncated(self) -> i128 {
        let nearest = self.value.round();
        if (self.value - nearest).abs() <= self.tolerance {
            nearest as i128
        } else {
            self.value.trunc() as i128
        }
    }
}

/// Declared physical bounds in raw units, ordered low to high
fn declared_raw_bounds(signal: &SignalDefinition) -> (Option<RawBound>, Option<RawBound>) {
    let to_raw = |bound: f64| {
        let scaled = bound / signal.factor;
        let shift = signal.offset / signal.factor;
        RawBound {
            value: scaled - shift,
            tolerance: scaled.abs().max(shift.abs()).max(1.0) * 4.0 * f64::EPSILON,
        }
    };
    let low = signal.min.map(to_raw);
    let high = signal.max.map(to_raw);

    // A negative factor maps the physical minimum onto the raw maximum
    if signal.factor < 0.0 {
        (high, low)
    } else {
        (low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnitKeywords;
    use crate::signals::{ByteOrder, ValueType};

    fn range_of(signal: &SignalDefinition) -> RawRange {
        RawRange::for_signal(
            signal,
            BackingType::for_signal(signal),
            signal.resolve_type_class(&UnitKeywords::default()),
        )
    }

    #[test]
    fn test_declared_bounds_converted_to_raw() {
        // Temperature: 12-bit signed, factor 0.01, offset 250, [229.52, 270.47]
        let signal = SignalDefinition::new("Temperature", 0, 12, ByteOrder::BigEndian)
            .with_value_type(ValueType::Signed)
            .with_scaling(0.01, 250.0)
            .with_bounds(Some(229.52), Some(270.47));
        let range = range_of(&signal);

        assert_eq!(range.interval(), Some((-2048, 2047)));
        assert!(!range.is_trivial());
        assert!(range.contains(RawValue::Signed(-2048)));
        assert!(range.contains(RawValue::Signed(2047)));
        assert!(!range.contains(RawValue::Signed(2048)));
        assert!(!range.contains(RawValue::Signed(-2049)));
    }

    #[test]
    fn test_min_equal_to_native_needs_no_check() {
        // AverageRadius: 6-bit unsigned, factor 0.1, [0, 5]
        let signal = SignalDefinition::new("AverageRadius", 6, 6, ByteOrder::BigEndian)
            .with_scaling(0.1, 0.0)
            .with_bounds(Some(0.0), Some(5.0));
        match range_of(&signal) {
            RawRange::Integer {
                min,
                max,
                check_min,
                check_max,
            } => {
                assert_eq!((min, max), (0, 50));
                assert!(!check_min);
                assert!(check_max);
            }
            other => panic!("unexpected range {:?}", other),
        }
    }

    #[test]
    fn test_full_width_without_bounds_is_trivial() {
        let signal = SignalDefinition::new("Byte", 0, 8, ByteOrder::LittleEndian);
        let range = range_of(&signal);
        assert!(range.is_trivial());
        assert!(range.contains(RawValue::Unsigned(255)));
    }

    #[test]
    fn test_missing_bounds_default_to_field_width() {
        let signal = SignalDefinition::new("Nibble", 0, 4, ByteOrder::LittleEndian)
            .with_value_type(ValueType::Signed);
        let range = range_of(&signal);
        assert_eq!(range.interval(), Some((-8, 7)));
        assert!(!range.contains(RawValue::Signed(8)));
    }

    #[test]
    fn test_clamps_to_native_bounds() {
        let signal = SignalDefinition::new("Wide", 0, 8, ByteOrder::LittleEndian)
            .with_bounds(Some(-100.0), Some(1000.0));
        let range = range_of(&signal);
        assert_eq!(range.interval(), Some((0, 255)));
        assert!(range.is_trivial());

        let signed = SignalDefinition::new("Wide16", 0, 16, ByteOrder::LittleEndian)
            .with_value_type(ValueType::Signed)
            .with_bounds(Some(-1e9), Some(1e9));
        assert_eq!(range_of(&signed).interval(), Some((-32768, 32767)));
        assert!(range_of(&signed).is_trivial());
    }

    #[test]
    fn test_truncates_toward_zero() {
        let signal = SignalDefinition::new("Frac", 0, 8, ByteOrder::LittleEndian)
            .with_value_type(ValueType::Signed)
            .with_bounds(Some(-10.7), Some(10.7));
        assert_eq!(range_of(&signal).interval(), Some((-10, 10)));
    }

    #[test]
    fn test_large_bound_truncates_instead_of_rounding_up() {
        let signal = SignalDefinition::new("Odometer", 0, 32, ByteOrder::LittleEndian)
            .with_bounds(None, Some(999_999.9995));
        let range = range_of(&signal);
        assert_eq!(range.interval(), Some((0, 999_999)));
        assert!(range.contains(RawValue::Unsigned(999_999)));
        assert!(!range.contains(RawValue::Unsigned(1_000_000)));

        let negative = SignalDefinition::new("Offset", 0, 32, ByteOrder::LittleEndian)
            .with_value_type(ValueType::Signed)
            .with_bounds(Some(-1_999_999.9995), None);
        assert_eq!(range_of(&negative).interval().map(|(min, _)| min), Some(-1_999_999));
    }

    #[test]
    fn test_negative_factor_swaps_bounds() {
        let signal = SignalDefinition::new("Inverted", 0, 8, ByteOrder::LittleEndian)
            .with_value_type(ValueType::Signed)
            .with_scaling(-1.0, 0.0)
            .with_bounds(Some(-5.0), Some(20.0));
        assert_eq!(range_of(&signal).interval(), Some((-20, 5)));
    }

    #[test]
    fn test_enum_and_string_unchecked() {
        let enum_signal = SignalDefinition::new("Mode", 0, 2, ByteOrder::LittleEndian)
            .with_type_class(TypeClass::Enum)
            .with_bounds(Some(0.0), Some(1.0));
        assert_eq!(range_of(&enum_signal), RawRange::Unchecked);

        let text = SignalDefinition::new("Vin", 0, 64, ByteOrder::LittleEndian)
            .with_type_class(TypeClass::String);
        assert!(range_of(&text).contains(RawValue::Unsigned(u64::MAX)));
    }

    #[test]
    fn test_float_bounds_not_truncated() {
        let signal = SignalDefinition::new("Pressure", 0, 32, ByteOrder::LittleEndian)
            .with_value_type(ValueType::Float)
            .with_bounds(Some(-1.5), Some(2.25));
        let range = range_of(&signal);
        assert!(range.contains(RawValue::Float(2.25)));
        assert!(!range.contains(RawValue::Float(2.26)));
        assert!(range.contains(RawValue::Float(-1.5)));
        assert!(range.interval().is_none());

        let open = SignalDefinition::new("Any", 0, 64, ByteOrder::LittleEndian)
            .with_value_type(ValueType::Float);
        assert!(range_of(&open).is_trivial());
    }
}
