//! Bit layout of a signal inside a frame buffer
//!
//! A signal's bits are split into byte-confined segments once, and the same
//! segment list drives both packing and unpacking. Each segment carries a
//! mask over the byte and a shift between the byte-local bits and their place
//! in the field value; reading the list in the unpack orientation flips every
//! shift direction, so the two operations are mirror images by construction.

use crate::signals::{ByteOrder, SignalDefinition};
use std::ops::Range;

/// Direction of a segment shift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDirection {
    Left,
    Right,
}

impl ShiftDirection {
    pub fn inverted(self) -> Self {
        match self {
            ShiftDirection::Left => ShiftDirection::Right,
            ShiftDirection::Right => ShiftDirection::Left,
        }
    }
}

/// Which way a segment list is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Field value -> buffer byte
    Pack,
    /// Buffer byte -> field value
    Unpack,
}

/// One contiguous run of a signal's bits within a single byte of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub byte_index: usize,
    /// Bit distance between the byte-local bits and the field position
    pub shift: u8,
    pub direction: ShiftDirection,
    /// Bits of `data[byte_index]` owned by the signal
    pub mask: u8,
}

impl Segment {
    /// The same segment read in the opposite orientation
    pub fn inverted(self) -> Self {
        Self {
            direction: self.direction.inverted(),
            ..self
        }
    }

    /// Byte-local bits of a field value (pack orientation)
    pub fn pack(&self, value: u64) -> u8 {
        let moved = match self.direction {
            ShiftDirection::Left => value << self.shift,
            ShiftDirection::Right => value >> self.shift,
        };
        (moved as u8) & self.mask
    }

    /// Field bits carried by a buffer byte (unpack orientation)
    pub fn unpack(&self, byte: u8) -> u64 {
        let bits = (byte & self.mask) as u64;
        match self.direction {
            ShiftDirection::Left => bits << self.shift,
            ShiftDirection::Right => bits >> self.shift,
        }
    }
}

/// Precomputed mapping from a signal's bit positions to frame data bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitLayout {
    start_bit: u16,
    length: u16,
    byte_order: ByteOrder,
    /// Segments in pack orientation, first byte first
    segments: Vec<Segment>,
}

impl BitLayout {
    /// Split a field into byte segments.
    ///
    /// Big-endian fields start at their MSB and walk down through each byte,
    /// continuing at bit 7 of the next byte. Little-endian fields start at
    /// their LSB and walk up, continuing at bit 0 of the next byte.
    pub fn new(start_bit: u16, length: u16, byte_order: ByteOrder) -> Self {
        debug_assert!(length > 0 && length <= 64, "signal length {} outside 1..=64", length);

        let total = length as i32;
        let mut left = total;
        let mut byte_index = (start_bit / 8) as usize;
        let mut pos = (start_bit % 8) as i32;
        let mut segments = Vec::with_capacity(length as usize / 8 + 2);

        while left > 0 {
            // offset > 0: value bits move left into the byte, < 0: right
            let (taken, offset, mask) = match byte_order {
                ByteOrder::BigEndian => {
                    if left >= pos + 1 {
                        let taken = pos + 1;
                        (taken, -(left - taken), low_mask(taken))
                    } else {
                        let offset = pos - left + 1;
                        (left, offset, low_mask(left) << offset)
                    }
                }
                ByteOrder::LittleEndian => {
                    let taken = left.min(8 - pos);
                    (taken, pos - (total - left), low_mask(taken) << pos)
                }
            };

            let direction = if offset < 0 {
                ShiftDirection::Right
            } else {
                ShiftDirection::Left
            };
            segments.push(Segment {
                byte_index,
                shift: offset.unsigned_abs() as u8,
                direction,
                mask,
            });

            left -= taken;
            byte_index += 1;
            pos = match byte_order {
                ByteOrder::BigEndian => 7,
                ByteOrder::LittleEndian => 0,
            };
        }

        Self {
            start_bit,
            length,
            byte_order,
            segments,
        }
    }

    /// Build a layout from a signal definition
    pub fn from_signal(signal: &SignalDefinition) -> Self {
        Self::new(signal.start_bit, signal.length, signal.byte_order)
    }

    pub fn start_bit(&self) -> u16 {
        self.start_bit
    }

    pub fn length(&self) -> u16 {
        self.length
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Segments in pack orientation
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segments read in the given orientation
    pub fn segments_for(&self, orientation: Orientation) -> impl Iterator<Item = Segment> + '_ {
        self.segments.iter().map(move |s| match orientation {
            Orientation::Pack => *s,
            Orientation::Unpack => s.inverted(),
        })
    }

    /// Frame bytes touched by this signal
    pub fn byte_span(&self) -> Range<usize> {
        let first = (self.start_bit / 8) as usize;
        first..first + self.segments.len()
    }

    /// Extract the raw unsigned value from the frame data bytes.
    pub fn extract(&self, data: &[u8]) -> u64 {
        self.segments_for(Orientation::Unpack)
            .fold(0u64, |acc, s| acc | s.unpack(data[s.byte_index]))
    }

    /// Pack a raw unsigned value into the frame data bytes.
    ///
    /// Only the signal's own bits are cleared and rewritten; every other bit
    /// of the touched bytes keeps its value.
    pub fn pack(&self, data: &mut [u8], raw: u64) {
        for s in &self.segments {
            data[s.byte_index] &= !s.mask;
            data[s.byte_index] |= s.pack(raw);
        }
    }

    /// Zero the signal's bits
    pub fn clear(&self, data: &mut [u8]) {
        for s in &self.segments {
            data[s.byte_index] &= !s.mask;
        }
    }
}

fn low_mask(bits: i32) -> u8 {
    ((1u16 << bits) - 1) as u8
}
