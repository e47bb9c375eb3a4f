//! J1939 identifier fields
//!
//! A 29-bit J1939 identifier packs priority, data page, PDU format, PDU
//! specific and source address. PDU formats below 240 are peer-to-peer
//! (PDU1, PDU specific is a destination address); the rest are broadcast
//! (PDU2, PDU specific is the group extension and part of the PGN).

use std::fmt;

pub const PRIORITY_MASK: u32 = 0x1C00_0000;
pub const RESERVED_MASK: u32 = 0x0200_0000;
pub const DATA_PAGE_MASK: u32 = 0x0100_0000;
pub const PDU_FORMAT_MASK: u32 = 0x00FF_0000;
pub const PDU_SPECIFIC_MASK: u32 = 0x0000_FF00;
pub const SOURCE_ADDRESS_MASK: u32 = 0x0000_00FF;

/// First PDU format value of the broadcast (PDU2) range
pub const PDU2_THRESHOLD: u8 = 240;

/// Decomposed J1939 identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct J1939Id {
    pub priority: u8,
    pub reserved: u8,
    pub data_page: u8,
    pub pdu_format: u8,
    pub pdu_specific: u8,
    pub source_address: u8,
}

impl J1939Id {
    /// Split a 29-bit identifier into its fields
    pub fn from_raw(id: u32) -> Self {
        Self {
            priority: ((id & PRIORITY_MASK) >> 26) as u8,
            reserved: ((id & RESERVED_MASK) >> 25) as u8,
            data_page: ((id & DATA_PAGE_MASK) >> 24) as u8,
            pdu_format: ((id & PDU_FORMAT_MASK) >> 16) as u8,
            pdu_specific: ((id & PDU_SPECIFIC_MASK) >> 8) as u8,
            source_address: (id & SOURCE_ADDRESS_MASK) as u8,
        }
    }

    /// Peer-to-peer message addressed to `pdu_specific`
    pub fn is_pdu1(&self) -> bool {
        self.pdu_format < PDU2_THRESHOLD
    }

    /// PDU specific byte when it extends the PGN, 0 for PDU1
    pub fn group_extension(&self) -> u8 {
        if self.is_pdu1() {
            0
        } else {
            self.pdu_specific
        }
    }

    /// Destination address of a PDU1 message
    pub fn destination_address(&self) -> Option<u8> {
        self.is_pdu1().then_some(self.pdu_specific)
    }

    /// Parameter group number
    pub fn pgn(&self) -> u32 {
        self.group_extension() as u32
            | (self.pdu_format as u32) << 8
            | (self.data_page as u32) << 16
            | (self.reserved as u32) << 17
    }
}

impl fmt::Display for J1939Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PGN {:#06X} priority {} SA {:#04X}",
            self.pgn(),
            self.priority,
            self.source_address
        )
    }
}

/// Priority bits of a 29-bit identifier
pub fn priority(id: u32) -> u8 {
    J1939Id::from_raw(id).priority
}

/// PGN of a 29-bit identifier
pub fn pgn(id: u32) -> u32 {
    J1939Id::from_raw(id).pgn()
}
