// This file is part of wersi-tools.
// Copyright (C) 2017 Jeffrey Sharp
//
// wersi-tools is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published
// by the Free Software Foundation, either version 3 of the License,
// or (at your option) any later version.
//
// wersi-tools is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with wersi-tools.  If not, see <http://www.gnu.org/licenses/>.

use std::fmt;

use super::error::ParseError;
use super::error::ParseError::*;

/// Count of payload bytes the instrument may omit from a complete response.
///
/// MK1 firmware reliably sends one byte fewer than the length it declares.
pub const TOLERATED_SHORTFALL: usize = 1;

/// Block types stored by the instrument.
#[repr(u8)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum BlockId {
    /// Instrument Control Block
    Icb     = b'i',
    /// VCF parameters: envelope, Q, frequency
    Vcf     = b'v',
    /// Frequency envelope parameters
    Freq    = b'f',
    /// Amplitude envelope parameters
    Ampl    = b'a',
    /// Wavetable for fixed formant voice
    FixWave = b'q',
    /// Wavetable for relative formant voice
    RelWave = b'w',
}

/// Operations that occupy the block identifier field of a request.
#[repr(u8)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum Command {
    /// Requests the block named by the single data byte.
    Read             = b'r',
    /// Switches the active control key to the single data byte (0-3).
    SelectControlKey = b's',
}

/// How a block's address relates to the Wersi pointer that refers to it.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Addressing {
    /// Address is the pointer itself.
    Pointer,
    /// Address is the pointer plus one; address 0 is NULL.
    PointerPlusOne,
}

impl fmt::Display for Addressing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match *self {
            Addressing::Pointer        => "address = pointer",
            Addressing::PointerPlusOne => "address = pointer + 1, 0 = NULL",
        })
    }
}

/// A row of the block catalog.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct CatalogEntry {
    pub id:          BlockId,
    pub name:        &'static str,
    pub description: &'static str,
    pub size:        usize,
    pub addressing:  Addressing,
}

static CATALOG: [CatalogEntry; 6] = [
    CatalogEntry {
        id: BlockId::Icb,     name: "ICB",     size:  16, addressing: Addressing::PointerPlusOne,
        description: "Instrument Control Block",
    },
    CatalogEntry {
        id: BlockId::Vcf,     name: "VCF",     size:  10, addressing: Addressing::Pointer,
        description: "VCF parameters: envelope, Q, frequency",
    },
    CatalogEntry {
        id: BlockId::Freq,    name: "FREQ",    size:  32, addressing: Addressing::Pointer,
        description: "Frequency envelope parameters",
    },
    CatalogEntry {
        id: BlockId::Ampl,    name: "AMPL",    size:  44, addressing: Addressing::Pointer,
        description: "Amplitude envelope parameters",
    },
    CatalogEntry {
        id: BlockId::FixWave, name: "FIXWAVE", size: 212, addressing: Addressing::Pointer,
        description: "Wavetable for fixed formant voice",
    },
    CatalogEntry {
        id: BlockId::RelWave, name: "RELWAVE", size: 178, addressing: Addressing::Pointer,
        description: "Wavetable for relative formant voice",
    },
];

/// Returns the table of known block types.
pub fn catalog() -> &'static [CatalogEntry] {
    &CATALOG
}

impl BlockId {
    pub const ALL: [BlockId; 6] = [
        BlockId::Icb, BlockId::Vcf, BlockId::Freq,
        BlockId::Ampl, BlockId::FixWave, BlockId::RelWave,
    ];

    /// Gets the block type with the given identifier byte, if any.
    pub fn from_u8(b: u8) -> Option<Self> {
        Self::ALL.iter().cloned().find(|id| *id as u8 == b)
    }

    /// Gets the catalog entry for the block type.
    pub fn entry(self) -> &'static CatalogEntry {
        let index = match self {
            BlockId::Icb     => 0,
            BlockId::Vcf     => 1,
            BlockId::Freq    => 2,
            BlockId::Ampl    => 3,
            BlockId::FixWave => 4,
            BlockId::RelWave => 5,
        };
        &CATALOG[index]
    }

    /// Gets the canonical payload size of the block type, in bytes.
    #[inline]
    pub fn size(self) -> usize {
        self.entry().size
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.entry().name
    }
}

impl TryFrom<u8> for BlockId {
    type Error = u8;

    fn try_from(b: u8) -> Result<Self, u8> {
        Self::from_u8(b).ok_or(b)
    }
}

impl From<BlockId> for u8 {
    #[inline]
    fn from(id: BlockId) -> u8 {
        id as u8
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An 8-bit reference to a storage location in the instrument.
///
/// ```text
/// 76543210
/// CRPPPPPP
/// ```
///
/// * `P`: memory location, 0-63
/// * `R`: 0 = ROM area, 1 = RAM area
/// * `C`: 0 = on the instrument, 1 = on a cartridge
///
/// The codec never inspects these bits; this type exists for display.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct WersiPointer(pub u8);

impl WersiPointer {
    const CARTRIDGE_BIT: u8 = 0b_1000_0000;
    const RAM_BIT:       u8 = 0b_0100_0000;
    const LOCATION_MASK: u8 = 0b_0011_1111;

    #[inline]
    pub fn is_cartridge(self) -> bool {
        self.0 & Self::CARTRIDGE_BIT != 0
    }

    #[inline]
    pub fn is_ram(self) -> bool {
        self.0 & Self::RAM_BIT != 0
    }

    #[inline]
    pub fn location(self) -> u8 {
        self.0 & Self::LOCATION_MASK
    }
}

impl From<u8> for WersiPointer {
    fn from(b: u8) -> Self {
        WersiPointer(b)
    }
}

impl fmt::Display for WersiPointer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "{} {} location {}",
            if self.is_cartridge() { "cartridge" } else { "internal" },
            if self.is_ram()       { "RAM"       } else { "ROM"      },
            self.location(),
        )
    }
}

/// A block received from the instrument.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DecodedBlock {
    /// Block identifier byte, as received.
    pub identifier: u8,

    /// Block address.
    pub address: u8,

    /// Payload length claimed by the sender.
    pub declared_len: u8,

    /// Payload, as received.
    pub data: Vec<u8>,

    /// Whether `data` is long enough to be accepted.
    pub complete: bool,

    // Shortfall allowed when `complete` was computed.
    shortfall: usize,
}

impl DecodedBlock {
    pub(crate) fn new(
        identifier:   u8,
        address:      u8,
        declared_len: u8,
        data:         Vec<u8>,
        shortfall:    usize,
    ) -> Self {
        let complete = is_complete(data.len(), declared_len as usize, shortfall);
        Self { identifier, address, declared_len, data, complete, shortfall }
    }

    /// Gets the catalog block type of the block, if it is a known type.
    pub fn block_id(&self) -> Option<BlockId> {
        BlockId::from_u8(self.identifier)
    }

    /// Gets the block address as a Wersi pointer.
    pub fn pointer(&self) -> WersiPointer {
        WersiPointer(self.address)
    }

    /// Checks the declared length against the catalog size of the block type.
    /// Returns `None` if the block type is unknown.
    pub fn matches_catalog(&self) -> Option<bool> {
        self.block_id().map(|id| id.size() == self.declared_len as usize)
    }

    /// Minimum payload length that counts as complete.
    pub fn expected_len(&self) -> usize {
        (self.declared_len as usize).saturating_sub(self.shortfall)
    }

    /// Returns the block if complete, or `TruncatedMessage` otherwise.
    pub fn require_complete(self) -> Result<Self, ParseError> {
        if self.complete {
            Ok(self)
        } else {
            Err(TruncatedMessage {
                actual:   self.data.len(),
                expected: self.expected_len(),
            })
        }
    }
}

/// Applies the truncation-tolerance rule: a payload of `actual` bytes is
/// complete if it falls short of `declared` by at most `shortfall` bytes.
#[inline]
pub fn is_complete(actual: usize, declared: usize, shortfall: usize) -> bool {
    actual.saturating_add(shortfall) >= declared
}
