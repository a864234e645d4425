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

//! Wersi MK1 block protocol.
//!
//! A Wersi MK1 System Exclusive message looks like this:
//!
//! ```text
//! 11110000   MIDI SysEx start
//! 00100101   Wersi identifier
//! 00000001   MK1 identifier
//! 011NXXXX   Block identifier (lo, hi)
//! 010NXXXX   Block address    (lo, hi)
//! 001NXXXX   Block length     (lo, hi)
//! 000NXXXX   Data             (lo, hi) ...
//! 11110111   MIDI SysEx end
//! ```
//!
//! where `N` is set on the nibble holding the low four bits of a byte.

pub mod block;
pub mod error;
pub mod message;
pub mod nibble;

use crate::sysex::{MIDI_SYSEX_END, MIDI_SYSEX_START};

// Manufacturer/model identifier bytes
pub const WERSI: u8 = 0x25;
pub const MK1:   u8 = 0x01;

// Start-of-message prefix
pub static HEADER: [u8; 3] = [MIDI_SYSEX_START, WERSI, MK1];

// Position constants
const BLOCK_ID_POS:   usize = 3; // Position of block identifier nibbles
const BLOCK_ADDR_POS: usize = 5; // Position of block address nibbles
const BLOCK_SIZE_POS: usize = 7; // Position of block size nibbles
const DATA_POS:       usize = 9; // Start position of data nibbles

// Field bases, OR'd into both nibbles of a header field
const BLOCK_ID_BASE:   u8 = 0x60;
const BLOCK_ADDR_BASE: u8 = 0x40;
const BLOCK_SIZE_BASE: u8 = 0x20;

/// Bytes in a message beyond its data nibbles.
pub const FRAME_OVERHEAD: usize = DATA_POS + 1;

/// Returns the data nibbles of a Wersi MK1 message, or `None` if `msg` does
/// not begin with a complete Wersi MK1 header.
///
/// A trailing SysEx end byte, if present, is not part of the data.
pub fn recognize_sysex(msg: &[u8]) -> Option<&[u8]> {
    if !msg.starts_with(&HEADER) || msg.len() <= DATA_POS {
        return None
    }

    let data = &msg[DATA_POS..];
    match data.split_last() {
        Some((&MIDI_SYSEX_END, rest)) => Some(rest),
        _                             => Some(data),
    }
}
