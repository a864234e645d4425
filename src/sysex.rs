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

// MIDI byte ranges
pub const MIDI_DATA_MAX:    u8 = 0x7F; // Data bytes are 0x00-0x7F
pub const MIDI_STATUS_MIN:  u8 = 0x80; // Status bytes are 0x80-0xFF
pub const MIDI_SYSEX_START: u8 = 0xF0; // \_ System exlusive messages
pub const MIDI_SYSEX_END:   u8 = 0xF7; // /
pub const MIDI_SYSRT_MIN:   u8 = 0xF8; // System real-time messages are 0xF8-0xFF

/// Returns `true` if `b` is a MIDI system real-time byte.
///
/// Real-time bytes may appear anywhere in a MIDI stream, including within a
/// System Exclusive message, without interrupting it.
#[inline]
pub fn is_realtime(b: u8) -> bool {
    b >= MIDI_SYSRT_MIN
}

/// Returns `true` if `b` is a MIDI data byte.
#[inline]
pub fn is_data(b: u8) -> bool {
    b <= MIDI_DATA_MAX
}

/// Copies `src`, omitting system real-time bytes.
pub fn strip_realtime(src: &[u8]) -> Vec<u8> {
    src.iter().cloned().filter(|&b| !is_realtime(b)).collect()
}

/// Locates the first System Exclusive message in `src`, which must be free of
/// real-time bytes.  Returns the count of bytes preceding the message and the
/// message itself, including its start and end bytes.
///
/// A message interrupted by another status byte, or by the end of `src`, is
/// returned without an end byte.
pub fn first_message(src: &[u8]) -> Option<(usize, &[u8])> {
    let start = src.iter().position(|&b| b == MIDI_SYSEX_START)?;
    let body  = &src[start + 1..];

    let end = match body.iter().position(|&b| !is_data(b)) {
        Some(i) if body[i] == MIDI_SYSEX_END => start + 1 + i + 1,
        Some(i)                              => start + 1 + i,
        None                                 => src.len(),
    };

    Some((start, &src[start..end]))
}

/// Formats bytes as space-separated hexadecimal.
#[derive(Clone, Copy, Debug)]
pub struct Hex<'a>(pub &'a [u8]);

impl<'a> fmt::Display for Hex<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut sep = "";
        for b in self.0 {
            write!(f, "{}{:02X}", sep, b)?;
            sep = " ";
        }
        Ok(())
    }
}
