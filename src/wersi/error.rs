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

use thiserror::Error;

/// Error conditions reportable during message parsing.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum ParseError {
    #[error(
        "Invalid nibble pair at offset {offset}: {first:#04X} {second:#04X}. \
         Exactly one byte of a pair must carry the low-nibble tag."
    )]
    InvalidNibblePair { offset: usize, first: u8, second: u8 },

    #[error(
        "Invalid nibble count: {len}. \
         Each byte is transmitted as a pair of nibbles."
    )]
    OddNibbleCount    { len: usize                           },

    #[error("Unrecognized message: not a Wersi MK1 System Exclusive block.")]
    UnrecognizedHeader,

    #[error(
        "Received message was too short (got {actual}, expected {expected}). \
         Try again."
    )]
    TruncatedMessage  { actual: usize, expected: usize       },
}

/// Error conditions reportable during request framing.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum RequestError {
    #[error(
        "Payload too long: {len} byte(s). \
         A block declares at most 255 bytes."
    )]
    PayloadTooLong { len: usize },
}
