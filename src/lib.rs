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

//! Block transfer with Wersi MK1 synthesizers over MIDI System Exclusive.
//!
//! The [`wersi`] module holds the block protocol codec: nibble packing,
//! request framing, and response parsing.  [`sysex`] isolates messages from
//! a raw MIDI byte stream, and [`io`] moves them over a port.

pub mod error;
pub mod io;
pub mod sysex;
pub mod wersi;

pub use error::{Error, Result};
pub use wersi::block::{BlockId, DecodedBlock, WersiPointer};
pub use wersi::error::{ParseError, RequestError};
pub use wersi::message::{encode, parse};
