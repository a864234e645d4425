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

use super::error::ParseError;
use super::error::ParseError::*;

// Nibble tags
pub const LO: u8 = 1 << 4; // Nibble holds bits 3..0 of its byte
pub const HI: u8 = 0 << 4; // Nibble holds bits 7..4 of its byte

const TAG_MASK:    u8 = 0x10;
const NIBBLE_MASK: u8 = 0x0F;

/// Splits a byte into its tagged nibbles, low nibble first.
#[inline]
pub fn to_nibbles(b: u8) -> [u8; 2] {
    to_field_nibbles(0, b)
}

/// Splits a byte into its tagged nibbles, low nibble first, with the given
/// field `base` OR'd into each.
#[inline]
pub fn to_field_nibbles(base: u8, b: u8) -> [u8; 2] {
    //          field base
    //          | tag
    //          | | nibble
    //          | | |
    //   0b_x_xx_x_xxxx
    // lo: 0_bb_1_3210
    // hi: 0_bb_0_7654
    [
        base | LO | (b & NIBBLE_MASK),
        base | HI | (b >> 4),
    ]
}

/// Encodes a sequence of bytes into a sequence of tagged nibbles.
pub fn encode_nibbles(src: &[u8], dst: &mut Vec<u8>) {
    dst.reserve(src.len() * 2);
    for &b in src {
        dst.extend_from_slice(&to_nibbles(b));
    }
}

/// Reassembles one byte from a pair of tagged nibbles.
///
/// The pair may arrive in either order, but exactly one of `a` and `b` must
/// carry the `LO` tag.  Bits above the tag (a field base) are ignored.
/// `offset` is the position of `a` in its message, used for error reporting.
#[inline]
pub fn from_nibble_pair(a: u8, b: u8, offset: usize) -> Result<u8, ParseError> {
    let (lo, hi) = match (a & TAG_MASK, b & TAG_MASK) {
        (LO, HI) => (a, b),
        (HI, LO) => (b, a),
        _        => return Err(InvalidNibblePair { offset, first: a, second: b }),
    };

    Ok((lo & NIBBLE_MASK) | (hi & NIBBLE_MASK) << 4)
}

/// Decodes a sequence of tagged nibbles into a sequence of bytes.
///
/// Fails if `src` has an odd length or contains a pair in which both nibbles
/// carry the same tag.  On failure, `dst` may hold bytes decoded before the
/// offending pair.
pub fn decode_nibbles(src: &[u8], dst: &mut Vec<u8>) -> Result<(), ParseError> {
    decode_nibbles_at(src, 0, dst)
}

/// Like `decode_nibbles`, but reports error offsets relative to `base`.
pub(crate) fn decode_nibbles_at(src: &[u8], base: usize, dst: &mut Vec<u8>)
    -> Result<(), ParseError>
{
    if src.len() % 2 != 0 {
        return Err(OddNibbleCount { len: src.len() })
    }

    dst.reserve(src.len() / 2);

    for (i, pair) in src.chunks_exact(2).enumerate() {
        dst.push(from_nibble_pair(pair[0], pair[1], base + i * 2)?);
    }

    Ok(())
}
