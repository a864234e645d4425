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

use crate::sysex::MIDI_SYSEX_END;

use super::*;
use super::block::{BlockId, Command, DecodedBlock, TOLERATED_SHORTFALL};
use super::error::{ParseError, RequestError};
use super::error::ParseError::*;
use super::nibble::{decode_nibbles_at, encode_nibbles, from_nibble_pair, to_field_nibbles};

/// Frames a block message with the given header fields and `data`, appending
/// it to `dst`.
///
/// No check is made that `size` agrees with `data` or with the catalog; read
/// requests, for one, declare a size unrelated to their payload.
pub fn encode_into(identifier: u8, address: u8, size: u8, data: &[u8], dst: &mut Vec<u8>) {
    dst.reserve(FRAME_OVERHEAD + data.len() * 2);

    dst.extend_from_slice(&HEADER);
    dst.extend_from_slice(&to_field_nibbles(BLOCK_ID_BASE,   identifier));
    dst.extend_from_slice(&to_field_nibbles(BLOCK_ADDR_BASE, address));
    dst.extend_from_slice(&to_field_nibbles(BLOCK_SIZE_BASE, size));
    encode_nibbles(data, dst);
    dst.push(MIDI_SYSEX_END);
}

/// Frames a block message with the given header fields and `data`.
pub fn encode(identifier: u8, address: u8, size: u8, data: &[u8]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(FRAME_OVERHEAD + data.len() * 2);
    encode_into(identifier, address, size, data, &mut msg);
    msg
}

/// Frames a request for the instrument to send the `block` at `address`.
pub fn read_request(block: BlockId, address: u8) -> Vec<u8> {
    encode(Command::Read as u8, address, 1, &[block as u8])
}

/// Frames a request to store `data` as the `block` at `address`.
pub fn write_request(block: BlockId, address: u8, data: &[u8]) -> Result<Vec<u8>, RequestError> {
    if data.len() > u8::MAX as usize {
        return Err(RequestError::PayloadTooLong { len: data.len() })
    }
    Ok(encode(block as u8, address, data.len() as u8, data))
}

/// Frames a request to switch the instrument's active control key.
pub fn select_control_key(key: u8) -> Vec<u8> {
    encode(Command::SelectControlKey as u8, 0, 1, &[key])
}

/// Decodes a Wersi MK1 block message.
///
/// The returned block is marked incomplete if its payload is more than one
/// byte short of its declared length; see `DecodedBlock::require_complete`.
pub fn parse(msg: &[u8]) -> Result<DecodedBlock, ParseError> {
    parse_with_tolerance(msg, TOLERATED_SHORTFALL)
}

/// Decodes a Wersi MK1 block message, allowing its payload to fall `shortfall`
/// bytes short of its declared length and still count as complete.
pub fn parse_with_tolerance(msg: &[u8], shortfall: usize) -> Result<DecodedBlock, ParseError> {
    let nibbles = recognize_sysex(msg).ok_or(UnrecognizedHeader)?;

    let identifier   = field(msg, BLOCK_ID_POS)?;
    let address      = field(msg, BLOCK_ADDR_POS)?;
    let declared_len = field(msg, BLOCK_SIZE_POS)?;

    let mut data = Vec::with_capacity(nibbles.len() / 2);
    decode_nibbles_at(nibbles, DATA_POS, &mut data)?;

    Ok(DecodedBlock::new(identifier, address, declared_len, data, shortfall))
}

#[inline]
fn field(msg: &[u8], pos: usize) -> Result<u8, ParseError> {
    from_nibble_pair(msg[pos], msg[pos + 1], pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Pattern bytes that exercise both nibbles
    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 37 + 11) as u8).collect()
    }

    #[test]
    fn encode_icb_request() {
        let msg = encode(b'i', 67, 1, &[b'i']);

        assert_eq!(msg, [
            0xF0, 0x25, 0x01,   // header
            0x79, 0x66,         // 'i'
            0x53, 0x44,         // 67
            0x31, 0x20,         // 1
            0x19, 0x06,         // 'i'
            0xF7,
        ]);
    }

    #[test]
    fn parse_icb_request() {
        let msg = [0xF0, 0x25, 0x01, 0x79, 0x66, 0x53, 0x44, 0x31, 0x20, 0x19, 0x06, 0xF7];

        let block = parse(&msg).unwrap();

        assert_eq!(block.identifier,   0x69);
        assert_eq!(block.address,      67);
        assert_eq!(block.declared_len, 1);
        assert_eq!(block.data,         [0x69]);
        assert!(block.complete);
    }

    #[test]
    fn encode_read_request() {
        let msg = read_request(BlockId::Ampl, 65);

        assert_eq!(msg, [0xF0, 0x25, 0x01, 0x72, 0x67, 0x51, 0x44, 0x31, 0x20, 0x11, 0x06, 0xF7]);
    }

    #[test]
    fn encode_select_control_key() {
        let msg = select_control_key(2);

        assert_eq!(msg, [0xF0, 0x25, 0x01, 0x73, 0x67, 0x50, 0x40, 0x31, 0x20, 0x12, 0x00, 0xF7]);
    }

    #[test]
    fn encode_write_request() {
        let data = [3, 0, 11, 149, 232, 232, 0, 49, 0, 49];

        let msg = write_request(BlockId::Vcf, 64, &data).unwrap();

        assert_eq!(msg.len(), FRAME_OVERHEAD + 20);
        assert_eq!(&msg[3..9], &[0x76, 0x67, 0x50, 0x44, 0x3A, 0x20]);
        assert_eq!(parse(&msg).unwrap().data, data);
    }

    #[test]
    fn encode_write_request_too_long() {
        let data = [0; 256];

        let result = write_request(BlockId::FixWave, 0, &data);

        assert_eq!(result, Err(RequestError::PayloadTooLong { len: 256 }));
    }

    #[test]
    fn encode_into_appends() {
        let mut msg = vec![0xAA];

        encode_into(b'f', 1, 0, &[], &mut msg);

        assert_eq!(msg, [0xAA, 0xF0, 0x25, 0x01, 0x76, 0x66, 0x51, 0x40, 0x30, 0x20, 0xF7]);
    }

    #[test]
    fn round_trip_catalog() {
        for id in BlockId::ALL.iter() {
            let data = pattern(id.size());

            for address in 0..=255u8 {
                let msg   = encode(*id as u8, address, data.len() as u8, &data);
                let block = parse(&msg).unwrap();

                assert_eq!(block.block_id(),     Some(*id),  "{} at {}", id, address);
                assert_eq!(block.address,        address,    "{} at {}", id, address);
                assert_eq!(block.data,           data,       "{} at {}", id, address);
                assert_eq!(block.complete,       true,       "{} at {}", id, address);
                assert_eq!(block.matches_catalog(), Some(true));
            }
        }
    }

    #[test]
    fn parse_short_by_one() {
        // MK1 firmware omits the final byte of its responses.
        let mut msg = encode(b'i', 67, 16, &pattern(15));

        let block = parse(&msg).unwrap();

        assert_eq!(block.data.len(), 15);
        assert!(block.complete);

        // Also accepted without the end byte
        msg.pop();
        assert!(parse(&msg).unwrap().complete);
    }

    #[test]
    fn parse_short_by_two() {
        let msg = encode(b'i', 67, 16, &pattern(14));

        let block = parse(&msg).unwrap();

        assert!(!block.complete);
        assert_eq!(block.require_complete(), Err(TruncatedMessage { actual: 14, expected: 15 }));
    }

    #[test]
    fn parse_strict_tolerance() {
        let msg = encode(b'i', 67, 16, &pattern(15));

        let block = parse_with_tolerance(&msg, 0).unwrap();

        assert!(!block.complete);
        assert_eq!(block.require_complete(), Err(TruncatedMessage { actual: 15, expected: 16 }));
    }

    #[test]
    fn parse_unlimited_tolerance() {
        let msg = encode(b'i', 67, 16, &[1, 2, 3]);

        let block = parse_with_tolerance(&msg, usize::MAX).unwrap();

        assert!(block.complete);
        assert_eq!(block.expected_len(), 0);
        assert_eq!(block.require_complete().map(|b| b.data), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn parse_empty_payload() {
        let msg = encode(b'v', 0, 0, &[]);

        let block = parse(&msg).unwrap();

        assert!(block.data.is_empty());
        assert!(block.complete);
    }

    #[test]
    fn parse_bad_prefix() {
        let mut msg = encode(b'i', 67, 1, &[b'i']);
        msg[1] = 0x42;

        assert_eq!(parse(&msg), Err(UnrecognizedHeader));
    }

    #[test]
    fn parse_underflow() {
        let msg = [0xF0, 0x25, 0x01, 0x79, 0x66, 0x53, 0x44, 0x31, 0x20];

        assert_eq!(parse(&msg),      Err(UnrecognizedHeader));
        assert_eq!(parse(&msg[..3]), Err(UnrecognizedHeader));
        assert_eq!(parse(&[]),       Err(UnrecognizedHeader));
    }

    #[test]
    fn parse_odd_nibble_count() {
        // Partial read ending between the nibbles of a pair
        let msg = [0xF0, 0x25, 0x01, 0x79, 0x66, 0x53, 0x44, 0x31, 0x20, 0x19, 0x06, 0x1A];

        assert_eq!(parse(&msg), Err(OddNibbleCount { len: 3 }));
    }

    #[test]
    fn parse_invalid_field() {
        let mut msg = encode(b'i', 67, 1, &[b'i']);
        msg[6] = 0x54;

        assert_eq!(parse(&msg), Err(InvalidNibblePair { offset: 5, first: 0x53, second: 0x54 }));
    }

    #[test]
    fn parse_invalid_payload() {
        let mut msg = encode(b'i', 67, 2, &[0x12, 0x34]);
        msg[11] = 0x04;

        assert_eq!(parse(&msg), Err(InvalidNibblePair { offset: 11, first: 0x04, second: 0x03 }));
    }
}
