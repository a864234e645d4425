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

//! Block exchanges against a simulated MK1 instrument.

use std::collections::HashMap;
use std::time::Duration;

use wersi::io::{exchange, Transport, TransportError};
use wersi::wersi::block::{BlockId, Command};
use wersi::wersi::message::{encode, read_request, write_request};
use wersi::{parse, Error, ParseError};

const WINDOW: Duration = Duration::from_millis(20);

/// Stores written blocks and answers read requests the way MK1 firmware
/// does: one payload byte short, in chunks, with active sensing mixed in.
struct Instrument {
    blocks:  HashMap<(u8, u8), Vec<u8>>,
    pending: Vec<Vec<u8>>,
    drop:    usize,
    /// Stops each response after this many bytes, before its F7.
    cutoff:  Option<usize>,
}

impl Instrument {
    fn new() -> Self {
        Self { blocks: HashMap::new(), pending: vec![], drop: 1, cutoff: None }
    }
}

impl Transport for Instrument {
    fn send(&mut self, msg: &[u8]) -> Result<(), TransportError> {
        let request = parse(msg).expect("instrument received malformed request");

        if request.identifier == Command::Read as u8 {
            let id   = request.data[0];
            let data = match self.blocks.get(&(id, request.address)) {
                Some(data) => data.clone(),
                None       => return Ok(()),
            };
            let sent     = &data[..data.len().saturating_sub(self.drop)];
            let mut response = encode(id, request.address, data.len() as u8, sent);
            if let Some(n) = self.cutoff {
                response.truncate(n);
            }
            for chunk in response.chunks(5) {
                self.pending.push(chunk.to_vec());
                self.pending.push(vec![0xFE]);
            }
        } else {
            self.blocks.insert((request.identifier, request.address), request.data);
        }

        Ok(())
    }

    fn poll(&mut self, dst: &mut Vec<u8>) -> Result<usize, TransportError> {
        if self.pending.is_empty() {
            return Ok(0)
        }
        let chunk = self.pending.remove(0);
        dst.extend_from_slice(&chunk);
        Ok(chunk.len())
    }
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}

#[test]
fn write_then_read_every_block_type() {
    let mut instrument = Instrument::new();

    for id in BlockId::ALL.iter() {
        let data  = pattern(id.size());
        let write = write_request(*id, 65, &data).unwrap();

        assert!(exchange(&mut instrument, &write, WINDOW).unwrap().is_none());

        let block = exchange(&mut instrument, &read_request(*id, 65), WINDOW)
            .unwrap()
            .expect("no response")
            .require_complete()
            .unwrap();

        assert_eq!(block.block_id(),          Some(*id));
        assert_eq!(block.address,             65);
        assert_eq!(block.declared_len as usize, id.size());
        assert_eq!(block.data,                &data[..data.len() - 1]);
        assert_eq!(block.matches_catalog(),   Some(true));
    }
}

#[test]
fn read_missing_block() {
    let mut instrument = Instrument::new();

    let result = exchange(&mut instrument, &read_request(BlockId::Icb, 67), WINDOW).unwrap();

    assert!(result.is_none());
}

#[test]
fn read_truncated_block() {
    let mut instrument = Instrument::new();
    instrument.drop = 2;
    instrument.blocks.insert((b'a', 65), pattern(44));

    let block = exchange(&mut instrument, &read_request(BlockId::Ampl, 65), WINDOW)
        .unwrap()
        .unwrap();

    assert!(!block.complete);
    assert_eq!(
        block.require_complete(),
        Err(ParseError::TruncatedMessage { actual: 42, expected: 43 })
    );
}

/// The receive window closes partway through the payload, between pairs.
#[test]
fn read_interrupted_between_pairs() {
    let mut instrument = Instrument::new();
    instrument.cutoff = Some(9 + 2 * 10);
    instrument.blocks.insert((b'i', 67), pattern(16));

    let block = exchange(&mut instrument, &read_request(BlockId::Icb, 67), WINDOW)
        .unwrap()
        .unwrap();

    assert!(!block.complete);
    assert_eq!(block.data, &pattern(16)[..10]);
    assert_eq!(
        block.require_complete(),
        Err(ParseError::TruncatedMessage { actual: 10, expected: 15 })
    );
}

/// The receive window closes between the two nibbles of a pair.
#[test]
fn read_interrupted_within_pair() {
    let mut instrument = Instrument::new();
    instrument.cutoff = Some(9 + 2 * 10 + 1);
    instrument.blocks.insert((b'i', 67), pattern(16));

    let result = exchange(&mut instrument, &read_request(BlockId::Icb, 67), WINDOW);

    match result {
        Err(Error::Parse(ParseError::OddNibbleCount { len: 21 })) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn read_garbled_block() {
    struct Garbled;

    impl Transport for Garbled {
        fn send(&mut self, _: &[u8]) -> Result<(), TransportError> {
            Ok(())
        }

        fn poll(&mut self, dst: &mut Vec<u8>) -> Result<usize, TransportError> {
            if !dst.is_empty() {
                return Ok(0)
            }
            // Both nibbles of the only data pair carry the low tag
            dst.extend_from_slice(&[0xF0, 0x25, 0x01, 0x79, 0x66, 0x53, 0x44, 0x31, 0x20, 0x19, 0x16, 0xF7]);
            Ok(dst.len())
        }
    }

    let result = exchange(&mut Garbled, &read_request(BlockId::Icb, 67), WINDOW);

    match result {
        Err(Error::Parse(ParseError::InvalidNibblePair { offset: 9, first: 0x19, second: 0x16 })) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}
