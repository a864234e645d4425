// This file is part of wersi-tools.
// Copyright (C) 2016 Jeffrey Sharp
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

//! Moving System Exclusive messages to and from the instrument.

use std::convert::Infallible;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::io::ErrorKind::Interrupted;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::sysex::{first_message, strip_realtime, Hex};
use crate::wersi::block::DecodedBlock;
use crate::wersi::error::ParseError;
use crate::wersi::message::parse;

/// How long to collect a response before treating it as finished.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(500);

// Pause between polls that return nothing
const POLL_INTERVAL: Duration = Duration::from_millis(1);

// Where ALSA places raw MIDI device nodes
const RAW_MIDI_DIR:    &str = "/dev/snd";
const RAW_MIDI_PREFIX: &str = "midiC";

/// Error conditions reportable by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("No MIDI port {index}. {available} port(s) available.")]
    NoSuchPort { index: usize, available: usize },

    #[error("MIDI input closed.")]
    Disconnected,
}

/// A bidirectional MIDI connection.
pub trait Transport {
    /// Sends `msg` as one System Exclusive message.
    fn send(&mut self, msg: &[u8]) -> std::result::Result<(), TransportError>;

    /// Appends any bytes received since the previous poll to `dst`, without
    /// blocking.  Returns the count of bytes appended, which can be zero.
    fn poll(&mut self, dst: &mut Vec<u8>) -> std::result::Result<usize, TransportError>;
}

impl<'a, T: Transport + ?Sized> Transport for &'a mut T {
    fn send(&mut self, msg: &[u8]) -> std::result::Result<(), TransportError> {
        (**self).send(msg)
    }

    fn poll(&mut self, dst: &mut Vec<u8>) -> std::result::Result<usize, TransportError> {
        (**self).poll(dst)
    }
}

/// Collects bytes from `port` until `window` has elapsed since the call.
pub fn receive<T>(port: &mut T, window: Duration)
    -> std::result::Result<Vec<u8>, TransportError>
    where T: Transport + ?Sized
{
    let start   = Instant::now();
    let mut buf = Vec::new();

    loop {
        if port.poll(&mut buf)? != 0 {
            continue
        }
        if start.elapsed() > window {
            break
        }
        thread::sleep(POLL_INTERVAL);
    }

    Ok(buf)
}

/// Sends `request` to `port` and decodes the response collected within
/// `window`.  Returns `None` if nothing but real-time bytes arrived.
///
/// The returned block may be incomplete; see `DecodedBlock::require_complete`.
pub fn exchange<T>(port: &mut T, request: &[u8], window: Duration)
    -> Result<Option<DecodedBlock>>
    where T: Transport + ?Sized
{
    debug!(len = request.len(), "sending request");
    trace!("out: {}", Hex(request));
    port.send(request)?;

    let raw   = receive(port, window)?;
    let bytes = strip_realtime(&raw);
    debug!(len = bytes.len(), realtime = raw.len() - bytes.len(), "received");
    trace!("in: {}", Hex(&bytes));

    if bytes.is_empty() {
        return Ok(None)
    }

    let (skipped, msg) = first_message(&bytes).ok_or(ParseError::UnrecognizedHeader)?;
    if skipped != 0 {
        warn!(skipped, "ignoring bytes before System Exclusive message");
    }

    Ok(Some(parse(msg)?))
}

/// A MIDI port selector: an index into `list_ports`, or a device path.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Port {
    Index(usize),
    Path(PathBuf),
}

impl Port {
    /// Gets the device path the selector refers to.
    pub fn resolve(&self) -> std::result::Result<PathBuf, TransportError> {
        match *self {
            Port::Path(ref path) => Ok(path.clone()),
            Port::Index(index)   => {
                let ports = list_ports()?;
                let count = ports.len();
                ports
                    .into_iter()
                    .nth(index)
                    .ok_or(TransportError::NoSuchPort { index, available: count })
            }
        }
    }
}

impl FromStr for Port {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Infallible> {
        Ok(match s.parse() {
            Ok(index) => Port::Index(index),
            Err(_)    => Port::Path(PathBuf::from(s)),
        })
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Port::Index(index)   => write!(f, "{}", index),
            Port::Path(ref path) => write!(f, "{}", path.display()),
        }
    }
}

/// Lists the raw MIDI devices of the system, ordered by card and device.
pub fn list_ports() -> io::Result<Vec<PathBuf>> {
    let dir = match fs::read_dir(RAW_MIDI_DIR) {
        Ok(dir) => dir,
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e),
    };

    let mut ports = vec![];
    for entry in dir {
        let entry = entry?;
        let name  = entry.file_name();
        if let Some(key) = name.to_str().and_then(raw_midi_key) {
            ports.push((key, entry.path()));
        }
    }

    ports.sort();
    Ok(ports.into_iter().map(|(_, path)| path).collect())
}

// Parses a device node name like "midiC1D0" into (card, device).
fn raw_midi_key(name: &str) -> Option<(u32, u32)> {
    let rest    = name.strip_prefix(RAW_MIDI_PREFIX)?;
    let d       = rest.find('D')?;
    let card    = rest[..d].parse().ok()?;
    let device  = rest[d + 1..].parse().ok()?;
    Some((card, device))
}

/// A transport over ALSA raw MIDI device nodes.
///
/// Input is read on a background thread, so that `poll` never blocks.
/// Dropping the port does not wait for that thread.  It stays parked in its
/// blocking read until the device delivers more bytes, reports EOF or fails,
/// and then exits on finding the port gone.
pub struct RawMidiPort {
    output: File,
    input:  Receiver<io::Result<Vec<u8>>>,
    reader: JoinHandle<()>,
}

impl RawMidiPort {
    /// Opens the ports selected by `input` and `output`.
    pub fn open(input: &Port, output: &Port) -> std::result::Result<Self, TransportError> {
        Self::from_paths(input.resolve()?, output.resolve()?)
    }

    /// Opens the device nodes at the given paths.
    pub fn from_paths<I, O>(input: I, output: O) -> std::result::Result<Self, TransportError>
        where I: AsRef<Path>, O: AsRef<Path>
    {
        let reader = File::open(input.as_ref())?;
        let writer = OpenOptions::new().write(true).open(output.as_ref())?;
        debug!(
            input  = %input.as_ref().display(),
            output = %output.as_ref().display(),
            "opened MIDI ports"
        );

        let (tx, rx) = mpsc::channel();
        let handle   = thread::Builder::new()
            .name("midi-input".to_string())
            .spawn(move || read_loop(BufReader::new(reader), tx))?;

        Ok(Self { output: writer, input: rx, reader: handle })
    }

    /// Checks whether the input thread is still reading from the device.
    /// Once it stops, `poll` drains what it forwarded and then reports
    /// `Disconnected`.
    pub fn is_reading(&self) -> bool {
        !self.reader.is_finished()
    }
}

// Forwards everything read from `stream` to `tx` until EOF, error, or the
// receiving end goes away.
fn read_loop<R: BufRead>(mut stream: R, tx: Sender<io::Result<Vec<u8>>>) {
    loop {
        let chunk = match stream.fill_buf() {
            Ok(b) => b.to_vec(),
            Err(ref e) if e.kind() == Interrupted => continue,
            Err(e) => {
                let _ = tx.send(Err(e));
                return
            }
        };

        if chunk.is_empty() {
            return
        }

        stream.consume(chunk.len());

        if tx.send(Ok(chunk)).is_err() {
            return
        }
    }
}

impl Transport for RawMidiPort {
    fn send(&mut self, msg: &[u8]) -> std::result::Result<(), TransportError> {
        self.output.write_all(msg)?;
        self.output.flush()?;
        Ok(())
    }

    fn poll(&mut self, dst: &mut Vec<u8>) -> std::result::Result<usize, TransportError> {
        let mut count = 0;
        loop {
            match self.input.try_recv() {
                Ok(Ok(chunk)) => {
                    count += chunk.len();
                    dst.extend_from_slice(&chunk);
                }
                Ok(Err(e))                      => return Err(e.into()),
                Err(TryRecvError::Empty)        => return Ok(count),
                Err(TryRecvError::Disconnected) => return match count {
                    0 => Err(TransportError::Disconnected),
                    _ => Ok(count),
                },
            }
        }
    }
}
