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

use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use miette::IntoDiagnostic;
use tracing::{info, Level};

use wersi::io::{exchange, list_ports, Port, RawMidiPort};
use wersi::sysex::Hex;
use wersi::wersi::block::{catalog, BlockId, DecodedBlock};
use wersi::wersi::message::{read_request, write_request};

/// Reads and writes Wersi MK1 parameter blocks over MIDI.
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// MIDI input port (index or device path)
    #[clap(short, long, required_unless_present = "list")]
    input: Option<Port>,

    /// MIDI output port (index or device path)
    #[clap(short, long, required_unless_present = "list")]
    output: Option<Port>,

    /// Block address (Wersi pointer), decimal or 0x-prefixed hex
    #[clap(short = 'b', long, value_parser = parse_byte, required_unless_present = "list")]
    block_address: Option<u8>,

    /// Block type to read or write
    #[clap(long, value_enum, default_value_t = BlockArg::Icb)]
    block: BlockArg,

    /// Write these bytes to the block instead of reading it
    #[clap(long, value_parser = parse_byte, num_args = 1.., value_name = "BYTE")]
    write: Option<Vec<u8>>,

    /// How long to wait for a response, in milliseconds
    #[clap(long, default_value_t = 500)]
    timeout_ms: u64,

    /// List MIDI ports and block types, then exit
    #[clap(short, long)]
    list: bool,

    /// Log more detail; repeat for even more
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum BlockArg {
    Icb,
    Vcf,
    Freq,
    Ampl,
    Fixwave,
    Relwave,
}

impl From<BlockArg> for BlockId {
    fn from(arg: BlockArg) -> Self {
        match arg {
            BlockArg::Icb     => BlockId::Icb,
            BlockArg::Vcf     => BlockId::Vcf,
            BlockArg::Freq    => BlockId::Freq,
            BlockArg::Ampl    => BlockId::Ampl,
            BlockArg::Fixwave => BlockId::FixWave,
            BlockArg::Relwave => BlockId::RelWave,
        }
    }
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(level_for(cli.verbose));

    if cli.list {
        return print_lists()
    }

    // clap guarantees these unless --list was given
    let (input, output, address) = match (cli.input, cli.output, cli.block_address) {
        (Some(i), Some(o), Some(b)) => (i, o, b),
        _ => return Err(miette::miette!("--input, --output, and --block-address are required")),
    };

    let block   = BlockId::from(cli.block);
    let request = match cli.write {
        Some(ref data) => write_request(block, address, data).into_diagnostic()?,
        None           => read_request(block, address),
    };

    println!("Out:");
    println!("{}", Hex(&request));

    let mut port = RawMidiPort::open(&input, &output).into_diagnostic()?;
    info!(%input, %output, "ports open");

    let window = Duration::from_millis(cli.timeout_ms);
    match exchange(&mut port, &request, window).into_diagnostic()? {
        Some(received) => print_block(received),
        None           => println!("No response received."),
    }

    Ok(())
}

fn print_lists() -> miette::Result<()> {
    println!("Ports:");
    for (i, path) in list_ports().into_diagnostic()?.iter().enumerate() {
        println!("  {:>2}  {}", i, path.display());
    }

    println!("Blocks:");
    for row in catalog_rows().iter() {
        println!("{}", row);
    }

    Ok(())
}

// One line per catalog entry: name, identifier, size, addressing, description
fn catalog_rows() -> Vec<String> {
    catalog()
        .iter()
        .map(|entry| format!(
            "  {:<8} '{}'  {:>3} bytes  {:<31}  {}",
            entry.name, entry.id as u8 as char, entry.size, entry.addressing, entry.description
        ))
        .collect()
}

fn print_block(received: DecodedBlock) {
    let mismatch = received.matches_catalog() == Some(false);

    let block = match received.require_complete() {
        Ok(block) => block,
        Err(e)    => { println!("{}", e); return }
    };

    println!("* Received Wersi MK1 SysEx message");
    println!("Block identifier: {} ({})", block.identifier as char, block.identifier);
    println!("Block address: {} (0x{:02X}) {}", block.address, block.address, block.pointer());
    println!("Block length: {} bytes", block.declared_len);
    if mismatch {
        if let Some(id) = block.block_id() {
            println!("Note: {} blocks are normally {} bytes", id, id.size());
        }
    }
    println!("Data (got {} bytes):", block.data.len());
    for row in dump_rows(&block.data).iter() {
        println!("{}", row);
    }
}

// Hex, printable, decimal, and binary views of `data`, one row each
fn dump_rows(data: &[u8]) -> [String; 4] {
    [
        join(data, |b| format!("0x{:02X}    ", b)),
        join(data, |b| format!("({})     ", printable(b))),
        join(data, |b| format!("{:08}", b)),
        join(data, |b| format!("{:08b}", b)),
    ]
}

fn join<F: Fn(u8) -> String>(data: &[u8], f: F) -> String {
    data.iter().map(|&b| f(b)).collect::<Vec<_>>().join(" ")
}

fn printable(b: u8) -> char {
    match b {
        0x20..=0x7E => b as char,
        _           => '?',
    }
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let result = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None      => s.parse(),
    };
    result.map_err(|e| format!("invalid byte '{}': {}", s, e))
}

fn level_for(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_tracing(level: Level) {
    let _ = tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}
