//! CLI argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uisbridge_core::select::Direction;
use uisbridge_core::session::{BusConfig, ClockSpeed, SpiMode};

use crate::backends;

fn parse_clock(s: &str) -> Result<ClockSpeed, String> {
    s.parse().map_err(|e: uisbridge_core::Error| e.to_string())
}

fn parse_mode(s: &str) -> Result<SpiMode, String> {
    s.parse().map_err(|e: uisbridge_core::Error| e.to_string())
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    s.parse().map_err(|e: uisbridge_core::Error| e.to_string())
}

fn backend_help() -> String {
    format!("Backend to use [available: {}]", backends::names().join(", "))
}

#[derive(Parser)]
#[command(name = "uisbridge")]
#[command(author, version, about = "USB2UIS SPI bridge transaction tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Backend to use
    #[arg(short, long, global = true, default_value = "usb2uis", help = backend_help())]
    pub backend: String,

    /// Path to the vendor library (usb2uis backend only)
    #[arg(long, global = true)]
    pub library: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Bus configuration options shared by read and write
#[derive(Args, Debug, Clone)]
pub struct BusArgs {
    /// SPI clock (200k, 400k, 600k, 800k, 1m, 2m, 4m, 6m, 12m)
    #[arg(long, default_value = "200k", value_parser = parse_clock)]
    pub speed: ClockSpeed,

    /// SPI mode (0-3)
    #[arg(long, default_value = "0", value_parser = parse_mode)]
    pub mode: SpiMode,

    /// Read timeout in milliseconds
    #[arg(long, default_value_t = 100)]
    pub read_timeout: u16,

    /// Write timeout in milliseconds
    #[arg(long, default_value_t = 100)]
    pub write_timeout: u16,
}

impl BusArgs {
    pub fn to_config(&self) -> BusConfig {
        BusConfig {
            clock: self.speed,
            mode: self.mode,
            read_timeout_ms: self.read_timeout,
            write_timeout_ms: self.write_timeout,
        }
    }
}

/// Where the 4 command bytes come from
#[derive(Args, Debug, Clone)]
pub struct CommandSource {
    /// Command bytes as hex, e.g. "0x00 0x02 0x2B 0x0A"
    #[arg(long, conflicts_with_all = ["catalog", "label"])]
    pub cmd: Option<String>,

    /// Command catalog file (TOML)
    #[arg(long, requires = "label")]
    pub catalog: Option<PathBuf>,

    /// Catalog entry addressed as list:label
    #[arg(long, requires = "catalog")]
    pub label: Option<String>,
}

/// Repetition options shared by read and write
#[derive(Args, Debug, Clone)]
pub struct RepeatArgs {
    /// Repeat the transaction on a timer
    #[arg(long)]
    pub repeat: bool,

    /// Number of repetitions (0 = until interrupted)
    #[arg(long, default_value_t = 0)]
    pub count: u32,

    /// Interval between repetitions in milliseconds (max 60000)
    #[arg(long, default_value_t = 500)]
    pub interval: u32,
}

/// Transaction options shared by read and write
#[derive(Args, Debug, Clone)]
pub struct TransactionArgs {
    #[command(flatten)]
    pub bus: BusArgs,

    #[command(flatten)]
    pub source: CommandSource,

    /// Dummy 0xFF bytes clocked out before the transaction (0-256)
    #[arg(long, default_value_t = 0)]
    pub dummy: u16,

    /// Delay between command and data phases in milliseconds
    #[arg(long, default_value_t = 0)]
    pub delay: u64,

    /// Chip-select routing (north, south)
    #[arg(long, default_value = "south", value_parser = parse_direction)]
    pub direction: Direction,

    #[command(flatten)]
    pub repeat: RepeatArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ReadArgs {
    #[command(flatten)]
    pub txn: TransactionArgs,

    /// Number of bytes to read
    #[arg(short, long)]
    pub len: u16,
}

#[derive(Args, Debug, Clone)]
pub struct WriteArgs {
    #[command(flatten)]
    pub txn: TransactionArgs,

    /// Payload bytes as hex
    #[arg(short, long)]
    pub data: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the adapter, report it and close it again
    Probe,

    /// Run a SPI read transaction
    Read(ReadArgs),

    /// Run a SPI write transaction
    Write(WriteArgs),

    /// Show the contents of a command catalog file
    Lists {
        /// Catalog file (TOML)
        file: PathBuf,
    },
}
