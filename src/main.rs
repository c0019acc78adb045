//! uisbridge - manual SPI transactions over a USB2UIS bridge adapter
//!
//! A command-line front end for the uisbridge-core transaction engine:
//! open the adapter, apply a bus configuration, run a read or write
//! transaction (optionally repeated on a timer) and print the results.
//!
//! Backends are pluggable behind the `BridgePort` trait:
//! - **usb2uis** - the real adapter via the vendor dynamic library
//! - **dummy** - an in-memory emulator for trying the tool without
//!   hardware

mod backends;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use uisbridge_core::session::DeviceSession;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    // Catalog listing needs no device.
    if let Commands::Lists { file } = &cli.command {
        return commands::lists::run_lists(file);
    }

    let port = backends::open_backend(&cli.backend, cli.library.as_deref())?;
    let mut session = DeviceSession::new();
    session.open(|| Ok(port))?;

    let result = match cli.command {
        Commands::Probe => commands::probe::run_probe(&mut session, &cli.backend),
        Commands::Read(args) => commands::read::run_read(&mut session, &args),
        Commands::Write(args) => commands::write::run_write(&mut session, &args),
        Commands::Lists { .. } => unreachable!("handled above"),
    };

    if session.is_connected() {
        session.close()?;
    }

    result
}
