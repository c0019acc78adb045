//! uisbridge-core - Core library for USB2UIS SPI bridge transactions
//!
//! This crate drives manually-specified SPI transactions through a USB
//! bridge adapter. The adapter itself is behind the [`bridge::BridgePort`]
//! trait; backend crates provide the real vendor-library binding and an
//! in-memory emulator.
//!
//! The important pieces:
//!
//! - [`engine`] - the per-transaction state machine (preamble pulse,
//!   command phase, data phase, teardown). Guarantees the chip-select line
//!   is back at idle on every exit path once it has been asserted.
//! - [`repeat`] - re-issues a transaction on a timer, cancellable between
//!   iterations.
//! - [`select`] - routes the logical assert/idle intent onto the dedicated
//!   select line or a GPIO pin, depending on board orientation.
//! - [`session`] - connection lifecycle and bus configuration encoding.
//! - [`hex`] - the whitespace-separated `0xNN` token codec used for all
//!   user-facing byte sequences.
//! - [`catalog`] - named command lists and grouped command sets loaded
//!   from TOML files.
//!
//! # Example
//!
//! ```ignore
//! use uisbridge_core::engine::{self, TransactionSpec};
//! use uisbridge_core::select::Direction;
//! use uisbridge_core::session::DeviceSession;
//!
//! let mut session = DeviceSession::new();
//! session.open(|| backend_open())?;
//! let spec = TransactionSpec::read(Direction::South, vec![0x00, 0x02, 0x2B, 0x0A], 8)
//!     .with_dummy_count(2);
//! let result = engine::execute(&mut session, &spec)?;
//! println!("{}", uisbridge_core::hex::format(&result.bytes));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bridge;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod hex;
pub mod repeat;
pub mod select;
pub mod session;
pub mod timing;

pub use error::{Error, Result};
