//! SPI transaction engine
//!
//! One invocation runs one read or one write transaction through a fixed
//! sequence of phases; read and write share the same skeleton and differ
//! only in the data phase:
//!
//! 1. Idle - select line idle, spec validated, session connected.
//! 2. Dummy preamble - select asserted; `dummy_count` bytes of `0xFF`
//!    clocked out unframed (skipped entirely when the count is zero).
//! 3. Preamble settle - 500 us busy-wait, select back to idle, 1 ms hold.
//!    The whole preamble pulse exists to flush the target's analog front
//!    end before the real transaction; the settle and the pulse happen
//!    even with zero dummy bytes written.
//! 4. Command phase - select re-asserted, the 4-byte command sent as a
//!    command-framed write with no payload.
//! 5. Inter-phase delay - optional yield with select held asserted.
//! 6. Data phase - read `len` bytes, or write the payload bracketed by
//!    500 us timing margins.
//! 7. Teardown - select back to idle, result captured with a timestamp.
//!
//! Once the engine has asserted the select line it is guaranteed to drive
//! it back to idle before returning, on success and on every failure
//! path. Failures are tagged with the phase that died and abort the
//! transaction; nothing is retried.

use std::time::SystemTime;

use crate::bridge::BridgePort;
use crate::error::{Error, Result};
use crate::select::{self, Direction};
use crate::session::DeviceSession;
use crate::timing;

/// Required command length in bytes.
pub const COMMAND_LEN: usize = 4;

/// Maximum number of dummy preamble bytes.
pub const MAX_DUMMY_COUNT: usize = 256;

/// Maximum transfer length of a single data region (16-bit length field).
pub const MAX_TRANSFER_LEN: usize = u16::MAX as usize;

/// Fill value clocked out during the dummy preamble.
pub const DUMMY_FILL: u8 = 0xFF;

/// Bus settle busy-wait after the preamble, microseconds.
const SETTLE_US: u64 = 500;

/// Hold time after the preamble pulse, milliseconds (target AFE spec).
const PREAMBLE_HOLD_MS: u64 = 1;

/// Timing margin around the payload write, microseconds.
const WRITE_MARGIN_US: u64 = 500;

/// Which way the data phase moves bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// Data clocked in from the target.
    Read,
    /// Data clocked out to the target.
    Write,
}

/// Data phase of a transaction: a requested read length or write bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Read this many bytes after the command phase.
    Read {
        /// Number of bytes to clock in.
        len: usize,
    },
    /// Write these bytes after the command phase.
    Write {
        /// Bytes to clock out.
        data: Vec<u8>,
    },
}

/// One fully-specified transaction. Constructed fresh per invocation and
/// never mutated after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSpec {
    /// Chip-select routing for this call.
    pub direction: Direction,
    /// Command bytes, exactly [`COMMAND_LEN`] long.
    pub command: Vec<u8>,
    /// Dummy `0xFF` bytes clocked out before the transaction, `0..=256`.
    pub dummy_count: usize,
    /// Yield between command and data phases, milliseconds.
    pub inter_phase_delay_ms: u64,
    /// Data phase.
    pub payload: Payload,
}

impl TransactionSpec {
    /// Build a read transaction with no dummy preamble or delay.
    pub fn read(direction: Direction, command: Vec<u8>, len: usize) -> Self {
        Self {
            direction,
            command,
            dummy_count: 0,
            inter_phase_delay_ms: 0,
            payload: Payload::Read { len },
        }
    }

    /// Build a write transaction with no dummy preamble or delay.
    pub fn write(direction: Direction, command: Vec<u8>, data: Vec<u8>) -> Self {
        Self {
            direction,
            command,
            dummy_count: 0,
            inter_phase_delay_ms: 0,
            payload: Payload::Write { data },
        }
    }

    /// Set the dummy preamble byte count.
    pub fn with_dummy_count(mut self, count: usize) -> Self {
        self.dummy_count = count;
        self
    }

    /// Set the delay between command and data phases.
    pub fn with_inter_phase_delay_ms(mut self, ms: u64) -> Self {
        self.inter_phase_delay_ms = ms;
        self
    }

    /// The data-phase direction of this spec.
    pub fn kind(&self) -> TransferKind {
        match self.payload {
            Payload::Read { .. } => TransferKind::Read,
            Payload::Write { .. } => TransferKind::Write,
        }
    }

    /// Check the spec against the adapter's framing limits.
    ///
    /// Runs before any hardware access, so a rejected spec never touches
    /// the select line.
    pub fn validate(&self) -> Result<()> {
        if self.command.len() != COMMAND_LEN {
            return Err(Error::InvalidCommandLength(self.command.len()));
        }
        if self.dummy_count > MAX_DUMMY_COUNT {
            return Err(Error::DummyCountTooLarge(self.dummy_count));
        }
        let data_len = match &self.payload {
            Payload::Read { len } => *len,
            Payload::Write { data } => data.len(),
        };
        if data_len > MAX_TRANSFER_LEN {
            return Err(Error::TransferTooLong(data_len));
        }
        Ok(())
    }
}

/// Outcome of one transaction: the bytes moved and when.
#[derive(Debug, Clone)]
pub struct TransactionResult {
    /// Wall-clock capture time, taken at teardown.
    pub timestamp: SystemTime,
    /// Whether the data phase read or wrote.
    pub kind: TransferKind,
    /// Bytes received (read) or echoed back (write).
    pub bytes: Vec<u8>,
}

/// Execute one transaction against the open session.
pub fn execute<P: BridgePort>(
    session: &mut DeviceSession<P>,
    spec: &TransactionSpec,
) -> Result<TransactionResult> {
    spec.validate()?;
    let direction = spec.direction;
    let port = session.port_mut()?;
    select::normalize_idle(port, direction)?;

    // Preamble pulse: one select cycle ahead of the real transaction to
    // synchronize the target's front end. The pulse always happens; the
    // dummy write inside it is skipped at count zero.
    assert_select(port, direction)?;
    if spec.dummy_count > 0 {
        log::debug!("dummy preamble: {} bytes", spec.dummy_count);
        let fill = vec![DUMMY_FILL; spec.dummy_count];
        if port.spi_write(&[], &fill).is_err() {
            force_idle(port, direction);
            return Err(Error::DummyWriteFailed);
        }
    }
    timing::busy_wait_us(SETTLE_US);
    deassert_select(port, direction)?;
    timing::yield_ms(PREAMBLE_HOLD_MS);

    // Command phase. Command and payload go out as two primitive calls:
    // the adapter frames them as distinct regions of the transfer.
    assert_select(port, direction)?;
    log::debug!("command: {}", crate::hex::format(&spec.command));
    if port.spi_write(&spec.command, &[]).is_err() {
        force_idle(port, direction);
        return Err(Error::CommandWriteFailed);
    }

    // Time the target needs between command and data (write latency,
    // conversion time). Select stays asserted.
    if spec.inter_phase_delay_ms > 0 {
        timing::yield_ms(spec.inter_phase_delay_ms);
    }

    let bytes = match &spec.payload {
        Payload::Read { len } => {
            let mut buf = vec![0u8; *len];
            if port.spi_read(&[], &mut buf).is_err() {
                force_idle(port, direction);
                return Err(Error::ReadFailed);
            }
            buf
        }
        Payload::Write { data } => {
            timing::busy_wait_us(WRITE_MARGIN_US);
            if port.spi_write(&[], data).is_err() {
                force_idle(port, direction);
                return Err(Error::WriteFailed);
            }
            timing::busy_wait_us(WRITE_MARGIN_US);
            data.clone()
        }
    };

    deassert_select(port, direction)?;

    Ok(TransactionResult {
        timestamp: SystemTime::now(),
        kind: spec.kind(),
        bytes,
    })
}

fn assert_select<P: BridgePort>(port: &mut P, direction: Direction) -> Result<()> {
    if let Err(e) = select::set_select(port, direction, true) {
        // The line state is unknown after a failed assert; force it back.
        force_idle(port, direction);
        return Err(e);
    }
    Ok(())
}

fn deassert_select<P: BridgePort>(port: &mut P, direction: Direction) -> Result<()> {
    if select::set_select(port, direction, false).is_err() {
        force_idle(port, direction);
        return Err(Error::SelectFailed);
    }
    Ok(())
}

/// Best-effort drive to idle on an abort path.
fn force_idle<P: BridgePort>(port: &mut P, direction: Direction) {
    if select::set_select(port, direction, false).is_err() {
        log::warn!("could not force chip-select back to idle");
    }
}
