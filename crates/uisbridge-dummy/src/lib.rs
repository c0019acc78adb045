//! uisbridge-dummy - Emulated bridge adapter
//!
//! An in-memory implementation of the bridge primitive surface for
//! testing and development without hardware. It records every primitive
//! call, answers reads from a scripted byte pattern, and can be armed to
//! fail the n-th call of a given kind to exercise abort paths.

use uisbridge_core::bridge::{BridgePort, GpioPins};
use uisbridge_core::error::{Error, Result};

/// One recorded primitive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    /// `set_bus_config`
    SetBusConfig {
        /// Packed configuration byte.
        config: u8,
        /// Packed timeout word.
        timeouts: u32,
    },
    /// `spi_write`
    SpiWrite {
        /// Command region.
        cmd: Vec<u8>,
        /// Data region.
        data: Vec<u8>,
    },
    /// `spi_read`
    SpiRead {
        /// Requested length.
        len: usize,
    },
    /// `set_chip_select`
    SetChipSelect {
        /// Electrical level driven.
        level: bool,
    },
    /// `gpio_direction`
    GpioDirection,
    /// `set_gpio_direction`
    SetGpioDirection {
        /// Direction byte written.
        dir: u8,
    },
    /// `gpio_read`
    GpioRead,
    /// `gpio_write`
    GpioWrite {
        /// Level byte written.
        value: u8,
        /// Pins driven.
        mask: u8,
    },
}

/// Primitive kind selector for scripted failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Any `spi_write` call.
    SpiWrite,
    /// Any `spi_read` call.
    SpiRead,
    /// Any `set_bus_config` call.
    SetBusConfig,
}

/// Emulated bridge adapter.
///
/// Reads are answered from `read_pattern`, repeated cyclically. The
/// default pattern matches nothing in particular; give the emulator the
/// bytes your test expects back.
#[derive(Debug)]
pub struct EmulatedBridge {
    calls: Vec<BridgeCall>,
    read_pattern: Vec<u8>,
    gpio_value: u8,
    gpio_dir: u8,
    fail_at: Option<(CallKind, usize)>,
    write_seen: usize,
    read_seen: usize,
    config_seen: usize,
}

impl EmulatedBridge {
    /// Create an emulator with an all-zero read pattern and all GPIO
    /// pins configured as idle-high inputs.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            read_pattern: vec![0x00],
            gpio_value: 0xFF,
            gpio_dir: 0xFF,
            fail_at: None,
            write_seen: 0,
            read_seen: 0,
            config_seen: 0,
        }
    }

    /// Create an emulator answering reads with `pattern`, cyclically.
    /// An empty pattern falls back to zeros.
    pub fn with_read_pattern(pattern: Vec<u8>) -> Self {
        let read_pattern = if pattern.is_empty() { vec![0x00] } else { pattern };
        Self {
            read_pattern,
            ..Self::new()
        }
    }

    /// Arm the emulator to fail the `nth` (1-based) call of `kind`.
    pub fn fail_on(mut self, kind: CallKind, nth: usize) -> Self {
        self.fail_at = Some((kind, nth));
        self
    }

    /// Every primitive call seen so far, in order.
    pub fn calls(&self) -> &[BridgeCall] {
        &self.calls
    }

    /// Electrical levels driven on the dedicated select line, in order.
    pub fn select_trace(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BridgeCall::SetChipSelect { level } => Some(*level),
                _ => None,
            })
            .collect()
    }

    /// Current GPIO level byte.
    pub fn gpio_levels(&self) -> u8 {
        self.gpio_value
    }

    fn trip(&mut self, kind: CallKind) -> bool {
        let seen = match kind {
            CallKind::SpiWrite => &mut self.write_seen,
            CallKind::SpiRead => &mut self.read_seen,
            CallKind::SetBusConfig => &mut self.config_seen,
        };
        *seen += 1;
        self.fail_at == Some((kind, *seen))
    }
}

impl Default for EmulatedBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgePort for EmulatedBridge {
    fn set_bus_config(&mut self, config_byte: u8, timeout_word: u32) -> Result<()> {
        self.calls.push(BridgeCall::SetBusConfig {
            config: config_byte,
            timeouts: timeout_word,
        });
        if self.trip(CallKind::SetBusConfig) {
            return Err(Error::Io);
        }
        log::debug!(
            "emulated bus config 0x{:02X}, timeouts 0x{:08X}",
            config_byte,
            timeout_word
        );
        Ok(())
    }

    fn spi_read(&mut self, _cmd: &[u8], buf: &mut [u8]) -> Result<()> {
        self.calls.push(BridgeCall::SpiRead { len: buf.len() });
        if self.trip(CallKind::SpiRead) {
            return Err(Error::Io);
        }
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.read_pattern[i % self.read_pattern.len()];
        }
        Ok(())
    }

    fn spi_write(&mut self, cmd: &[u8], data: &[u8]) -> Result<()> {
        self.calls.push(BridgeCall::SpiWrite {
            cmd: cmd.to_vec(),
            data: data.to_vec(),
        });
        if self.trip(CallKind::SpiWrite) {
            return Err(Error::Io);
        }
        Ok(())
    }

    fn set_chip_select(&mut self, level: bool) -> Result<()> {
        self.calls.push(BridgeCall::SetChipSelect { level });
        Ok(())
    }

    fn gpio_direction(&mut self) -> Result<u8> {
        self.calls.push(BridgeCall::GpioDirection);
        Ok(self.gpio_dir)
    }

    fn set_gpio_direction(&mut self, dir: u8) -> Result<()> {
        self.calls.push(BridgeCall::SetGpioDirection { dir });
        self.gpio_dir = dir;
        Ok(())
    }

    fn gpio_read(&mut self) -> Result<u8> {
        self.calls.push(BridgeCall::GpioRead);
        Ok(self.gpio_value)
    }

    fn gpio_write(&mut self, value: u8, mask: GpioPins) -> Result<()> {
        self.calls.push(BridgeCall::GpioWrite {
            value,
            mask: mask.bits(),
        });
        self.gpio_value = (self.gpio_value & !mask.bits()) | (value & mask.bits());
        Ok(())
    }
}
