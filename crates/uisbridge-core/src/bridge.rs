//! Bridge adapter trait definitions
//!
//! [`BridgePort`] is the primitive capability surface of the USB bridge
//! adapter. Every operation maps onto one vendor primitive; the adapter
//! reports plain success or failure per call, with no partial-transfer
//! counts, so a failed call is treated as a total failure of that
//! transfer.

use bitflags::bitflags;

use crate::error::Result;

bitflags! {
    /// Pins of the adapter's 8-bit GPIO port.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GpioPins: u8 {
        /// GPIO pin IO0
        const IO0 = 1 << 0;
        /// GPIO pin IO1 (carries chip-select in the North orientation)
        const IO1 = 1 << 1;
        /// GPIO pin IO2
        const IO2 = 1 << 2;
        /// GPIO pin IO3
        const IO3 = 1 << 3;
        /// GPIO pin IO4
        const IO4 = 1 << 4;
        /// GPIO pin IO5
        const IO5 = 1 << 5;
        /// GPIO pin IO6
        const IO6 = 1 << 6;
        /// GPIO pin IO7
        const IO7 = 1 << 7;
    }
}

/// Primitive operations of a bridge adapter.
///
/// Implementations exist for the real vendor library and for an in-memory
/// emulator. All methods are synchronous; the adapter handles one call at
/// a time and the engine never overlaps transfers.
///
/// SPI transfers carry two regions: a command region and a data region.
/// The adapter frames them distinctly even though they are electrically
/// contiguous on the bus, which is why the engine can send a command with
/// no payload and a payload with no command. An empty `cmd` slice means
/// the transfer has no command region.
pub trait BridgePort {
    /// Apply the packed bus configuration byte and timeout word.
    fn set_bus_config(&mut self, config_byte: u8, timeout_word: u32) -> Result<()>;

    /// Clock `buf.len()` bytes in, optionally preceded by a command region.
    fn spi_read(&mut self, cmd: &[u8], buf: &mut [u8]) -> Result<()>;

    /// Clock a command region and/or a data region out.
    fn spi_write(&mut self, cmd: &[u8], data: &[u8]) -> Result<()>;

    /// Drive the dedicated chip-select line to the given electrical level.
    ///
    /// `true` is the line's idle level; `false` starts a transfer window
    /// (the line is active-low).
    fn set_chip_select(&mut self, level: bool) -> Result<()>;

    /// Read the GPIO direction byte (bit set = input, clear = output).
    fn gpio_direction(&mut self) -> Result<u8>;

    /// Write the whole GPIO direction byte.
    fn set_gpio_direction(&mut self, dir: u8) -> Result<()>;

    /// Read the GPIO level byte.
    fn gpio_read(&mut self) -> Result<u8>;

    /// Drive the GPIO pins selected by `mask` to the levels in `value`.
    ///
    /// Pins outside `mask` keep their current level. Callers are expected
    /// to pass single-bit masks and read-modify-write the value byte.
    fn gpio_write(&mut self, value: u8, mask: GpioPins) -> Result<()>;
}

// Blanket impl for boxed ports to allow trait-object backends.
impl BridgePort for Box<dyn BridgePort + Send> {
    fn set_bus_config(&mut self, config_byte: u8, timeout_word: u32) -> Result<()> {
        (**self).set_bus_config(config_byte, timeout_word)
    }

    fn spi_read(&mut self, cmd: &[u8], buf: &mut [u8]) -> Result<()> {
        (**self).spi_read(cmd, buf)
    }

    fn spi_write(&mut self, cmd: &[u8], data: &[u8]) -> Result<()> {
        (**self).spi_write(cmd, data)
    }

    fn set_chip_select(&mut self, level: bool) -> Result<()> {
        (**self).set_chip_select(level)
    }

    fn gpio_direction(&mut self) -> Result<u8> {
        (**self).gpio_direction()
    }

    fn set_gpio_direction(&mut self, dir: u8) -> Result<()> {
        (**self).set_gpio_direction(dir)
    }

    fn gpio_read(&mut self) -> Result<u8> {
        (**self).gpio_read()
    }

    fn gpio_write(&mut self, value: u8, mask: GpioPins) -> Result<()> {
        (**self).gpio_write(value, mask)
    }
}

/// Scripted in-memory port used by the unit tests in this crate.
#[cfg(test)]
pub(crate) mod mock {
    use super::{BridgePort, GpioPins};
    use crate::error::{Error, Result};

    /// One recorded primitive call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        SetBusConfig { config: u8, timeouts: u32 },
        SpiWrite { cmd: Vec<u8>, data: Vec<u8> },
        SpiRead { len: usize },
        Select { level: bool },
        GpioDirection,
        SetGpioDirection { dir: u8 },
        GpioRead,
        GpioWrite { value: u8, mask: u8 },
    }

    /// Port that records calls and fails on demand.
    #[derive(Debug, Default)]
    pub struct MockPort {
        pub calls: Vec<Call>,
        /// Bytes returned by `spi_read`, repeated cyclically.
        pub read_response: Vec<u8>,
        /// Fail the n-th `spi_write` call (1-based) across the port's life.
        pub fail_write_at: Option<usize>,
        /// Fail every `spi_read` call.
        pub fail_read: bool,
        /// Fail every `set_bus_config` call.
        pub fail_config: bool,
        pub write_calls: usize,
        pub gpio_value: u8,
        pub gpio_dir: u8,
    }

    impl MockPort {
        pub fn new() -> Self {
            Self {
                gpio_value: 0xFF,
                gpio_dir: 0xFF,
                ..Self::default()
            }
        }

        /// Electrical levels seen on the dedicated select line, in order.
        pub fn select_levels(&self) -> Vec<bool> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Select { level } => Some(*level),
                    _ => None,
                })
                .collect()
        }

        /// Count of select-line transitions to the given level.
        pub fn select_count(&self, level: bool) -> usize {
            self.select_levels().iter().filter(|&&l| l == level).count()
        }
    }

    impl BridgePort for MockPort {
        fn set_bus_config(&mut self, config_byte: u8, timeout_word: u32) -> Result<()> {
            self.calls.push(Call::SetBusConfig {
                config: config_byte,
                timeouts: timeout_word,
            });
            if self.fail_config {
                return Err(Error::Io);
            }
            Ok(())
        }

        fn spi_read(&mut self, cmd: &[u8], buf: &mut [u8]) -> Result<()> {
            debug_assert!(cmd.is_empty(), "engine reads carry no command region");
            self.calls.push(Call::SpiRead { len: buf.len() });
            if self.fail_read {
                return Err(Error::Io);
            }
            if !self.read_response.is_empty() {
                for (i, b) in buf.iter_mut().enumerate() {
                    *b = self.read_response[i % self.read_response.len()];
                }
            }
            Ok(())
        }

        fn spi_write(&mut self, cmd: &[u8], data: &[u8]) -> Result<()> {
            self.calls.push(Call::SpiWrite {
                cmd: cmd.to_vec(),
                data: data.to_vec(),
            });
            self.write_calls += 1;
            if self.fail_write_at == Some(self.write_calls) {
                return Err(Error::Io);
            }
            Ok(())
        }

        fn set_chip_select(&mut self, level: bool) -> Result<()> {
            self.calls.push(Call::Select { level });
            Ok(())
        }

        fn gpio_direction(&mut self) -> Result<u8> {
            self.calls.push(Call::GpioDirection);
            Ok(self.gpio_dir)
        }

        fn set_gpio_direction(&mut self, dir: u8) -> Result<()> {
            self.calls.push(Call::SetGpioDirection { dir });
            self.gpio_dir = dir;
            Ok(())
        }

        fn gpio_read(&mut self) -> Result<u8> {
            self.calls.push(Call::GpioRead);
            Ok(self.gpio_value)
        }

        fn gpio_write(&mut self, value: u8, mask: GpioPins) -> Result<()> {
            self.calls.push(Call::GpioWrite {
                value,
                mask: mask.bits(),
            });
            self.gpio_value = (self.gpio_value & !mask.bits()) | (value & mask.bits());
            Ok(())
        }
    }
}
