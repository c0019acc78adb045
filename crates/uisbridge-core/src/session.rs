//! Device session lifecycle and bus configuration
//!
//! A [`DeviceSession`] owns at most one open adapter and gates every
//! capability behind the connection state: calls against a disconnected
//! session fail with `NotConnected` before any hardware is touched.
//! Dropping a connected session closes the adapter (the backend's `Drop`
//! releases the device handle).

use crate::bridge::BridgePort;
use crate::error::{Error, Result};

/// SPI clock selection, the adapter's nine-step speed table.
///
/// The discriminant is the speed index encoded into the low nibble of the
/// configuration byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSpeed {
    /// 200 kHz
    #[default]
    Khz200 = 0,
    /// 400 kHz
    Khz400 = 1,
    /// 600 kHz
    Khz600 = 2,
    /// 800 kHz
    Khz800 = 3,
    /// 1 MHz
    Mhz1 = 4,
    /// 2 MHz
    Mhz2 = 5,
    /// 4 MHz
    Mhz4 = 6,
    /// 6 MHz
    Mhz6 = 7,
    /// 12 MHz
    Mhz12 = 8,
}

impl ClockSpeed {
    /// Look up a speed by name (`200k`, `400k`, ... `1m`, `2m`, `12m`).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        let name = name.strip_suffix("hz").unwrap_or(&name);
        Some(match name {
            "200k" => Self::Khz200,
            "400k" => Self::Khz400,
            "600k" => Self::Khz600,
            "800k" => Self::Khz800,
            "1m" => Self::Mhz1,
            "2m" => Self::Mhz2,
            "4m" => Self::Mhz4,
            "6m" => Self::Mhz6,
            "12m" => Self::Mhz12,
            _ => return None,
        })
    }
}

impl std::str::FromStr for ClockSpeed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| {
            Error::InvalidParameter(format!(
                "unknown SPI clock `{}` (expected 200k..12m)",
                s
            ))
        })
    }
}

/// SPI mode (clock polarity and phase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpiMode {
    /// CPOL=0, CPHA=0
    #[default]
    Mode0 = 0,
    /// CPOL=0, CPHA=1
    Mode1 = 1,
    /// CPOL=1, CPHA=0
    Mode2 = 2,
    /// CPOL=1, CPHA=1
    Mode3 = 3,
}

impl std::str::FromStr for SpiMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "0" | "mode0" => Ok(Self::Mode0),
            "1" | "mode1" => Ok(Self::Mode1),
            "2" | "mode2" => Ok(Self::Mode2),
            "3" | "mode3" => Ok(Self::Mode3),
            _ => Err(Error::InvalidParameter(format!(
                "unknown SPI mode `{}` (expected 0-3)",
                s
            ))),
        }
    }
}

/// Bus configuration applied once per session (re-applied only via an
/// explicit reconfigure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// SPI clock selection.
    pub clock: ClockSpeed,
    /// SPI mode selection.
    pub mode: SpiMode,
    /// Read timeout in milliseconds.
    pub read_timeout_ms: u16,
    /// Write timeout in milliseconds.
    pub write_timeout_ms: u16,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            clock: ClockSpeed::default(),
            mode: SpiMode::default(),
            read_timeout_ms: 100,
            write_timeout_ms: 100,
        }
    }
}

impl BusConfig {
    /// Pack mode and speed into the adapter's configuration byte
    /// (`mode << 4 | speed`, bit 7 clear for master operation).
    pub fn config_byte(&self) -> u8 {
        ((self.mode as u8) << 4) | self.clock as u8
    }

    /// Pack the timeouts into the adapter's 32-bit timeout word
    /// (`write << 16 | read`).
    pub fn timeout_word(&self) -> u32 {
        ((self.write_timeout_ms as u32) << 16) | self.read_timeout_ms as u32
    }
}

/// One adapter connection, `Disconnected` or `Connected`.
///
/// Exclusively owned by the caller context; this design assumes a single
/// physical adapter and provides no internal locking.
#[derive(Debug, Default)]
pub struct DeviceSession<P> {
    port: Option<P>,
}

impl<P: BridgePort> DeviceSession<P> {
    /// Create a disconnected session.
    pub fn new() -> Self {
        Self { port: None }
    }

    /// Whether a device is currently open.
    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Open the adapter through `open_fn`.
    ///
    /// A failed open leaves the session disconnected. Opening while
    /// already connected is rejected.
    pub fn open<F>(&mut self, open_fn: F) -> Result<()>
    where
        F: FnOnce() -> Result<P>,
    {
        if self.port.is_some() {
            return Err(Error::AlreadyConnected);
        }
        self.port = Some(open_fn()?);
        log::info!("bridge adapter session opened");
        Ok(())
    }

    /// Close the adapter. The port's `Drop` releases the device handle.
    pub fn close(&mut self) -> Result<()> {
        match self.port.take() {
            Some(port) => {
                drop(port);
                log::info!("bridge adapter session closed");
                Ok(())
            }
            None => Err(Error::NotConnected),
        }
    }

    /// Apply a bus configuration to the open adapter.
    pub fn configure(&mut self, config: &BusConfig) -> Result<()> {
        let (byte, word) = (config.config_byte(), config.timeout_word());
        log::debug!("bus config byte=0x{:02X} timeouts=0x{:08X}", byte, word);
        self.port_mut()?
            .set_bus_config(byte, word)
            .map_err(|_| Error::ConfigFailed)
    }

    /// Borrow the open port, or fail with `NotConnected`.
    ///
    /// This is the single gate every capability call goes through.
    pub fn port_mut(&mut self) -> Result<&mut P> {
        self.port.as_mut().ok_or(Error::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::mock::{Call, MockPort};

    #[test]
    fn config_byte_packs_mode_and_speed() {
        let config = BusConfig {
            clock: ClockSpeed::Mhz1,
            mode: SpiMode::Mode1,
            ..BusConfig::default()
        };
        assert_eq!(config.config_byte(), 0x14);

        let config = BusConfig {
            clock: ClockSpeed::Mhz12,
            mode: SpiMode::Mode3,
            ..BusConfig::default()
        };
        assert_eq!(config.config_byte(), 0x38);
    }

    #[test]
    fn timeout_word_packs_write_high_read_low() {
        let config = BusConfig {
            read_timeout_ms: 100,
            write_timeout_ms: 200,
            ..BusConfig::default()
        };
        assert_eq!(config.timeout_word(), (200 << 16) | 100);
    }

    #[test]
    fn clock_speed_names() {
        assert_eq!(ClockSpeed::from_name("200k"), Some(ClockSpeed::Khz200));
        assert_eq!(ClockSpeed::from_name("12MHz"), Some(ClockSpeed::Mhz12));
        assert_eq!(ClockSpeed::from_name("3m"), None);
    }

    #[test]
    fn open_close_state_machine() {
        let mut session = DeviceSession::new();
        assert!(!session.is_connected());
        assert_eq!(session.close(), Err(Error::NotConnected));

        session.open(|| Ok(MockPort::new())).unwrap();
        assert!(session.is_connected());
        assert_eq!(
            session.open(|| Ok(MockPort::new())),
            Err(Error::AlreadyConnected)
        );

        session.close().unwrap();
        assert!(!session.is_connected());
    }

    #[test]
    fn failed_open_stays_disconnected() {
        let mut session = DeviceSession::<MockPort>::new();
        assert_eq!(
            session.open(|| Err(Error::NoDeviceFound)),
            Err(Error::NoDeviceFound)
        );
        assert!(!session.is_connected());
    }

    #[test]
    fn configure_requires_connection() {
        let mut session = DeviceSession::<MockPort>::new();
        assert_eq!(
            session.configure(&BusConfig::default()),
            Err(Error::NotConnected)
        );
    }

    #[test]
    fn configure_passes_packed_encoding() {
        let mut session = DeviceSession::new();
        session.open(|| Ok(MockPort::new())).unwrap();
        let config = BusConfig {
            clock: ClockSpeed::Mhz2,
            mode: SpiMode::Mode0,
            read_timeout_ms: 100,
            write_timeout_ms: 100,
        };
        session.configure(&config).unwrap();
        assert_eq!(
            session.port_mut().unwrap().calls,
            vec![Call::SetBusConfig {
                config: 0x05,
                timeouts: (100 << 16) | 100,
            }]
        );
    }

    #[test]
    fn configure_maps_primitive_failure() {
        let mut session = DeviceSession::new();
        session
            .open(|| {
                Ok(MockPort {
                    fail_config: true,
                    ..MockPort::new()
                })
            })
            .unwrap();
        assert_eq!(
            session.configure(&BusConfig::default()),
            Err(Error::ConfigFailed)
        );
    }
}
