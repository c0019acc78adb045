//! USB2UIS device lifecycle and primitive dispatch
//!
//! `Usb2UisLib` resolves the vendor exports once at load time into plain
//! function pointers; `Usb2Uis` holds one open device index against a
//! shared library handle and closes it on drop.

use std::path::Path;
use std::ptr;
use std::sync::Arc;

use libloading::Library;
use uisbridge_core::bridge::{BridgePort, GpioPins};
use uisbridge_core::error::{Error as CoreError, Result as CoreResult};

use crate::error::{Result, Usb2UisError};
use crate::protocol::{self, OPEN_NO_DEVICE};

type OpenDeviceFn = unsafe extern "system" fn() -> u8;
type CloseDeviceFn = unsafe extern "system" fn(u8) -> bool;
type SpiSetConfigFn = unsafe extern "system" fn(u8, u8, u32) -> bool;
type SpiReadFn = unsafe extern "system" fn(u8, *const u8, u8, *mut u8, u16) -> bool;
type SpiWriteFn = unsafe extern "system" fn(u8, *const u8, u8, *const u8, u16) -> bool;
type SetCeFn = unsafe extern "system" fn(u8, bool) -> bool;
type GetGpioConfigFn = unsafe extern "system" fn(u8, *mut u8) -> bool;
type SetGpioConfigFn = unsafe extern "system" fn(u8, u8) -> bool;
type GpioReadFn = unsafe extern "system" fn(u8, *mut u8) -> bool;
type GpioWriteFn = unsafe extern "system" fn(u8, u8, u8) -> bool;

/// Loaded vendor library with all required exports resolved.
///
/// The resolved function pointers stay valid for as long as the library
/// is held, which the struct guarantees by owning it.
pub struct Usb2UisLib {
    _lib: Library,
    open_device: OpenDeviceFn,
    close_device: CloseDeviceFn,
    spi_set_config: SpiSetConfigFn,
    spi_read: SpiReadFn,
    spi_write: SpiWriteFn,
    set_ce: SetCeFn,
    get_gpio_config: GetGpioConfigFn,
    set_gpio_config: SetGpioConfigFn,
    gpio_read: GpioReadFn,
    gpio_write: GpioWriteFn,
}

impl std::fmt::Debug for Usb2UisLib {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Usb2UisLib").finish_non_exhaustive()
    }
}

fn resolve<T: Copy + 'static>(
    lib: &Library,
    symbol: &'static [u8],
    name: &'static str,
) -> Result<T> {
    // SAFETY: the signature types in this module mirror the vendor ABI;
    // a mismatch is a vendor packaging error we cannot detect here.
    unsafe { lib.get::<T>(symbol) }
        .map(|s| *s)
        .map_err(|_| Usb2UisError::MissingSymbol(name))
}

impl Usb2UisLib {
    /// Load the vendor library and resolve every required export.
    pub fn load(path: &Path) -> Result<Arc<Self>> {
        // SAFETY: loading runs the vendor library's initializers; there
        // is no way around trusting them for a closed vendor driver.
        let lib = unsafe { Library::new(path) }.map_err(|source| Usb2UisError::LibraryLoad {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("loaded USB2UIS vendor library from {}", path.display());

        let loaded = Self {
            open_device: resolve(&lib, protocol::SYM_OPEN_DEVICE, "USBIO_OpenDevice")?,
            close_device: resolve(&lib, protocol::SYM_CLOSE_DEVICE, "USBIO_CloseDevice")?,
            spi_set_config: resolve(&lib, protocol::SYM_SPI_SET_CONFIG, "USBIO_SPISetConfig")?,
            spi_read: resolve(&lib, protocol::SYM_SPI_READ, "USBIO_SPIRead")?,
            spi_write: resolve(&lib, protocol::SYM_SPI_WRITE, "USBIO_SPIWrite")?,
            set_ce: resolve(&lib, protocol::SYM_SET_CE, "USBIO_SetCE")?,
            get_gpio_config: resolve(&lib, protocol::SYM_GET_GPIO_CONFIG, "USBIO_GetGPIOConfig")?,
            set_gpio_config: resolve(&lib, protocol::SYM_SET_GPIO_CONFIG, "USBIO_SetGPIOConfig")?,
            gpio_read: resolve(&lib, protocol::SYM_GPIO_READ, "USBIO_GPIORead")?,
            gpio_write: resolve(&lib, protocol::SYM_GPIO_WRITE, "USBIO_GPIOWrite")?,
            _lib: lib,
        };
        Ok(Arc::new(loaded))
    }
}

/// One open USB2UIS adapter.
///
/// Only one adapter is meaningful at a time; the vendor stack indexes
/// devices but the deployments this tool targets carry a single bridge.
pub struct Usb2Uis {
    lib: Arc<Usb2UisLib>,
    index: u8,
}

impl Usb2Uis {
    /// Open the first adapter through an already-loaded vendor library.
    pub fn open(lib: Arc<Usb2UisLib>) -> Result<Self> {
        // SAFETY: exported function, no preconditions.
        let index = unsafe { (lib.open_device)() };
        if index == OPEN_NO_DEVICE {
            return Err(Usb2UisError::DeviceNotFound);
        }
        log::info!("opened USB2UIS adapter at index {}", index);
        Ok(Self { lib, index })
    }

    /// Load the library from its default name and open the adapter.
    pub fn open_default() -> Result<Self> {
        Self::open(Usb2UisLib::load(Path::new(protocol::DEFAULT_LIBRARY))?)
    }

    /// Device index assigned by the vendor stack.
    pub fn index(&self) -> u8 {
        self.index
    }

    fn check(&self, name: &'static str, ok: bool) -> CoreResult<()> {
        if ok {
            Ok(())
        } else {
            log::warn!("USB2UIS primitive {} failed", name);
            Err(CoreError::Io)
        }
    }
}

impl Drop for Usb2Uis {
    fn drop(&mut self) {
        // SAFETY: index came from a successful open on the same library.
        let ok = unsafe { (self.lib.close_device)(self.index) };
        if ok {
            log::info!("closed USB2UIS adapter at index {}", self.index);
        } else {
            log::warn!("failed to close USB2UIS adapter at index {}", self.index);
        }
    }
}

impl BridgePort for Usb2Uis {
    fn set_bus_config(&mut self, config_byte: u8, timeout_word: u32) -> CoreResult<()> {
        log::debug!(
            "SPISetConfig config=0x{:02X} timeouts=0x{:08X}",
            config_byte,
            timeout_word
        );
        // SAFETY: plain value arguments.
        let ok = unsafe { (self.lib.spi_set_config)(self.index, config_byte, timeout_word) };
        self.check("USBIO_SPISetConfig", ok)
    }

    fn spi_read(&mut self, cmd: &[u8], buf: &mut [u8]) -> CoreResult<()> {
        protocol::check_transfer_len(cmd.len(), buf.len()).map_err(CoreError::from)?;
        log::debug!("SPIRead cmd={} len={}", cmd.len(), buf.len());
        let cmd_ptr = if cmd.is_empty() { ptr::null() } else { cmd.as_ptr() };
        // SAFETY: pointers and lengths describe live slices; the vendor
        // library writes at most `buf.len()` bytes into `buf`.
        let ok = unsafe {
            (self.lib.spi_read)(
                self.index,
                cmd_ptr,
                cmd.len() as u8,
                buf.as_mut_ptr(),
                buf.len() as u16,
            )
        };
        self.check("USBIO_SPIRead", ok)
    }

    fn spi_write(&mut self, cmd: &[u8], data: &[u8]) -> CoreResult<()> {
        protocol::check_transfer_len(cmd.len(), data.len()).map_err(CoreError::from)?;
        log::debug!("SPIWrite cmd={} len={}", cmd.len(), data.len());
        let cmd_ptr = if cmd.is_empty() { ptr::null() } else { cmd.as_ptr() };
        let data_ptr = if data.is_empty() { ptr::null() } else { data.as_ptr() };
        // SAFETY: pointers and lengths describe live slices.
        let ok = unsafe {
            (self.lib.spi_write)(
                self.index,
                cmd_ptr,
                cmd.len() as u8,
                data_ptr,
                data.len() as u16,
            )
        };
        self.check("USBIO_SPIWrite", ok)
    }

    fn set_chip_select(&mut self, level: bool) -> CoreResult<()> {
        log::debug!("SetCE level={}", level);
        // SAFETY: plain value arguments.
        let ok = unsafe { (self.lib.set_ce)(self.index, level) };
        self.check("USBIO_SetCE", ok)
    }

    fn gpio_direction(&mut self) -> CoreResult<u8> {
        let mut dir = 0u8;
        // SAFETY: out-pointer to a live byte.
        let ok = unsafe { (self.lib.get_gpio_config)(self.index, &mut dir) };
        self.check("USBIO_GetGPIOConfig", ok)?;
        Ok(dir)
    }

    fn set_gpio_direction(&mut self, dir: u8) -> CoreResult<()> {
        log::debug!("SetGPIOConfig dir=0b{:08b}", dir);
        // SAFETY: plain value arguments.
        let ok = unsafe { (self.lib.set_gpio_config)(self.index, dir) };
        self.check("USBIO_SetGPIOConfig", ok)
    }

    fn gpio_read(&mut self) -> CoreResult<u8> {
        let mut value = 0u8;
        // SAFETY: out-pointer to a live byte.
        let ok = unsafe { (self.lib.gpio_read)(self.index, &mut value) };
        self.check("USBIO_GPIORead", ok)?;
        Ok(value)
    }

    fn gpio_write(&mut self, value: u8, mask: GpioPins) -> CoreResult<()> {
        log::debug!("GPIOWrite value=0b{:08b} mask=0b{:08b}", value, mask.bits());
        // SAFETY: plain value arguments.
        let ok = unsafe { (self.lib.gpio_write)(self.index, value, mask.bits()) };
        self.check("USBIO_GPIOWrite", ok)
    }
}
