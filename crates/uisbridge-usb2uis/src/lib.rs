//! uisbridge-usb2uis - USB2UIS adapter support
//!
//! This crate binds the vendor-supplied USB2UIS dynamic library and
//! exposes the adapter through the core `BridgePort` trait. The vendor
//! library owns the USB plumbing; every primitive here maps onto exactly
//! one exported `USBIO_*` function.
//!
//! The vendor ABI reports plain success flags with no partial-transfer
//! counts, so a `false` return is treated as total failure of that call.
//!
//! # Example
//!
//! ```no_run
//! use uisbridge_usb2uis::{Usb2Uis, Usb2UisLib};
//!
//! let lib = Usb2UisLib::load(std::path::Path::new(uisbridge_usb2uis::DEFAULT_LIBRARY))?;
//! let adapter = Usb2Uis::open(lib)?;
//! # Ok::<(), uisbridge_usb2uis::Usb2UisError>(())
//! ```

mod device;
mod error;
mod protocol;

pub use device::{Usb2Uis, Usb2UisLib};
pub use error::{Result, Usb2UisError};
pub use protocol::{DEFAULT_LIBRARY, MAX_CMD_LEN, MAX_DATA_LEN, OPEN_NO_DEVICE};
