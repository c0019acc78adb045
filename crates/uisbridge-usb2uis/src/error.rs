//! Error types for the USB2UIS backend

use thiserror::Error;

/// Result type for USB2UIS operations.
pub type Result<T> = std::result::Result<T, Usb2UisError>;

/// Errors raised while loading or driving the vendor library.
#[derive(Debug, Error)]
pub enum Usb2UisError {
    /// The vendor library could not be loaded.
    #[error("failed to load vendor library `{path}`: {source}")]
    LibraryLoad {
        /// Path that was tried.
        path: String,
        /// Loader error.
        #[source]
        source: libloading::Error,
    },

    /// The vendor library does not export a required symbol.
    #[error("vendor library is missing symbol `{0}`")]
    MissingSymbol(&'static str),

    /// `USBIO_OpenDevice` reported no adapter.
    #[error("no USB2UIS adapter found")]
    DeviceNotFound,

    /// Command region exceeds the ABI's 8-bit length field.
    #[error("SPI command region of {0} bytes exceeds the 255 byte limit")]
    CommandTooLong(usize),

    /// Data region exceeds the ABI's 16-bit length field.
    #[error("SPI data region of {0} bytes exceeds the 65535 byte limit")]
    DataTooLong(usize),

    /// A vendor primitive reported failure.
    #[error("adapter primitive `{0}` reported failure")]
    Primitive(&'static str),
}

impl From<Usb2UisError> for uisbridge_core::Error {
    fn from(e: Usb2UisError) -> Self {
        match e {
            Usb2UisError::DeviceNotFound => uisbridge_core::Error::NoDeviceFound,
            _ => uisbridge_core::Error::Io,
        }
    }
}
