//! Error types for uisbridge-core

use thiserror::Error;

/// Result type alias using the core [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type.
///
/// Transaction-phase failures (`DummyWriteFailed`, `CommandWriteFailed`,
/// `ReadFailed`, `WriteFailed`, `SelectFailed`) always leave the
/// chip-select line at idle; the engine forces it back before returning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Hex text could not be parsed; carries the offending token.
    #[error("invalid hex token `{0}`")]
    InvalidFormat(String),

    /// Command byte sequence has the wrong length.
    #[error("command must be exactly 4 bytes, got {0}")]
    InvalidCommandLength(usize),

    /// Dummy preamble count exceeds the adapter limit.
    #[error("dummy count {0} exceeds 256")]
    DummyCountTooLarge(usize),

    /// Requested transfer does not fit the adapter's 16-bit length field.
    #[error("transfer of {0} bytes exceeds the adapter limit of 65535")]
    TransferTooLong(usize),

    /// A caller-supplied parameter could not be interpreted.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No adapter session is open.
    #[error("no adapter session open")]
    NotConnected,

    /// An adapter session is already open.
    #[error("adapter session already open")]
    AlreadyConnected,

    /// Opening the adapter found no device.
    #[error("no bridge adapter found")]
    NoDeviceFound,

    /// The adapter rejected the bus configuration.
    #[error("adapter rejected the bus configuration")]
    ConfigFailed,

    /// An adapter primitive reported failure.
    #[error("adapter I/O failed")]
    Io,

    /// Chip-select routing failed; the line was forced back to idle.
    #[error("chip-select routing failed")]
    SelectFailed,

    /// The dummy preamble write failed; transaction aborted.
    #[error("dummy preamble write failed")]
    DummyWriteFailed,

    /// The command-phase write failed; transaction aborted.
    #[error("command write failed")]
    CommandWriteFailed,

    /// The data-phase read failed; transaction aborted.
    #[error("SPI read failed")]
    ReadFailed,

    /// The data-phase write failed; transaction aborted.
    #[error("SPI write failed")]
    WriteFailed,
}
