//! Backend registry
//!
//! Maps a backend name from the command line onto an opened
//! `BridgePort` trait object.

use std::path::Path;

use uisbridge_core::bridge::BridgePort;
use uisbridge_dummy::EmulatedBridge;
use uisbridge_usb2uis::{Usb2Uis, Usb2UisLib};

/// Names accepted by `--backend`.
pub fn names() -> Vec<&'static str> {
    vec!["usb2uis", "dummy"]
}

/// Open the named backend.
pub fn open_backend(
    name: &str,
    library: Option<&Path>,
) -> Result<Box<dyn BridgePort + Send>, Box<dyn std::error::Error>> {
    match name {
        "usb2uis" => {
            let path = library.unwrap_or_else(|| Path::new(uisbridge_usb2uis::DEFAULT_LIBRARY));
            let lib = Usb2UisLib::load(path)?;
            Ok(Box::new(Usb2Uis::open(lib)?))
        }
        "dummy" => {
            if library.is_some() {
                log::warn!("--library is ignored by the dummy backend");
            }
            Ok(Box::new(EmulatedBridge::with_read_pattern(vec![
                0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x11, 0x22, 0x33,
            ])))
        }
        other => Err(format!(
            "unknown backend `{}` (available: {})",
            other,
            names().join(", ")
        )
        .into()),
    }
}
