//! Probe command implementation

use uisbridge_core::session::DeviceSession;

use crate::commands::Port;

/// Run the probe command: the adapter is already open when this is
/// called, so report and close.
pub fn run_probe(
    session: &mut DeviceSession<Port>,
    backend: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Bridge adapter opened (backend: {})", backend);
    session.close()?;
    println!("Bridge adapter closed");
    Ok(())
}
