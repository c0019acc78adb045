//! Command implementations

pub mod lists;
pub mod probe;
pub mod read;
pub mod write;

use std::time::{SystemTime, UNIX_EPOCH};

use uisbridge_core::catalog::Catalog;
use uisbridge_core::engine::{TransactionResult, TransferKind};
use uisbridge_core::hex;

use crate::cli::CommandSource;

/// The port type every command operates on.
pub type Port = Box<dyn uisbridge_core::bridge::BridgePort + Send>;

/// Resolve the 4 command bytes from `--cmd` or a catalog entry.
pub fn resolve_command(source: &CommandSource) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    if let Some(text) = &source.cmd {
        return Ok(hex::parse(text)?);
    }
    if let (Some(path), Some(entry)) = (&source.catalog, &source.label) {
        let (list, label) = entry
            .split_once(':')
            .ok_or("catalog entry must be addressed as list:label")?;
        let catalog = Catalog::from_file(path)?;
        let entry = catalog
            .find(list, label)
            .ok_or_else(|| format!("no entry `{}` in list `{}`", label, list))?;
        return Ok(entry.bytes.clone());
    }
    Err("a command is required (--cmd or --catalog with --label)".into())
}

/// Render one result the way the original tool logged it:
/// `[HH:MM:SS.mmm] Read : 0xDE 0xAD ...`
pub fn format_result(result: &TransactionResult) -> String {
    let verb = match result.kind {
        TransferKind::Read => "Read ",
        TransferKind::Write => "Wrote",
    };
    format!(
        "[{}] {}: {}",
        format_timestamp(result.timestamp),
        verb,
        hex::format(&result.bytes)
    )
}

/// Wall-clock time of day (UTC) as `HH:MM:SS.mmm`.
fn format_timestamp(ts: SystemTime) -> String {
    let since = ts.duration_since(UNIX_EPOCH).unwrap_or_default();
    let secs = since.as_secs() % 86_400;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60,
        since.subsec_millis()
    )
}
