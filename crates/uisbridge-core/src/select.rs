//! Chip-select routing
//!
//! The adapter exposes chip-select on two physically different pins
//! depending on which side of the target board it is mounted on. South
//! deployments use the dedicated select line; North deployments gate the
//! select through GPIO pin IO1. The router maps a logical assert/idle
//! intent onto the right primitive sequence so the transaction engine
//! stays orientation-agnostic.
//!
//! The select line is active-low in both routings: asserting drives the
//! pin low, idling drives it high.

use crate::bridge::{BridgePort, GpioPins};
use crate::error::{Error, Result};

/// Board orientation, selecting which pin carries chip-select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Chip-select routed through GPIO pin IO1.
    North,
    /// Chip-select on the dedicated select line.
    South,
}

impl std::str::FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Self::North),
            "south" | "s" => Ok(Self::South),
            _ => Err(Error::InvalidParameter(format!(
                "unknown direction `{}` (expected north or south)",
                s
            ))),
        }
    }
}

/// GPIO pin carrying chip-select in the North orientation.
pub const SELECT_PIN: GpioPins = GpioPins::IO1;

/// Electrical level of an idle select line.
const IDLE_LEVEL: bool = true;

/// Drive the chip-select for `direction` to asserted or idle.
///
/// North routing never rewrites more than the IO1 bit: the GPIO value
/// byte is read back and the write is masked to the single select pin,
/// so the other pins keep whatever level their owners gave them.
pub fn set_select<P: BridgePort>(port: &mut P, direction: Direction, asserted: bool) -> Result<()> {
    let level = !asserted;
    match direction {
        Direction::South => port
            .set_chip_select(level)
            .map_err(|_| Error::SelectFailed),
        Direction::North => {
            let value = port.gpio_read().map_err(|_| Error::SelectFailed)?;
            let value = if level {
                value | SELECT_PIN.bits()
            } else {
                value & !SELECT_PIN.bits()
            };
            port.gpio_write(value, SELECT_PIN)
                .map_err(|_| Error::SelectFailed)
        }
    }
}

/// One-time idle normalization before a transaction.
///
/// North: park the dedicated line at idle, make IO1 an output (the
/// direction byte is read-modify-written, other pins keep their
/// direction) and raise IO1 to idle. South needs nothing; the dedicated
/// line is already the transaction's own signal.
pub fn normalize_idle<P: BridgePort>(port: &mut P, direction: Direction) -> Result<()> {
    if direction == Direction::North {
        port.set_chip_select(IDLE_LEVEL)
            .map_err(|_| Error::SelectFailed)?;
        let dir = port.gpio_direction().map_err(|_| Error::SelectFailed)?;
        port.set_gpio_direction(dir & !SELECT_PIN.bits())
            .map_err(|_| Error::SelectFailed)?;
        set_select(port, direction, false)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::mock::{Call, MockPort};

    #[test]
    fn south_assert_drives_line_low() {
        let mut port = MockPort::new();
        set_select(&mut port, Direction::South, true).unwrap();
        set_select(&mut port, Direction::South, false).unwrap();
        assert_eq!(port.select_levels(), vec![false, true]);
    }

    #[test]
    fn south_touches_no_gpio() {
        let mut port = MockPort::new();
        set_select(&mut port, Direction::South, true).unwrap();
        assert!(port
            .calls
            .iter()
            .all(|c| matches!(c, Call::Select { .. })));
    }

    #[test]
    fn north_assert_clears_only_io1() {
        let mut port = MockPort::new();
        port.gpio_value = 0b1010_1111;
        set_select(&mut port, Direction::North, true).unwrap();
        // IO1 dropped, everything else untouched.
        assert_eq!(port.gpio_value, 0b1010_1101);
        assert!(matches!(
            port.calls.last(),
            Some(Call::GpioWrite { mask, .. }) if *mask == SELECT_PIN.bits()
        ));
    }

    #[test]
    fn north_idle_raises_only_io1() {
        let mut port = MockPort::new();
        port.gpio_value = 0b0000_0000;
        set_select(&mut port, Direction::North, false).unwrap();
        assert_eq!(port.gpio_value, 0b0000_0010);
    }

    #[test]
    fn north_never_drives_dedicated_line() {
        let mut port = MockPort::new();
        set_select(&mut port, Direction::North, true).unwrap();
        set_select(&mut port, Direction::North, false).unwrap();
        assert_eq!(port.select_levels(), Vec::<bool>::new());
    }

    #[test]
    fn normalize_idle_south_is_a_no_op() {
        let mut port = MockPort::new();
        normalize_idle(&mut port, Direction::South).unwrap();
        assert!(port.calls.is_empty());
    }

    #[test]
    fn normalize_idle_north_makes_io1_an_idle_output() {
        let mut port = MockPort::new();
        port.gpio_dir = 0xFF;
        port.gpio_value = 0x00;
        normalize_idle(&mut port, Direction::North).unwrap();
        // Dedicated line parked at idle once.
        assert_eq!(port.select_levels(), vec![true]);
        // IO1 direction cleared to output, others still inputs.
        assert_eq!(port.gpio_dir, 0xFF & !SELECT_PIN.bits());
        // IO1 level raised to idle.
        assert_eq!(port.gpio_value & SELECT_PIN.bits(), SELECT_PIN.bits());
    }
}
