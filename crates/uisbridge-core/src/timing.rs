//! Wait primitives with two distinct contracts
//!
//! Sub-millisecond hardware settle windows use a monotonic-clock spin:
//! a scheduler sleep can overshoot by a full timeslice, which would break
//! the bus timing the target device expects. Millisecond-and-above waits
//! yield the thread instead.

use std::time::{Duration, Instant};

/// Busy-wait for `us` microseconds on the monotonic clock.
///
/// Spins the CPU; not interruptible. Use only for sub-millisecond
/// hardware settle times.
pub fn busy_wait_us(us: u64) {
    let deadline = Instant::now() + Duration::from_micros(us);
    while Instant::now() < deadline {
        std::hint::spin_loop();
    }
}

/// Cooperatively yield for `ms` milliseconds.
pub fn yield_ms(ms: u64) {
    if ms > 0 {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_wait_elapses_at_least_the_requested_time() {
        let start = Instant::now();
        busy_wait_us(500);
        assert!(start.elapsed() >= Duration::from_micros(500));
    }

    #[test]
    fn zero_waits_return_immediately() {
        busy_wait_us(0);
        yield_ms(0);
    }
}
