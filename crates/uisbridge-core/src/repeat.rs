//! Repeat scheduler
//!
//! Wraps a transaction in a cancellable, timed repetition loop. The loop
//! never pre-empts a transaction: cancellation is observed only at
//! iteration boundaries, after the stop conditions of the policy
//! snapshot have been checked.

use crate::bridge::BridgePort;
use crate::engine::{self, TransactionResult, TransactionSpec};
use crate::error::{Error, Result};
use crate::session::DeviceSession;
use crate::timing;

/// Maximum repeat interval, milliseconds.
pub const MAX_INTERVAL_MS: u32 = 60_000;

/// Repetition policy, read at the start of each scheduler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatPolicy {
    /// Whether to repeat at all; `false` runs the transaction once.
    pub enabled: bool,
    /// Number of iterations; `0` means unbounded until cancelled.
    pub count: u32,
    /// Yield between iterations, milliseconds (`0..=60000`).
    pub interval_ms: u32,
}

impl RepeatPolicy {
    /// Policy for a single, non-repeated transaction.
    pub fn once() -> Self {
        Self {
            enabled: false,
            count: 0,
            interval_ms: 0,
        }
    }

    /// Check the interval bound.
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms > MAX_INTERVAL_MS {
            return Err(Error::InvalidParameter(format!(
                "repeat interval {} ms exceeds {} ms",
                self.interval_ms, MAX_INTERVAL_MS
            )));
        }
        Ok(())
    }
}

/// Run `spec` repeatedly under `policy`, emitting each result.
///
/// A transaction failure aborts the whole loop and surfaces the error;
/// successful iterations are handed to `emit`. After each success the
/// loop stops when the policy is disabled or the count is reached
/// (without consulting `is_still_enabled`), then asks `is_still_enabled`
/// - a live predicate the operator can flip mid-run - and finally yields
/// for the interval. Returns the number of completed iterations.
pub fn run_repeated<P, C, E>(
    session: &mut DeviceSession<P>,
    spec: &TransactionSpec,
    policy: &RepeatPolicy,
    mut is_still_enabled: C,
    mut emit: E,
) -> Result<u32>
where
    P: BridgePort,
    C: FnMut() -> bool,
    E: FnMut(&TransactionResult),
{
    policy.validate()?;
    let mut iterations = 0u32;
    loop {
        let result = engine::execute(session, spec)?;
        emit(&result);
        iterations += 1;

        if !policy.enabled || (policy.count > 0 && iterations >= policy.count) {
            break;
        }
        if !is_still_enabled() {
            log::info!("repeat cancelled after {} iteration(s)", iterations);
            break;
        }
        timing::yield_ms(policy.interval_ms as u64);
    }
    Ok(iterations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::mock::MockPort;
    use crate::select::Direction;

    const CMD: [u8; 4] = [0x00, 0x02, 0x2B, 0x0A];

    fn read_spec() -> TransactionSpec {
        TransactionSpec::read(Direction::South, CMD.to_vec(), 4)
    }

    fn open_session(port: MockPort) -> DeviceSession<MockPort> {
        let mut session = DeviceSession::new();
        session.open(|| Ok(port)).unwrap();
        session
    }

    #[test]
    fn bounded_repeat_emits_exactly_count_results() {
        let mut session = open_session(MockPort::new());
        let policy = RepeatPolicy {
            enabled: true,
            count: 3,
            interval_ms: 0,
        };
        let mut emitted = 0;
        let mut liveness_checks = 0;
        let n = run_repeated(
            &mut session,
            &read_spec(),
            &policy,
            || {
                liveness_checks += 1;
                true
            },
            |_| emitted += 1,
        )
        .unwrap();
        assert_eq!(n, 3);
        assert_eq!(emitted, 3);
        // The count stop wins before the live predicate is consulted.
        assert_eq!(liveness_checks, 2);
    }

    #[test]
    fn unbounded_repeat_stops_on_cancellation() {
        let mut session = open_session(MockPort::new());
        let policy = RepeatPolicy {
            enabled: true,
            count: 0,
            interval_ms: 0,
        };
        let mut emitted = 0;
        let mut seen = 0;
        let n = run_repeated(
            &mut session,
            &read_spec(),
            &policy,
            || {
                seen += 1;
                seen < 2
            },
            |_| emitted += 1,
        )
        .unwrap();
        assert_eq!(n, 2);
        assert_eq!(emitted, 2);
    }

    #[test]
    fn disabled_policy_runs_once() {
        let mut session = open_session(MockPort::new());
        let mut emitted = 0;
        let n = run_repeated(
            &mut session,
            &read_spec(),
            &RepeatPolicy::once(),
            || panic!("live predicate must not be consulted for a single run"),
            |_| emitted += 1,
        )
        .unwrap();
        assert_eq!(n, 1);
        assert_eq!(emitted, 1);
    }

    #[test]
    fn failure_mid_loop_aborts_without_further_iterations() {
        // Write spec: each iteration issues a framed command write then an
        // unframed payload write. Failing the 4th spi_write call kills the
        // payload write of iteration 2.
        let port = MockPort {
            fail_write_at: Some(4),
            ..MockPort::new()
        };
        let mut session = open_session(port);
        let spec = TransactionSpec::write(Direction::South, CMD.to_vec(), vec![0x81, 0x00]);
        let policy = RepeatPolicy {
            enabled: true,
            count: 5,
            interval_ms: 0,
        };
        let mut emitted = 0;
        let err = run_repeated(&mut session, &spec, &policy, || true, |_| emitted += 1)
            .unwrap_err();
        assert_eq!(err, Error::WriteFailed);
        assert_eq!(emitted, 1);
        // No third transaction was started.
        let port = session.port_mut().unwrap();
        let command_writes = port
            .calls
            .iter()
            .filter(
                |c| matches!(c, crate::bridge::mock::Call::SpiWrite { cmd, .. } if !cmd.is_empty()),
            )
            .count();
        assert_eq!(command_writes, 2);
    }

    #[test]
    fn oversized_interval_is_rejected_before_any_transaction() {
        let mut session = open_session(MockPort::new());
        let policy = RepeatPolicy {
            enabled: true,
            count: 1,
            interval_ms: MAX_INTERVAL_MS + 1,
        };
        let err = run_repeated(&mut session, &read_spec(), &policy, || true, |_| ())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        assert!(session.port_mut().unwrap().calls.is_empty());
    }
}
