//! Read command implementation

use uisbridge_core::engine::TransactionSpec;
use uisbridge_core::repeat::{self, RepeatPolicy};
use uisbridge_core::session::DeviceSession;

use crate::cli::ReadArgs;
use crate::commands::{format_result, resolve_command, Port};

/// Run the read command
pub fn run_read(
    session: &mut DeviceSession<Port>,
    args: &ReadArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let command = resolve_command(&args.txn.source)?;
    session.configure(&args.txn.bus.to_config())?;

    let spec = TransactionSpec::read(args.txn.direction, command, args.len as usize)
        .with_dummy_count(args.txn.dummy as usize)
        .with_inter_phase_delay_ms(args.txn.delay);

    let policy = if args.txn.repeat.repeat {
        RepeatPolicy {
            enabled: true,
            count: args.txn.repeat.count,
            interval_ms: args.txn.repeat.interval,
        }
    } else {
        RepeatPolicy::once()
    };

    let iterations = repeat::run_repeated(
        session,
        &spec,
        &policy,
        || true,
        |result| println!("{}", format_result(result)),
    )?;
    log::info!("completed {} read transaction(s)", iterations);

    Ok(())
}
