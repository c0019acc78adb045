//! Write command implementation

use uisbridge_core::engine::TransactionSpec;
use uisbridge_core::hex;
use uisbridge_core::repeat::{self, RepeatPolicy};
use uisbridge_core::session::DeviceSession;

use crate::cli::WriteArgs;
use crate::commands::{format_result, resolve_command, Port};

/// Run the write command
pub fn run_write(
    session: &mut DeviceSession<Port>,
    args: &WriteArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let command = resolve_command(&args.txn.source)?;
    let data = hex::parse(&args.data)?;
    session.configure(&args.txn.bus.to_config())?;

    let spec = TransactionSpec::write(args.txn.direction, command, data)
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
    log::info!("completed {} write transaction(s)", iterations);

    Ok(())
}
