use crate::types::Error;

use rust_decimal::Decimal;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Start measuring. Reset `start` to now.
pub fn measure_start(start: &mut Instant) {
    *start = Instant::now();
}

/// Stop measuring, log the elapsed time if `print` is true.
pub fn measure_end(start: &Instant, print: bool) -> Duration {
    let elapsed = start.elapsed();
    if print {
        info!(elapsed_ms = elapsed.as_secs_f64() * 1000.0, "command finished");
    }
    elapsed
}

/// Report an error of a command to the user. Nothing here is fatal.
pub fn print_error_if_necessary(e: Error) {
    match e {
        Error::ExchangeQuery { status, code, msg } => {
            error!(status, code = ?code, "exchange rejected the request: {}", msg);
        }
        e => error!("{}", e),
    }
}

/// Round a quantity derived from a notional amount down to a size the
/// exchange's lot filters commonly accept, coarser as the quantity grows.
///
/// Quantities of 10 or less round half to even at 3 places rather than
/// flooring, so they can round up. Keep it that way: existing sizing relies on it.
pub fn round_qty(qty: Decimal) -> Decimal {
    let floor_to = |step: u32| {
        let step = Decimal::from(step);
        (qty / step).floor() * step
    };

    if qty > Decimal::from(10_000) {
        floor_to(1000)
    } else if qty > Decimal::from(1000) {
        floor_to(100)
    } else if qty > Decimal::from(100) {
        floor_to(10)
    } else if qty > Decimal::from(10) {
        qty.floor()
    } else {
        qty.round_dp(3)
    }
}
