use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Human-readable elapsed time: whole nanoseconds below a microsecond, then
/// µs, ms or s with two decimals.
pub fn format_elapsed(elapsed: Duration) -> String {
    let nanos = elapsed.as_nanos();
    if nanos < NANOS_PER_MICRO {
        format!("{nanos}ns")
    } else if nanos < NANOS_PER_MILLI {
        format!("{:.2}µs", nanos as f64 / NANOS_PER_MICRO as f64)
    } else if nanos < NANOS_PER_SEC {
        format!("{:.2}ms", nanos as f64 / NANOS_PER_MILLI as f64)
    } else {
        format!("{:.2}s", nanos as f64 / NANOS_PER_SEC as f64)
    }
}
