//! Timestamp normalization

use chrono::{DateTime, Local, SubsecRound, TimeZone};

/// Reduce `timestamp` to whole seconds and re-express it in local time.
///
/// The sub-second part is dropped (flooring, so the Unix seconds value of
/// the result equals `timestamp.timestamp()`) and the original offset is
/// discarded.
pub fn normalize_timestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> DateTime<Local> {
    timestamp.with_timezone(&Local).trunc_subsecs(0)
}
