//! Resolving a canonical timezone name to the current UTC offset.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Resolve `canonical_timezone` (e.g. "Asia/Kolkata") to its current UTC
/// offset, or `None` if the name is not a known IANA timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    let timezone = time_tz::timezones::get_by_name(canonical_timezone)?;

    Some(timezone.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}
