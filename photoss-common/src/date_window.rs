//! "This week in history" date matching.

use std::fs::Metadata;

use chrono::{DateTime, Datelike, Days, Local, NaiveDate};

/// Half width of the history window in days.
pub const WINDOW_DAYS: u64 = 7;

/// Returns true when `created` falls in the week around `reference`, in any year.
///
/// Month and day-of-month are each checked against the bounds of
/// `reference - 7 days` and `reference + 7 days` as independent integers. This
/// is not a calendar distance: when the window straddles a month boundary the
/// day range inverts and nothing matches.
pub fn is_within_window(created: NaiveDate, reference: NaiveDate) -> bool {
    let lower = reference
        .checked_sub_days(Days::new(WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let upper = reference
        .checked_add_days(Days::new(WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);

    created.month() >= lower.month()
        && created.month() <= upper.month()
        && created.day() >= lower.day()
        && created.day() <= upper.day()
}

/// Local creation date of a file.
///
/// Filesystems without a birth time report the last modification instead.
pub fn created_date(metadata: &Metadata) -> Option<NaiveDate> {
    let timestamp = metadata.created().or_else(|_| metadata.modified()).ok()?;
    Some(DateTime::<Local>::from(timestamp).date_naive())
}
