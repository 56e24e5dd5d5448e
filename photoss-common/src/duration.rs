use std::str::FromStr;
use std::time::Duration;

use crate::error::{PhotossError, Result, ValidationError};

pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

/// Parses the persisted `delay` setting.
///
/// A bare whole number is seconds, which is what the settings dialog writes.
/// Human readable durations such as `30s` or `2m` are accepted as well.
/// Only whole seconds are stored, so anything shorter than one second or
/// with a fractional second part is rejected.
pub fn parse_delay(delay_str: &str) -> Result<Duration> {
    let trimmed = delay_str.trim();
    let delay = match trimmed.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => humantime::Duration::from_str(trimmed)
            .map(Into::into)
            .map_err(|_| invalid_delay(delay_str))?,
    };

    if delay < Duration::from_secs(1) || delay.subsec_nanos() != 0 {
        return Err(invalid_delay(delay_str));
    }
    Ok(delay)
}

fn invalid_delay(delay_str: &str) -> PhotossError {
    PhotossError::Validation(ValidationError::InvalidDelay {
        delay: delay_str.to_string(),
    })
}
