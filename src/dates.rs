// Night counting for date-range categories
use chrono::{DateTime, Utc};
use thiserror::Error;

pub const MILLIS_PER_DAY: i64 = 86_400_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("check-out {check_out} must be after check-in {check_in}")]
    NotAfterCheckIn {
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    },
}

/// Nights between check-in and check-out, any partial day counting as a full night.
pub fn nights_between(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> Result<u32, DateRangeError> {
    let millis = (check_out - check_in).num_milliseconds();
    if millis <= 0 {
        return Err(DateRangeError::NotAfterCheckIn {
            check_in,
            check_out,
        });
    }

    // ceil for positive values
    let nights = (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;
    // chrono's whole range spans fewer than u32::MAX days
    Ok(u32::try_from(nights).unwrap_or(u32::MAX))
}
