use chrono::{Datelike, Months, NaiveDate};

use crate::errors::{Result, TrackerError};
use crate::types::Period;

/// calendar period of the installment at `index`, counted from the month of `start`
pub fn period_at(start: NaiveDate, index: u32) -> Result<Period> {
    // anchor on the first so month arithmetic never clamps the day
    let first = start.with_day(1).ok_or_else(|| TrackerError::InvalidDate {
        message: format!("no first day of month for {}", start),
    })?;

    let shifted = first
        .checked_add_months(Months::new(index))
        .ok_or_else(|| TrackerError::InvalidDate {
            message: format!("{} months after {} is out of range", index, start),
        })?;

    Ok(Period::new(shifted.year(), shifted.month()))
}

/// due date of a period on a fixed day of month
pub fn due_date(period: Period, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(period.year, period.month, day).ok_or_else(|| {
        TrackerError::InvalidDate {
            message: format!("day {} does not exist in {}-{:02}", day, period.year, period.month),
        }
    })
}

/// validate a month number
pub fn period(year: i32, month: u32) -> Result<Period> {
    if !(1..=12).contains(&month) {
        return Err(TrackerError::InvalidDate {
            message: format!("month must be between 1 and 12, got {}", month),
        });
    }
    Ok(Period::new(year, month))
}
