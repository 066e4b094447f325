//! Analysis periods: a date range with a daily hour window

use std::fmt;
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use crate::EpwError;

/// Year every weather timestamp is mapped into. Leap, so Feb 29 is valid.
pub const REFERENCE_YEAR: i32 = 2000;

/// Timestamp for a 1-based hour of a day in the reference year
pub fn timestamp(month: u32, day: u32, hour: u32) -> Result<NaiveDateTime, EpwError> {
    let invalid = || EpwError::InvalidDateTime { month, day, hour };
    if !(1..=24).contains(&hour) {
        return Err(invalid());
    }
    NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day)
        .and_then(|date| date.and_hms_opt(hour - 1, 0, 0))
        .ok_or_else(invalid)
}

/// Number of days in a month of the reference year
pub fn days_in_month(month: u32) -> Result<u32, EpwError> {
    let first = NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, 1)
        .ok_or(EpwError::InvalidDateTime { month, day: 1, hour: 1 })?;
    let next = first
        .checked_add_months(Months::new(1))
        .ok_or(EpwError::InvalidDateTime { month, day: 1, hour: 1 })?;
    Ok((next - first).num_days() as u32)
}

/// (month, day, 1-based hour) of a timestamp
pub fn month_day_hour(time: &NaiveDateTime) -> (u32, u32, u32) {
    (time.month(), time.day(), time.hour() + 1)
}

/// Dates between a start and an end, restricted to the same hours every day.
///
/// 2/20 9h to 2/22 17h means hours 9 through 17 on each of Feb 20, 21 and
/// 22. When the start hour is later than the end hour the daily window wraps
/// past midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPeriod {
    start: NaiveDateTime,
    end: NaiveDateTime,
    timestep: u32,
    overnight: bool,
}

impl AnalysisPeriod {
    pub fn new(
        st_month: u32,
        st_day: u32,
        st_hour: u32,
        end_month: u32,
        end_day: u32,
        end_hour: u32,
        timestep: u32,
    ) -> Result<Self, EpwError> {
        if timestep == 0 {
            return Err(EpwError::InvalidTimestep);
        }
        Ok(AnalysisPeriod {
            start: timestamp(st_month, st_day, st_hour)?,
            end: timestamp(end_month, end_day, end_hour)?,
            timestep,
            overnight: st_hour > end_hour,
        })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Step between timestamps, in hours
    pub fn timestep(&self) -> u32 {
        self.timestep
    }

    pub fn is_overnight(&self) -> bool {
        self.overnight
    }

    pub fn is_time_included(&self, time: &NaiveDateTime) -> bool {
        if *time < self.start || *time > self.end {
            return false;
        }
        let hour = time.hour();
        if self.overnight {
            hour >= self.start.hour() || hour <= self.end.hour()
        } else {
            (self.start.hour()..=self.end.hour()).contains(&hour)
        }
    }

    /// Every included timestamp from start to end, one timestep apart
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        let step = Duration::hours(i64::from(self.timestep));
        let mut timestamps = Vec::new();
        let mut current = self.start;
        while current <= self.end {
            if self.is_time_included(&current) {
                timestamps.push(current);
            }
            current += step;
        }
        timestamps
    }
}

impl Default for AnalysisPeriod {
    /// The whole reference year, hourly
    fn default() -> Self {
        AnalysisPeriod {
            start: NaiveDate::from_ymd_opt(REFERENCE_YEAR, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(REFERENCE_YEAR, 12, 31)
                .and_then(|d| d.and_hms_opt(23, 0, 0))
                .unwrap_or_default(),
            timestep: 1,
            overnight: false,
        }
    }
}

impl fmt::Display for AnalysisPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (st_month, st_day, st_hour) = month_day_hour(&self.start);
        let (end_month, end_day, end_hour) = month_day_hour(&self.end);
        write!(
            f,
            "{}/{} to {}/{} between {} to {} @{}",
            st_month, st_day, end_month, end_day, st_hour, end_hour, self.timestep
        )
    }
}
