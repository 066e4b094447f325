//! Ladybug EPW - Weather files and analysis periods
//!
//! Reads EnergyPlus weather (`.epw`) files into hourly records keyed by
//! timestamp and slices them by [`AnalysisPeriod`]. Every series carries a
//! [`DataHeader`] whose data type comes from the `ladybug-datatype` registry,
//! so values convert between units the same way the core does.

mod error;
mod field;
mod period;
mod epw;

pub use error::EpwError;
pub use field::WeatherField;
pub use period::{days_in_month, month_day_hour, timestamp, AnalysisPeriod, REFERENCE_YEAR};
pub use epw::{DataHeader, Epw, HourlyData, HourlyRecord, Location};
