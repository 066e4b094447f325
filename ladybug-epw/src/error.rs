//! Errors raised while reading weather files and building analysis periods

use std::path::PathBuf;
use ladybug_datatype::DataTypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EpwError {
    #[error("{} is not a valid file path", .0.display())]
    InvalidPath(PathBuf),

    #[error("{} is not an .epw file", .0.display())]
    NotEpw(PathBuf),

    #[error("Failed to read weather file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Weather file does not start with a LOCATION line")]
    MissingLocation,

    #[error("Malformed weather data at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// Hours are 1-based (1..=24), dates fall in the leap reference year
    #[error("Invalid date/time: month {month}, day {day}, hour {hour}")]
    InvalidDateTime { month: u32, day: u32, hour: u32 },

    #[error("Analysis period timestep must be at least one hour")]
    InvalidTimestep,

    #[error("No weather data for {month}/{day} hour {hour}")]
    NoData { month: u32, day: u32, hour: u32 },

    #[error("Unknown weather field '{0}'")]
    UnknownField(String),

    #[error(transparent)]
    DataType(#[from] DataTypeError),
}

impl EpwError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        EpwError::MalformedRow { line, reason: reason.into() }
    }
}
