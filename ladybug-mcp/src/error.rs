//! Structured tool errors for LLM consumption
//!
//! Every failure a tool can hit is reported as a code, a message and,
//! when there is an obvious next step, a suggestion.

use ladybug_datatype::{DataTypeError, DATA_TYPES};
use ladybug_epw::EpwError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const INVALID_ARGS: &str = "INVALID_ARGS";
    pub const UNKNOWN_TOOL: &str = "UNKNOWN_TOOL";
    pub const TYPE_NOT_FOUND: &str = "TYPE_NOT_FOUND";
    pub const UNRECOGNIZED_UNIT: &str = "UNRECOGNIZED_UNIT";
    pub const MISSING_DEFAULT_UNIT: &str = "MISSING_DEFAULT_UNIT";
    pub const INVALID_RECORD: &str = "INVALID_RECORD";
    // Weather-file error codes
    pub const FILE_NOT_FOUND: &str = "FILE_NOT_FOUND";
    pub const NOT_EPW: &str = "NOT_EPW";
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const MALFORMED_WEATHER: &str = "MALFORMED_WEATHER";
    pub const INVALID_PERIOD: &str = "INVALID_PERIOD";
    pub const NO_DATA: &str = "NO_DATA";
    pub const UNKNOWN_FIELD: &str = "UNKNOWN_FIELD";
    pub const INVALID_URI: &str = "INVALID_URI";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn invalid_args(details: impl Into<String>) -> Self {
        Self::new(codes::INVALID_ARGS, format!("Invalid arguments: {}", details.into()))
            .with_suggestion("Check the tool's inputSchema with tools/list")
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(codes::UNKNOWN_TOOL, format!("Unknown tool: {}", name))
            .with_suggestion("Use tools/list to see available tools")
    }

    pub fn invalid_uri(uri: &str) -> Self {
        Self::new(codes::INVALID_URI, format!("Invalid URI: {}", uri))
            .with_suggestion("Expected ladybug://weather/{name}")
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

impl From<DataTypeError> for ToolError {
    fn from(err: DataTypeError) -> Self {
        let message = err.to_string();
        match err {
            DataTypeError::TypeNotFound(_) => Self::new(codes::TYPE_NOT_FOUND, message)
                .with_suggestion("Use list_units to see every data type and its units"),
            DataTypeError::UnrecognizedUnit { data_type, .. } => {
                let error = Self::new(codes::UNRECOGNIZED_UNIT, message);
                match DATA_TYPES.type_by_name(&data_type) {
                    Ok(known) => error.with_suggestion(format!("Accepted units: {}", known.units_summary())),
                    Err(_) => error,
                }
            }
            DataTypeError::MissingDefaultUnit { .. } => Self::new(codes::MISSING_DEFAULT_UNIT, message)
                .with_suggestion("Use convert with an explicit target unit"),
            DataTypeError::Construction(_) | DataTypeError::Json(_) => {
                Self::new(codes::INVALID_RECORD, message)
            }
        }
    }
}

impl From<EpwError> for ToolError {
    fn from(err: EpwError) -> Self {
        let message = err.to_string();
        match err {
            EpwError::InvalidPath(_) => Self::new(codes::FILE_NOT_FOUND, message)
                .with_suggestion("Use resources/list to see available weather files"),
            EpwError::NotEpw(_) => Self::new(codes::NOT_EPW, message),
            EpwError::Io(_) => Self::new(codes::IO_ERROR, message),
            EpwError::MissingLocation | EpwError::MalformedRow { .. } => {
                Self::new(codes::MALFORMED_WEATHER, message)
            }
            EpwError::InvalidDateTime { .. } | EpwError::InvalidTimestep => {
                Self::new(codes::INVALID_PERIOD, message)
                    .with_suggestion("Months are 1-12, hours are 1-24, timestep is at least 1")
            }
            EpwError::NoData { .. } => Self::new(codes::NO_DATA, message),
            EpwError::UnknownField(_) => Self::new(codes::UNKNOWN_FIELD, message).with_suggestion(
                "Fields: modelYear, dbTemp, dewPoint, RH, windSpeed, windDir, dirRad, difRad, \
                 glbRad, dirIll, difIll, glbIll, cloudCov, rainDepth, barPress",
            ),
            EpwError::DataType(inner) => Self::from(inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_unit_suggests_accepted_units() {
        let err = ToolError::from(DataTypeError::UnrecognizedUnit {
            unit: "furlong".to_string(),
            data_type: "Distance".to_string(),
        });
        assert_eq!(err.code, codes::UNRECOGNIZED_UNIT);
        assert_eq!(err.suggestion.as_deref(), Some("Accepted units: Distance: m, ft, mm, in, km, mi, cm"));
    }

    #[test]
    fn test_weather_errors_unwrap_data_type_errors() {
        let err = ToolError::from(EpwError::DataType(DataTypeError::TypeNotFound("x".to_string())));
        assert_eq!(err.code, codes::TYPE_NOT_FOUND);

        let err = ToolError::from(EpwError::InvalidTimestep);
        assert_eq!(err.code, codes::INVALID_PERIOD);
    }

    #[test]
    fn test_display() {
        let err = ToolError::unknown_tool("frobnicate");
        assert_eq!(
            err.to_string(),
            "[UNKNOWN_TOOL] Unknown tool: frobnicate (suggestion: Use tools/list to see available tools)"
        );
        let json = serde_json::to_value(ToolError::new(codes::NO_DATA, "gone")).unwrap();
        assert!(json.get("suggestion").is_none());
    }
}
