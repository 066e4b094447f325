//! Errors raised by data type lookup, conversion and construction

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which default unit system a request asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Si,
    Ip,
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitSystem::Si => write!(f, "SI"),
            UnitSystem::Ip => write!(f, "IP"),
        }
    }
}

/// Error type for data type operations
#[derive(Debug, Error)]
pub enum DataTypeError {
    /// Name-only or unit-only lookup matched no built-in category
    #[error("Data type not found: {0}")]
    TypeNotFound(String),

    /// A conversion was asked for a unit the data type does not accept
    #[error("Unrecognized unit '{unit}' for data type {data_type}")]
    UnrecognizedUnit { unit: String, data_type: String },

    /// A conversion table or serialized record is malformed
    #[error("Cannot construct data type: {0}")]
    Construction(String),

    /// `to_si`/`to_ip` on a type that declares no default for that system
    #[error("Data type {data_type} has no default {system} unit")]
    MissingDefaultUnit { data_type: String, system: UnitSystem },

    #[error("Invalid data type record: {0}")]
    Json(#[from] serde_json::Error),
}

impl DataTypeError {
    pub(crate) fn unrecognized(unit: &str, data_type: &str) -> Self {
        DataTypeError::UnrecognizedUnit {
            unit: unit.to_string(),
            data_type: data_type.to_string(),
        }
    }

    pub(crate) fn construction(details: impl Into<String>) -> Self {
        DataTypeError::Construction(details.into())
    }
}
