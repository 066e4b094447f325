//! Data types: one measurement category and the conversions it supports

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::category::Category;
use crate::error::{DataTypeError, UnitSystem};
use crate::factor::{ConversionEntry, ConversionTable, TableKind};

/// Value of the `type` field on every serialized data type
pub const DATA_TYPE_MARKER: &str = "DataType";

/// Conversion capability shared by every data type.
///
/// Code that accepts "something that converts units" should take
/// `&dyn UnitConversion` rather than a concrete type.
pub trait UnitConversion {
    fn name(&self) -> &str;

    /// Accepted unit labels; the first one is the canonical unit
    fn units(&self) -> &[String];

    fn si_unit(&self) -> Option<&str>;

    fn ip_unit(&self) -> Option<&str>;

    fn is_unit_acceptable(&self, unit: &str) -> bool;

    /// Convert `values` from `from_unit` to `unit`, element-wise
    fn to_unit(&self, values: &[f64], unit: &str, from_unit: &str) -> Result<Vec<f64>, DataTypeError>;

    /// Convert to the SI default unit, returning the values and its label
    fn to_si(&self, values: &[f64], from_unit: &str) -> Result<(Vec<f64>, String), DataTypeError> {
        let target = self.si_unit().ok_or_else(|| DataTypeError::MissingDefaultUnit {
            data_type: self.name().to_string(),
            system: UnitSystem::Si,
        })?;
        Ok((self.to_unit(values, target, from_unit)?, target.to_string()))
    }

    /// Convert to the IP default unit, returning the values and its label
    fn to_ip(&self, values: &[f64], from_unit: &str) -> Result<(Vec<f64>, String), DataTypeError> {
        let target = self.ip_unit().ok_or_else(|| DataTypeError::MissingDefaultUnit {
            data_type: self.name().to_string(),
            system: UnitSystem::Ip,
        })?;
        Ok((self.to_unit(values, target, from_unit)?, target.to_string()))
    }

    /// Capability marker
    fn is_data_type(&self) -> bool {
        true
    }
}

/// Where a data type came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeKind {
    /// One of the registered categories
    Builtin(Category),
    /// Caller-defined category with its own conversion table
    Custom,
    /// Synthesized for an unknown name; at most one unit, identity conversion
    Generic,
}

/// A measurement category with its accepted units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DataTypeRecord", into = "DataTypeRecord")]
pub struct DataType {
    name: String,
    kind: DataTypeKind,
    units: Vec<String>,
    si_unit: Option<String>,
    ip_unit: Option<String>,
    table: Option<ConversionTable>,
}

impl DataType {
    pub fn builtin(category: Category) -> Self {
        let table = category.table();
        DataType {
            name: category.name().to_string(),
            kind: DataTypeKind::Builtin(category),
            units: table.units(),
            si_unit: Some(category.si_unit().to_string()),
            ip_unit: Some(category.ip_unit().to_string()),
            table: Some(table),
        }
    }

    /// A caller-defined category. Default units must be in the table.
    pub fn custom(
        name: &str,
        table: ConversionTable,
        si_unit: Option<&str>,
        ip_unit: Option<&str>,
    ) -> Result<Self, DataTypeError> {
        for default in [si_unit, ip_unit].into_iter().flatten() {
            if !table.contains(default) {
                return Err(DataTypeError::construction(format!(
                    "default unit '{}' is not accepted by {}", default, name
                )));
            }
        }
        Ok(DataType {
            name: name.to_string(),
            kind: DataTypeKind::Custom,
            units: table.units(),
            si_unit: si_unit.map(str::to_string),
            ip_unit: ip_unit.map(str::to_string),
            table: Some(table),
        })
    }

    /// A generic type carrying one unit, or none for a unitless type
    pub fn new_generic(name: &str, unit: Option<&str>) -> Self {
        DataType {
            name: name.to_string(),
            kind: DataTypeKind::Generic,
            units: unit.map(|u| vec![u.to_string()]).unwrap_or_default(),
            si_unit: None,
            ip_unit: None,
            table: None,
        }
    }

    pub fn kind(&self) -> DataTypeKind {
        self.kind
    }

    pub fn category(&self) -> Option<Category> {
        match self.kind {
            DataTypeKind::Builtin(category) => Some(category),
            _ => None,
        }
    }

    pub fn is_generic(&self) -> bool {
        self.kind == DataTypeKind::Generic
    }

    /// A type with no units at all
    pub fn is_unitless(&self) -> bool {
        self.units.is_empty()
    }

    pub fn table(&self) -> Option<&ConversionTable> {
        self.table.as_ref()
    }

    /// One-line summary: `Name: u1, u2, ...`
    pub fn units_summary(&self) -> String {
        format!("{}: {}", self.name, self.units.join(", "))
    }

    /// Serialize to a compact JSON record
    pub fn to_json(&self) -> Result<String, DataTypeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rebuild a data type from a record produced by [`DataType::to_json`]
    pub fn from_json(json: &str) -> Result<Self, DataTypeError> {
        let record: DataTypeRecord = serde_json::from_str(json)?;
        DataType::try_from(record)
    }
}

impl UnitConversion for DataType {
    fn name(&self) -> &str {
        &self.name
    }

    fn units(&self) -> &[String] {
        &self.units
    }

    fn si_unit(&self) -> Option<&str> {
        self.si_unit.as_deref()
    }

    fn ip_unit(&self) -> Option<&str> {
        self.ip_unit.as_deref()
    }

    fn is_unit_acceptable(&self, unit: &str) -> bool {
        match &self.table {
            Some(table) => table.contains(unit),
            None => self.units.is_empty() || self.units.iter().any(|u| u == unit),
        }
    }

    fn to_unit(&self, values: &[f64], unit: &str, from_unit: &str) -> Result<Vec<f64>, DataTypeError> {
        match &self.table {
            Some(table) => table
                .convert(values, unit, from_unit)
                .map_err(|label| DataTypeError::unrecognized(label, &self.name)),
            // Generic types carry no factors; every label converts as identity
            None => Ok(values.to_vec()),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Serialized conversion table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub kind: TableKind,
    pub entries: Vec<ConversionEntry>,
}

/// Structural record a data type serializes through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTypeRecord {
    #[serde(rename = "type")]
    pub marker: String,
    pub name: String,
    pub category: Option<Category>,
    pub units: Vec<String>,
    pub si_unit: Option<String>,
    pub ip_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversions: Option<ConversionRecord>,
}

impl From<DataType> for DataTypeRecord {
    fn from(data_type: DataType) -> Self {
        DataTypeRecord {
            marker: DATA_TYPE_MARKER.to_string(),
            category: data_type.category(),
            name: data_type.name,
            units: data_type.units,
            si_unit: data_type.si_unit,
            ip_unit: data_type.ip_unit,
            conversions: data_type.table.map(|table| ConversionRecord {
                kind: table.kind(),
                entries: table.entries().to_vec(),
            }),
        }
    }
}

impl TryFrom<DataTypeRecord> for DataType {
    type Error = DataTypeError;

    fn try_from(record: DataTypeRecord) -> Result<Self, Self::Error> {
        if record.marker != DATA_TYPE_MARKER {
            return Err(DataTypeError::construction(format!(
                "record type '{}' is not {}", record.marker, DATA_TYPE_MARKER
            )));
        }

        if let Some(category) = record.category {
            return builtin_from_record(category, record);
        }

        let table = match record.conversions {
            Some(conversions) => Some(ConversionTable::new(conversions.kind, conversions.entries)?),
            None => None,
        };

        let Some(table) = table else {
            if record.units.len() > 1 {
                return Err(DataTypeError::construction(format!(
                    "generic type {} carries more than one unit", record.name
                )));
            }
            if record.si_unit.is_some() || record.ip_unit.is_some() {
                return Err(DataTypeError::construction(format!(
                    "generic type {} cannot declare default units", record.name
                )));
            }
            return Ok(DataType::new_generic(&record.name, record.units.first().map(String::as_str)));
        };

        if table.units() != record.units {
            return Err(DataTypeError::construction(format!(
                "units of {} do not match its conversion table", record.name
            )));
        }

        DataType::custom(
            &record.name,
            table,
            record.si_unit.as_deref(),
            record.ip_unit.as_deref(),
        )
    }
}

/// A record tagged with a category must describe exactly that category
fn builtin_from_record(category: Category, record: DataTypeRecord) -> Result<DataType, DataTypeError> {
    let builtin = DataType::builtin(category);
    let table_matches = match (&record.conversions, builtin.table()) {
        (Some(conversions), Some(table)) => {
            conversions.kind == table.kind() && conversions.entries.as_slice() == table.entries()
        }
        (None, _) => true,
        (Some(_), None) => false,
    };
    if record.name != builtin.name
        || !table_matches
        || record.units != builtin.units
        || record.si_unit != builtin.si_unit
        || record.ip_unit != builtin.ip_unit
    {
        return Err(DataTypeError::construction(format!(
            "record {} does not match built-in category {}", record.name, category.name()
        )));
    }
    Ok(builtin)
}

/// Whether a JSON value carries the data type marker
pub fn is_data_type_record(value: &serde_json::Value) -> bool {
    value.get("type").and_then(|t| t.as_str()) == Some(DATA_TYPE_MARKER)
}
