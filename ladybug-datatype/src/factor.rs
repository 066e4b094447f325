//! Star-shaped conversion tables
//!
//! Every table has one canonical unit at its center. Each accepted unit
//! carries a factor to and from that canonical unit, so converting between
//! two arbitrary units always pivots through the canonical one.

use serde::{Deserialize, Serialize};
use crate::DataTypeError;

/// Conversion from one unit to the canonical unit of its table
///
/// Both a multiplier and a divisor are kept so each published factor can be
/// written in the direction it is published: `km` multiplies by 1000 into
/// meters, `ft` divides by 3.28084.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UnitFactor {
    /// canonical = value * mul / div
    Scale { mul: f64, div: f64 },
    /// canonical = (value - offset) * mul / div
    Affine { mul: f64, div: f64, offset: f64 },
}

impl UnitFactor {
    /// Factor of the canonical unit itself
    pub const IDENTITY: UnitFactor = UnitFactor::Scale { mul: 1.0, div: 1.0 };

    /// Value in this unit = canonical * factor
    pub const fn times(factor: f64) -> Self {
        UnitFactor::Scale { mul: 1.0, div: factor }
    }

    /// Value in this unit = canonical / factor
    pub const fn per(factor: f64) -> Self {
        UnitFactor::Scale { mul: factor, div: 1.0 }
    }

    pub const fn affine(mul: f64, div: f64, offset: f64) -> Self {
        UnitFactor::Affine { mul, div, offset }
    }

    pub fn is_affine(&self) -> bool {
        matches!(self, UnitFactor::Affine { .. })
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Convert a value in this unit to the canonical unit
    pub fn to_canonical(&self, value: f64) -> f64 {
        match *self {
            UnitFactor::Scale { mul, div } => value * mul / div,
            UnitFactor::Affine { mul, div, offset } => (value - offset) * mul / div,
        }
    }

    /// Convert a canonical value to this unit
    pub fn from_canonical(&self, value: f64) -> f64 {
        match *self {
            UnitFactor::Scale { mul, div } => value * div / mul,
            UnitFactor::Affine { mul, div, offset } => value * div / mul + offset,
        }
    }

    fn check(&self, unit: &str) -> Result<(), DataTypeError> {
        let (mul, div, offset) = match *self {
            UnitFactor::Scale { mul, div } => (mul, div, 0.0),
            UnitFactor::Affine { mul, div, offset } => (mul, div, offset),
        };
        if !(mul.is_finite() && div.is_finite() && offset.is_finite()) {
            return Err(DataTypeError::construction(format!(
                "factor for '{}' is not finite", unit
            )));
        }
        if mul == 0.0 || div == 0.0 {
            return Err(DataTypeError::construction(format!(
                "factor for '{}' has a zero multiplier or divisor", unit
            )));
        }
        Ok(())
    }
}

/// Whether a table may hold offset conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Multiplicative,
    Affine,
}

/// One accepted unit and its factor to the canonical unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionEntry {
    pub unit: String,
    pub factor: UnitFactor,
}

impl ConversionEntry {
    pub fn new(unit: &str, factor: UnitFactor) -> Self {
        ConversionEntry { unit: unit.to_string(), factor }
    }
}

/// Validated conversion table; the first entry is the canonical unit
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionTable {
    kind: TableKind,
    entries: Vec<ConversionEntry>,
}

impl ConversionTable {
    pub fn new(kind: TableKind, entries: Vec<ConversionEntry>) -> Result<Self, DataTypeError> {
        let canonical = entries.first().ok_or_else(|| {
            DataTypeError::construction("conversion table has no canonical unit")
        })?;
        if !canonical.factor.is_identity() {
            return Err(DataTypeError::construction(format!(
                "canonical unit '{}' must convert to itself with factor 1", canonical.unit
            )));
        }

        for (i, entry) in entries.iter().enumerate() {
            if entry.unit.is_empty() {
                return Err(DataTypeError::construction("unit label is empty"));
            }
            if entries[..i].iter().any(|e| e.unit == entry.unit) {
                return Err(DataTypeError::construction(format!(
                    "duplicate unit label '{}'", entry.unit
                )));
            }
            if kind == TableKind::Multiplicative && entry.factor.is_affine() {
                return Err(DataTypeError::construction(format!(
                    "unit '{}' has an offset in a multiplicative table", entry.unit
                )));
            }
            entry.factor.check(&entry.unit)?;
        }

        Ok(ConversionTable { kind, entries })
    }

    /// Built-in tables are checked by the category tests, not at startup
    pub(crate) fn builtin(kind: TableKind, entries: Vec<ConversionEntry>) -> Self {
        ConversionTable { kind, entries }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn entries(&self) -> &[ConversionEntry] {
        &self.entries
    }

    /// The pivot unit every conversion passes through
    pub fn canonical(&self) -> &str {
        &self.entries[0].unit
    }

    pub fn units(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.unit.clone()).collect()
    }

    pub fn contains(&self, unit: &str) -> bool {
        self.factor(unit).is_some()
    }

    pub fn factor(&self, unit: &str) -> Option<&UnitFactor> {
        self.entries.iter().find(|e| e.unit == unit).map(|e| &e.factor)
    }

    /// Convert values between two units of this table.
    ///
    /// Returns the first label the table does not know as the error.
    pub fn convert<'a>(&self, values: &[f64], to: &'a str, from: &'a str) -> Result<Vec<f64>, &'a str> {
        let source = self.factor(from).ok_or(from)?;
        let target = self.factor(to).ok_or(to)?;
        if from == to {
            return Ok(values.to_vec());
        }
        Ok(values
            .iter()
            .map(|v| target.from_canonical(source.to_canonical(*v)))
            .collect())
    }
}
