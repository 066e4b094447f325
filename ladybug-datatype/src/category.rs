//! Built-in measurement categories and their conversion tables
//!
//! Factors follow the published building-science constants. Each table
//! lists its canonical unit first.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use crate::factor::{ConversionEntry, ConversionTable, TableKind, UnitFactor};

/// One physical measurement kind known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Temperature,
    Percentage,
    Distance,
    Area,
    Volume,
    Pressure,
    Energy,
    EnergyIntensity,
    Power,
    EnergyFlux,
    Illuminance,
    Luminance,
    Angle,
    Mass,
    Speed,
    VolumeFlowRate,
}

impl Category {
    /// Registration order; earlier categories win shared unit labels
    pub const ALL: [Category; 16] = [
        Category::Temperature,
        Category::Percentage,
        Category::Distance,
        Category::Area,
        Category::Volume,
        Category::Pressure,
        Category::Energy,
        Category::EnergyIntensity,
        Category::Power,
        Category::EnergyFlux,
        Category::Illuminance,
        Category::Luminance,
        Category::Angle,
        Category::Mass,
        Category::Speed,
        Category::VolumeFlowRate,
    ];

    /// Display name, also the registry key
    pub fn name(&self) -> &'static str {
        match self {
            Category::Temperature => "Temperature",
            Category::Percentage => "Percentage",
            Category::Distance => "Distance",
            Category::Area => "Area",
            Category::Volume => "Volume",
            Category::Pressure => "Pressure",
            Category::Energy => "Energy",
            Category::EnergyIntensity => "EnergyIntensity",
            Category::Power => "Power",
            Category::EnergyFlux => "EnergyFlux",
            Category::Illuminance => "Illuminance",
            Category::Luminance => "Luminance",
            Category::Angle => "Angle",
            Category::Mass => "Mass",
            Category::Speed => "Speed",
            Category::VolumeFlowRate => "VolumeFlowRate",
        }
    }

    pub fn from_name(name: &str) -> Option<Category> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    pub fn si_unit(&self) -> &'static str {
        match self {
            Category::Temperature => "C",
            Category::Percentage => "%",
            Category::Distance => "m",
            Category::Area => "m2",
            Category::Volume => "m3",
            Category::Pressure => "Pa",
            Category::Energy => "kWh",
            Category::EnergyIntensity => "kWh/m2",
            Category::Power => "W",
            Category::EnergyFlux => "W/m2",
            Category::Illuminance => "lux",
            Category::Luminance => "cd/m2",
            Category::Angle => "degrees",
            Category::Mass => "kg",
            Category::Speed => "m/s",
            Category::VolumeFlowRate => "m3/s",
        }
    }

    pub fn ip_unit(&self) -> &'static str {
        match self {
            Category::Temperature => "F",
            Category::Percentage => "%",
            Category::Distance => "ft",
            Category::Area => "ft2",
            Category::Volume => "ft3",
            Category::Pressure => "inHg",
            Category::Energy => "kBtu",
            Category::EnergyIntensity => "kBtu/ft2",
            Category::Power => "Btu/h",
            Category::EnergyFlux => "Btu/h-ft2",
            Category::Illuminance => "fc",
            Category::Luminance => "cd/ft2",
            Category::Angle => "degrees",
            Category::Mass => "lb",
            Category::Speed => "mph",
            Category::VolumeFlowRate => "ft3/s",
        }
    }

    pub fn table_kind(&self) -> TableKind {
        match self {
            Category::Temperature => TableKind::Affine,
            _ => TableKind::Multiplicative,
        }
    }

    /// Conversion entries, canonical unit first
    pub fn entries(&self) -> Vec<ConversionEntry> {
        use UnitFactor as F;

        let raw: Vec<(&str, UnitFactor)> = match self {
            Category::Temperature => vec![
                ("C", F::IDENTITY),
                ("F", F::affine(5.0, 9.0, 32.0)),
                ("K", F::affine(1.0, 1.0, 273.15)),
            ],
            Category::Percentage => vec![
                ("%", F::IDENTITY),
                ("fraction", F::per(100.0)),
                ("tenths", F::per(10.0)),
                ("thousandths", F::times(10.0)),
            ],
            Category::Distance => vec![
                ("m", F::IDENTITY),
                ("ft", F::times(3.28084)),
                ("mm", F::times(1000.0)),
                ("in", F::times(39.3701)),
                ("km", F::per(1000.0)),
                ("mi", F::per(1609.344)),
                ("cm", F::times(100.0)),
            ],
            Category::Area => vec![
                ("m2", F::IDENTITY),
                ("ft2", F::times(10.7639)),
                ("mm2", F::times(1_000_000.0)),
                ("in2", F::times(1550.0)),
                ("km2", F::per(1_000_000.0)),
                ("mi2", F::per(2_590_000.0)),
                ("cm2", F::times(10_000.0)),
                ("ha", F::per(10_000.0)),
                ("acre", F::per(4046.86)),
            ],
            Category::Volume => vec![
                ("m3", F::IDENTITY),
                ("ft3", F::times(35.3147)),
                ("mm3", F::times(1e9)),
                ("in3", F::times(61023.7)),
                ("km3", F::per(1e9)),
                ("mi3", F::per(4.168e9)),
                ("L", F::times(1000.0)),
                ("mL", F::times(1_000_000.0)),
                ("gal", F::times(264.172)),
                ("fl oz", F::times(33814.0)),
            ],
            Category::Pressure => vec![
                ("Pa", F::IDENTITY),
                ("inHg", F::times(0.0002953)),
                ("atm", F::per(101_325.0)),
                ("bar", F::per(100_000.0)),
                ("Torr", F::times(0.00750062)),
                ("psi", F::times(0.000145038)),
                ("inH2O", F::times(0.00401865)),
            ],
            Category::Energy => vec![
                ("kWh", F::IDENTITY),
                ("kBtu", F::times(3.41214)),
                ("Wh", F::times(1000.0)),
                ("Btu", F::times(3412.14)),
                ("MMBtu", F::times(0.00341214)),
                ("J", F::times(3_600_000.0)),
                ("kJ", F::times(3600.0)),
                ("MJ", F::times(3.6)),
                ("GJ", F::times(0.0036)),
                ("therm", F::times(0.0341214)),
                ("cal", F::times(860_421.0)),
                ("kcal", F::times(860.421)),
            ],
            Category::EnergyIntensity => vec![
                ("kWh/m2", F::IDENTITY),
                ("kBtu/ft2", F::times(0.316998)),
                ("Wh/m2", F::times(1000.0)),
                ("Btu/ft2", F::times(316.998)),
            ],
            Category::Power => vec![
                ("W", F::IDENTITY),
                ("Btu/h", F::times(3.41214)),
                ("kW", F::per(1000.0)),
                ("kBtu/h", F::times(0.00341214)),
                ("TR", F::per(3516.85)),
                ("hp", F::per(745.7)),
            ],
            Category::EnergyFlux => vec![
                ("W/m2", F::IDENTITY),
                ("Btu/h-ft2", F::per(3.15459075)),
                ("kW/m2", F::per(1000.0)),
                ("kBtu/h-ft2", F::per(3154.59075)),
                ("W/ft2", F::per(10.7639)),
                ("met", F::per(58.2)),
            ],
            Category::Illuminance => vec![
                ("lux", F::IDENTITY),
                ("fc", F::per(10.7639)),
            ],
            Category::Luminance => vec![
                ("cd/m2", F::IDENTITY),
                ("cd/ft2", F::per(10.7639)),
            ],
            Category::Angle => vec![
                ("degrees", F::IDENTITY),
                ("radians", F::Scale { mul: 180.0, div: PI }),
            ],
            Category::Mass => vec![
                ("kg", F::IDENTITY),
                ("lb", F::times(2.20462)),
                ("g", F::times(1000.0)),
                ("tonne", F::per(1000.0)),
                ("ton", F::per(907.185)),
                ("oz", F::times(35.274)),
            ],
            Category::Speed => vec![
                ("m/s", F::IDENTITY),
                ("mph", F::times(2.23694)),
                ("km/h", F::times(3.6)),
                ("knot", F::times(1.94384)),
                ("ft/s", F::times(3.28084)),
            ],
            Category::VolumeFlowRate => vec![
                ("m3/s", F::IDENTITY),
                ("ft3/s", F::times(35.3147)),
                ("L/s", F::times(1000.0)),
                ("cfm", F::times(2118.88)),
                ("gpm", F::times(15850.3231)),
                ("mL/s", F::times(1_000_000.0)),
                ("fl oz/s", F::times(33814.0)),
            ],
        };

        raw.into_iter().map(|(unit, factor)| ConversionEntry::new(unit, factor)).collect()
    }

    /// The validated table for this category
    pub fn table(&self) -> ConversionTable {
        ConversionTable::builtin(self.table_kind(), self.entries())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_table_validates() {
        for category in Category::ALL {
            let table = ConversionTable::new(category.table_kind(), category.entries());
            assert!(table.is_ok(), "{} table is malformed: {:?}", category, table.err());
        }
    }

    #[test]
    fn test_defaults_are_accepted_units() {
        for category in Category::ALL {
            let table = category.table();
            assert!(table.contains(category.si_unit()), "{} SI unit", category);
            assert!(table.contains(category.ip_unit()), "{} IP unit", category);
        }
    }

    #[test]
    fn test_only_temperature_is_affine() {
        for category in Category::ALL {
            let has_offset = category.entries().iter().any(|e| e.factor.is_affine());
            assert_eq!(has_offset, category == Category::Temperature, "{}", category);
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Category::from_name("EnergyFlux"), Some(Category::EnergyFlux));
        assert_eq!(Category::from_name("energyflux"), None);
        assert_eq!(Category::from_name("Widgets"), None);
    }
}
