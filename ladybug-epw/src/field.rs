//! Weather fields carried by every EPW data row

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::EpwError;

/// One hourly quantity read from an EPW row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherField {
    #[serde(rename = "modelYear")]
    ModelYear,
    #[serde(rename = "dbTemp")]
    DryBulbTemperature,
    #[serde(rename = "dewPoint")]
    DewPointTemperature,
    #[serde(rename = "RH")]
    RelativeHumidity,
    #[serde(rename = "windSpeed")]
    WindSpeed,
    #[serde(rename = "windDir")]
    WindDirection,
    #[serde(rename = "dirRad")]
    DirectNormalRadiation,
    #[serde(rename = "difRad")]
    DiffuseHorizontalRadiation,
    #[serde(rename = "glbRad")]
    GlobalHorizontalRadiation,
    #[serde(rename = "dirIll")]
    DirectNormalIlluminance,
    #[serde(rename = "difIll")]
    DiffuseHorizontalIlluminance,
    #[serde(rename = "glbIll")]
    GlobalHorizontalIlluminance,
    #[serde(rename = "cloudCov")]
    TotalCloudCover,
    #[serde(rename = "rainDepth")]
    LiquidPrecipitationDepth,
    #[serde(rename = "barPress")]
    BarometricPressure,
}

impl WeatherField {
    pub const COUNT: usize = 15;

    pub const ALL: [WeatherField; Self::COUNT] = [
        WeatherField::ModelYear,
        WeatherField::DryBulbTemperature,
        WeatherField::DewPointTemperature,
        WeatherField::RelativeHumidity,
        WeatherField::WindSpeed,
        WeatherField::WindDirection,
        WeatherField::DirectNormalRadiation,
        WeatherField::DiffuseHorizontalRadiation,
        WeatherField::GlobalHorizontalRadiation,
        WeatherField::DirectNormalIlluminance,
        WeatherField::DiffuseHorizontalIlluminance,
        WeatherField::GlobalHorizontalIlluminance,
        WeatherField::TotalCloudCover,
        WeatherField::LiquidPrecipitationDepth,
        WeatherField::BarometricPressure,
    ];

    /// Short key, e.g. `dbTemp`
    pub fn key(&self) -> &'static str {
        match self {
            WeatherField::ModelYear => "modelYear",
            WeatherField::DryBulbTemperature => "dbTemp",
            WeatherField::DewPointTemperature => "dewPoint",
            WeatherField::RelativeHumidity => "RH",
            WeatherField::WindSpeed => "windSpeed",
            WeatherField::WindDirection => "windDir",
            WeatherField::DirectNormalRadiation => "dirRad",
            WeatherField::DiffuseHorizontalRadiation => "difRad",
            WeatherField::GlobalHorizontalRadiation => "glbRad",
            WeatherField::DirectNormalIlluminance => "dirIll",
            WeatherField::DiffuseHorizontalIlluminance => "difIll",
            WeatherField::GlobalHorizontalIlluminance => "glbIll",
            WeatherField::TotalCloudCover => "cloudCov",
            WeatherField::LiquidPrecipitationDepth => "rainDepth",
            WeatherField::BarometricPressure => "barPress",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            WeatherField::ModelYear => "Year",
            WeatherField::DryBulbTemperature => "Dry Bulb Temperature",
            WeatherField::DewPointTemperature => "Dew Point Temperature",
            WeatherField::RelativeHumidity => "Relative Humidity",
            WeatherField::WindSpeed => "Wind Speed",
            WeatherField::WindDirection => "Wind Direction",
            WeatherField::DirectNormalRadiation => "Direct Normal Radiation",
            WeatherField::DiffuseHorizontalRadiation => "Diffuse Horizontal Radiation",
            WeatherField::GlobalHorizontalRadiation => "Global Horizontal Radiation",
            WeatherField::DirectNormalIlluminance => "Direct Normal Illuminance",
            WeatherField::DiffuseHorizontalIlluminance => "Diffuse Horizontal Illuminance",
            WeatherField::GlobalHorizontalIlluminance => "Global Horizontal Illuminance",
            WeatherField::TotalCloudCover => "Total Cloud Cover",
            WeatherField::LiquidPrecipitationDepth => "Liquid Precipitation Depth",
            WeatherField::BarometricPressure => "Barometric Pressure",
        }
    }

    /// Unit label as stored in the file
    pub fn unit(&self) -> &'static str {
        match self {
            WeatherField::ModelYear => "Year",
            WeatherField::DryBulbTemperature | WeatherField::DewPointTemperature => "C",
            WeatherField::RelativeHumidity => "%",
            WeatherField::WindSpeed => "m/s",
            WeatherField::WindDirection => "degrees",
            WeatherField::DirectNormalRadiation
            | WeatherField::DiffuseHorizontalRadiation
            | WeatherField::GlobalHorizontalRadiation => "Wh/m2",
            WeatherField::DirectNormalIlluminance
            | WeatherField::DiffuseHorizontalIlluminance
            | WeatherField::GlobalHorizontalIlluminance => "lux",
            WeatherField::TotalCloudCover => "tenths",
            WeatherField::LiquidPrecipitationDepth => "mm",
            WeatherField::BarometricPressure => "Pa",
        }
    }

    /// Registry name of the data type behind this field
    pub fn data_type_name(&self) -> &'static str {
        match self {
            WeatherField::ModelYear => "Year",
            WeatherField::DryBulbTemperature | WeatherField::DewPointTemperature => "Temperature",
            WeatherField::RelativeHumidity | WeatherField::TotalCloudCover => "Percentage",
            WeatherField::WindSpeed => "Speed",
            WeatherField::WindDirection => "Angle",
            WeatherField::DirectNormalRadiation
            | WeatherField::DiffuseHorizontalRadiation
            | WeatherField::GlobalHorizontalRadiation => "EnergyIntensity",
            WeatherField::DirectNormalIlluminance
            | WeatherField::DiffuseHorizontalIlluminance
            | WeatherField::GlobalHorizontalIlluminance => "Illuminance",
            WeatherField::LiquidPrecipitationDepth => "Distance",
            WeatherField::BarometricPressure => "Pressure",
        }
    }

    /// Zero-based column in a data row; the model year is column 0
    pub fn column(&self) -> usize {
        match self {
            WeatherField::ModelYear => 0,
            WeatherField::DryBulbTemperature => 6,
            WeatherField::DewPointTemperature => 7,
            WeatherField::RelativeHumidity => 8,
            WeatherField::BarometricPressure => 9,
            WeatherField::GlobalHorizontalRadiation => 13,
            WeatherField::DirectNormalRadiation => 14,
            WeatherField::DiffuseHorizontalRadiation => 15,
            WeatherField::GlobalHorizontalIlluminance => 16,
            WeatherField::DirectNormalIlluminance => 17,
            WeatherField::DiffuseHorizontalIlluminance => 18,
            WeatherField::WindDirection => 20,
            WeatherField::WindSpeed => 21,
            WeatherField::TotalCloudCover => 22,
            WeatherField::LiquidPrecipitationDepth => 33,
        }
    }

    /// Position in [`WeatherField::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl FromStr for WeatherField {
    type Err = EpwError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key() == key)
            .ok_or_else(|| EpwError::UnknownField(key.to_string()))
    }
}

impl fmt::Display for WeatherField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladybug_datatype::{UnitConversion, DATA_TYPES};

    #[test]
    fn test_keys_parse_back() {
        for field in WeatherField::ALL {
            assert_eq!(field.key().parse::<WeatherField>().unwrap(), field);
        }
        assert!(matches!("dbtemp".parse::<WeatherField>(), Err(EpwError::UnknownField(_))));
    }

    #[test]
    fn test_index_matches_order() {
        for (i, field) in WeatherField::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn test_units_resolve_to_builtin_types() {
        for field in WeatherField::ALL {
            let data_type = DATA_TYPES.type_by_name_and_unit(field.data_type_name(), Some(field.unit()));
            assert_eq!(data_type.name(), field.data_type_name());
            assert_eq!(data_type.is_generic(), field == WeatherField::ModelYear, "{}", field);
        }
    }
}
