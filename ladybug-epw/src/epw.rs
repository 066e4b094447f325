//! EPW weather file reader

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use chrono::NaiveDateTime;
use ladybug_datatype::{DataType, UnitConversion, DATA_TYPES};
use serde::Serialize;
use tracing::{debug, info, warn};
use crate::field::WeatherField;
use crate::period::{month_day_hour, timestamp, AnalysisPeriod};
use crate::EpwError;

/// Header lines between LOCATION and the first data row
const HEADER_LINES: usize = 8;

/// Station metadata from the LOCATION line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
    pub source: String,
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub time_zone: f64,
    pub elevation: f64,
}

impl Location {
    // LOCATION,Denver Centennial  Golden   Nr,CO,USA,TMY3,724666,39.74,-105.18,-7.0,1829.0
    fn parse(line: &str) -> Result<Self, EpwError> {
        let line = line.strip_prefix('\u{feff}').unwrap_or(line);
        let parts: Vec<&str> = line.trim().split(',').collect();
        if parts.first().map(|p| p.trim()) != Some("LOCATION") {
            return Err(EpwError::MissingLocation);
        }
        if parts.len() < 10 {
            return Err(EpwError::malformed(1, format!(
                "LOCATION has {} fields, expected 10", parts.len()
            )));
        }
        let number = |i: usize, what: &str| -> Result<f64, EpwError> {
            parts[i].trim().parse::<f64>().map_err(|_| {
                EpwError::malformed(1, format!("{} '{}' is not a number", what, parts[i]))
            })
        };
        Ok(Location {
            city: parts[1].to_string(),
            state: parts[2].to_string(),
            country: parts[3].to_string(),
            source: parts[4].to_string(),
            station_id: parts[5].to_string(),
            latitude: number(6, "latitude")?,
            longitude: number(7, "longitude")?,
            time_zone: number(8, "time zone")?,
            elevation: number(9, "elevation")?,
        })
    }
}

/// All fields of one hour
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRecord {
    values: [f64; WeatherField::COUNT],
}

impl HourlyRecord {
    fn parse(columns: &[&str], line: usize) -> Result<Self, EpwError> {
        let mut values = [0.0; WeatherField::COUNT];
        for field in WeatherField::ALL {
            let raw = columns[field.column()].trim();
            values[field.index()] = raw.parse::<f64>().map_err(|_| {
                EpwError::malformed(line, format!("{} value '{}' is not a number", field, raw))
            })?;
        }
        Ok(HourlyRecord { values })
    }

    pub fn get(&self, field: WeatherField) -> f64 {
        self.values[field.index()]
    }

    /// Calendar year of the source row; rows of a typical year mix years
    pub fn model_year(&self) -> i32 {
        self.get(WeatherField::ModelYear) as i32
    }
}

/// Parsed weather file, keyed by timestamp in the reference year
#[derive(Debug, Clone)]
pub struct Epw {
    path: Option<PathBuf>,
    location: Location,
    data: BTreeMap<NaiveDateTime, HourlyRecord>,
}

impl Epw {
    /// Read a local `.epw` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EpwError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(EpwError::InvalidPath(path.to_path_buf()));
        }
        if path.extension().map_or(true, |ext| ext != "epw") {
            return Err(EpwError::NotEpw(path.to_path_buf()));
        }

        // Station names are frequently Latin-1
        let bytes = fs::read(path)?;
        let mut epw = Self::parse(&String::from_utf8_lossy(&bytes))?;
        epw.path = Some(path.to_path_buf());

        info!(path = %path.display(), city = %epw.location.city, rows = epw.len(), "loaded weather file");
        Ok(epw)
    }

    /// Parse the text of a weather file
    pub fn parse(text: &str) -> Result<Self, EpwError> {
        let mut lines = text.lines();
        let location = Location::parse(lines.next().ok_or(EpwError::MissingLocation)?)?;

        let mut data = BTreeMap::new();
        for (index, line) in lines.enumerate().skip(HEADER_LINES - 1) {
            let line_number = index + 2;
            if line.trim().is_empty() {
                continue;
            }
            let (time, record) = parse_row(line, line_number)?;
            if data.insert(time, record).is_some() {
                warn!(line = line_number, %time, "duplicate weather row; keeping the later one");
            }
        }

        debug!(city = %location.city, rows = data.len(), "parsed weather data");
        Ok(Epw { path: None, location, data })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Timestamps in chronological order
    pub fn timestamps(&self) -> impl Iterator<Item = &NaiveDateTime> {
        self.data.keys()
    }

    /// Every field at one hour (1-based)
    pub fn record_at(&self, month: u32, day: u32, hour: u32) -> Result<&HourlyRecord, EpwError> {
        let time = timestamp(month, day, hour)?;
        self.data.get(&time).ok_or(EpwError::NoData { month, day, hour })
    }

    /// One field at one hour (1-based)
    pub fn data_by_time(&self, month: u32, day: u32, hour: u32, field: WeatherField) -> Result<f64, EpwError> {
        Ok(self.record_at(month, day, hour)?.get(field))
    }

    /// Every value of a field, in chronological order
    pub fn annual_hourly_data(&self, field: WeatherField) -> HourlyData {
        let (timestamps, values) = self
            .data
            .iter()
            .map(|(time, record)| (*time, record.get(field)))
            .unzip();
        HourlyData {
            header: self.header(field, (1, 1, 1), (12, 31, 24)),
            timestamps,
            values,
        }
    }

    /// Values of a field at the hours included in `period`
    pub fn hourly_data_by_analysis_period(&self, field: WeatherField, period: &AnalysisPeriod) -> HourlyData {
        let (timestamps, values) = self
            .data
            .iter()
            .filter(|(time, _)| period.is_time_included(time))
            .map(|(time, record)| (*time, record.get(field)))
            .unzip();
        HourlyData {
            header: self.header(field, month_day_hour(&period.start()), month_day_hour(&period.end())),
            timestamps,
            values,
        }
    }

    fn header(&self, field: WeatherField, start: (u32, u32, u32), end: (u32, u32, u32)) -> DataHeader {
        DataHeader {
            city: self.location.city.clone(),
            field,
            full_name: field.full_name().to_string(),
            data_type: field.data_type_name().to_string(),
            unit: field.unit().to_string(),
            start,
            end,
        }
    }
}

fn parse_row(line: &str, line_number: usize) -> Result<(NaiveDateTime, HourlyRecord), EpwError> {
    let columns: Vec<&str> = line.trim().split(',').collect();
    let needed = WeatherField::LiquidPrecipitationDepth.column() + 1;
    if columns.len() < needed {
        return Err(EpwError::malformed(line_number, format!(
            "{} columns, expected at least {}", columns.len(), needed
        )));
    }

    let mut date = [0u32; 3];
    for (slot, (raw, what)) in date.iter_mut().zip(columns[1..4].iter().zip(["month", "day", "hour"])) {
        *slot = raw.trim().parse().map_err(|_| {
            EpwError::malformed(line_number, format!("{} '{}' is not an integer", what, raw))
        })?;
    }
    let [month, day, hour] = date;
    let time = timestamp(month, day, hour).map_err(|e| EpwError::malformed(line_number, e.to_string()))?;

    Ok((time, HourlyRecord::parse(&columns, line_number)?))
}

/// Describes a series of hourly values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataHeader {
    city: String,
    field: WeatherField,
    full_name: String,
    data_type: String,
    unit: String,
    start: (u32, u32, u32),
    end: (u32, u32, u32),
}

impl DataHeader {
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn field(&self) -> WeatherField {
        self.field
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// (month, day, hour) of the first value
    pub fn start(&self) -> (u32, u32, u32) {
        self.start
    }

    /// (month, day, hour) of the last value
    pub fn end(&self) -> (u32, u32, u32) {
        self.end
    }

    pub fn data_type_name(&self) -> &str {
        &self.data_type
    }

    /// The registry type for this header's name and unit
    pub fn data_type(&self) -> Arc<DataType> {
        DATA_TYPES.type_by_name_and_unit(&self.data_type, Some(&self.unit))
    }
}

/// A header and the values it describes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyData {
    header: DataHeader,
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl HourlyData {
    pub fn header(&self) -> &DataHeader {
        &self.header
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn convert_to_unit(&self, unit: &str) -> Result<HourlyData, EpwError> {
        let values = self.header.data_type().to_unit(&self.values, unit, &self.header.unit)?;
        Ok(self.relabel(values, unit.to_string()))
    }

    pub fn to_si(&self) -> Result<HourlyData, EpwError> {
        let (values, unit) = self.header.data_type().to_si(&self.values, &self.header.unit)?;
        Ok(self.relabel(values, unit))
    }

    pub fn to_ip(&self) -> Result<HourlyData, EpwError> {
        let (values, unit) = self.header.data_type().to_ip(&self.values, &self.header.unit)?;
        Ok(self.relabel(values, unit))
    }

    fn relabel(&self, values: Vec<f64>, unit: String) -> HourlyData {
        HourlyData {
            header: DataHeader { unit, ..self.header.clone() },
            timestamps: self.timestamps.clone(),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use ladybug_datatype::{DataTypeError, DataTypeKind};
    use std::fs;

    fn row(month: u32, day: u32, hour: u32) -> String {
        let db_temp = f64::from(day) * 100.0 + f64::from(hour);
        let mut columns = vec!["1999".to_string(), month.to_string(), day.to_string(), hour.to_string()];
        columns.push("60".to_string());
        columns.push("?9?9?9?9E0".to_string());
        for column in 6..35 {
            let value = match column {
                6 => db_temp,
                7 => db_temp - 5.0,
                8 => 50.0,
                9 => 101325.0,
                13 => 100.0,
                14 => 200.0,
                15 => 50.0,
                16 => 1000.0,
                17 => 2000.0,
                18 => 3000.0,
                20 => 180.0,
                21 => 3.5,
                22 => 5.0,
                33 => 1.5,
                _ => 0.0,
            };
            columns.push(value.to_string());
        }
        columns.join(",")
    }

    fn sample_text() -> String {
        let mut lines = vec![
            "LOCATION,Denver Centennial  Golden   Nr,CO,USA,TMY3,724666,39.74,-105.18,-7.0,1829.0".to_string(),
            "DESIGN CONDITIONS,0".to_string(),
            "TYPICAL/EXTREME PERIODS,0".to_string(),
            "GROUND TEMPERATURES,0".to_string(),
            "HOLIDAYS/DAYLIGHT SAVINGS,No,0,0,0".to_string(),
            "COMMENTS 1,synthetic".to_string(),
            "COMMENTS 2,synthetic".to_string(),
            "DATA PERIODS,1,1,Data,Sunday, 1/ 1,12/31".to_string(),
        ];
        // second day first, to check ordering
        for day in [2, 1] {
            for hour in 1..=24 {
                lines.push(row(1, day, hour));
            }
        }
        lines.join("\n") + "\n"
    }

    fn sample() -> Epw {
        Epw::parse(&sample_text()).unwrap()
    }

    #[test]
    fn test_location() {
        let epw = sample();
        let location = epw.location();
        assert_eq!(location.city, "Denver Centennial  Golden   Nr");
        assert_eq!(location.state, "CO");
        assert_eq!(location.station_id, "724666");
        assert_eq!(location.latitude, 39.74);
        assert_eq!(location.time_zone, -7.0);
        assert_eq!(location.elevation, 1829.0);
    }

    #[test]
    fn test_location_after_byte_order_mark() {
        let epw = Epw::parse(&format!("\u{feff}{}", sample_text())).unwrap();
        assert_eq!(epw.location().city, "Denver Centennial  Golden   Nr");
        assert_eq!(epw.len(), 48);
    }

    #[test]
    fn test_rows_are_sorted() {
        let epw = sample();
        assert_eq!(epw.len(), 48);
        let times: Vec<_> = epw.timestamps().copied().collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(times[0].hour(), 0);
    }

    #[test]
    fn test_data_by_time() {
        let epw = sample();
        assert_eq!(epw.data_by_time(1, 1, 1, WeatherField::DryBulbTemperature).unwrap(), 101.0);
        assert_eq!(epw.data_by_time(1, 2, 24, WeatherField::DewPointTemperature).unwrap(), 219.0);
        let record = epw.record_at(1, 1, 12).unwrap();
        assert_eq!(record.model_year(), 1999);
        assert_eq!(record.get(WeatherField::TotalCloudCover), 5.0);
        assert_eq!(record.get(WeatherField::LiquidPrecipitationDepth), 1.5);
        assert!(matches!(epw.record_at(1, 3, 1), Err(EpwError::NoData { day: 3, .. })));
        assert!(matches!(epw.record_at(1, 3, 0), Err(EpwError::InvalidDateTime { .. })));
    }

    #[test]
    fn test_annual_hourly_data() {
        let data = sample().annual_hourly_data(WeatherField::DryBulbTemperature);
        assert_eq!(data.len(), 48);
        assert_eq!(data.values()[0], 101.0);
        assert_eq!(data.values()[47], 224.0);
        let header = data.header();
        assert_eq!(header.start(), (1, 1, 1));
        assert_eq!(header.end(), (12, 31, 24));
        assert_eq!(header.unit(), "C");
        assert_eq!(header.full_name(), "Dry Bulb Temperature");
        assert_eq!(header.city(), "Denver Centennial  Golden   Nr");
        assert!(header.data_type().is_data_type());
        assert_eq!(header.data_type().name(), "Temperature");
    }

    #[test]
    fn test_data_by_analysis_period() {
        let epw = sample();
        let period = AnalysisPeriod::new(1, 1, 9, 1, 2, 17, 1).unwrap();
        let data = epw.hourly_data_by_analysis_period(WeatherField::DryBulbTemperature, &period);
        assert_eq!(data.len(), 18);
        assert_eq!(data.values()[0], 109.0);
        assert_eq!(data.values()[17], 217.0);
        assert_eq!(data.header().start(), (1, 1, 9));
        assert_eq!(data.header().end(), (1, 2, 17));

        let overnight = AnalysisPeriod::new(1, 1, 22, 1, 2, 2, 1).unwrap();
        let data = epw.hourly_data_by_analysis_period(WeatherField::DryBulbTemperature, &overnight);
        assert_eq!(data.values(), &[122.0, 123.0, 124.0, 201.0, 202.0]);
    }

    #[test]
    fn test_unit_conversion() {
        let data = sample().annual_hourly_data(WeatherField::DryBulbTemperature);
        let ip = data.to_ip().unwrap();
        assert_eq!(ip.header().unit(), "F");
        assert!((ip.values()[0] - (101.0 * 9.0 / 5.0 + 32.0)).abs() < 1e-9);
        assert_eq!(ip.timestamps(), data.timestamps());

        let kelvin = data.convert_to_unit("K").unwrap();
        assert!((kelvin.values()[0] - 374.15).abs() < 1e-9);
        assert_eq!(data.to_si().unwrap().values(), data.values());

        let err = data.convert_to_unit("lux").unwrap_err();
        assert!(matches!(err, EpwError::DataType(DataTypeError::UnrecognizedUnit { .. })));

        let cloud = sample().annual_hourly_data(WeatherField::TotalCloudCover);
        assert_eq!(cloud.convert_to_unit("fraction").unwrap().values()[0], 0.5);
    }

    #[test]
    fn test_model_year_is_generic() {
        let data = sample().annual_hourly_data(WeatherField::ModelYear);
        assert_eq!(data.values()[0], 1999.0);
        let data_type = data.header().data_type();
        assert_eq!(data_type.kind(), DataTypeKind::Generic);
        assert!(data_type.is_unit_acceptable("Year"));
        assert!(matches!(data.to_si(), Err(EpwError::DataType(DataTypeError::MissingDefaultUnit { .. }))));
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(Epw::parse(""), Err(EpwError::MissingLocation)));
        assert!(matches!(Epw::parse("DESIGN CONDITIONS,0\n"), Err(EpwError::MissingLocation)));

        let mut text = sample_text();
        text.push_str("1999,1,3,1,60,short\n");
        assert!(matches!(Epw::parse(&text), Err(EpwError::MalformedRow { line: 57, .. })));

        let bad_hour = sample_text().replace(&row(1, 2, 5), &row(1, 2, 25));
        assert!(matches!(Epw::parse(&bad_hour), Err(EpwError::MalformedRow { .. })));
    }

    #[test]
    fn test_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let temp = tempfile::tempdir()?;

        let path = temp.path().join("denver.epw");
        fs::write(&path, sample_text())?;
        let epw = Epw::from_file(&path)?;
        assert_eq!(epw.len(), 48);
        assert_eq!(epw.path(), Some(path.as_path()));

        let wrong_extension = temp.path().join("denver.csv");
        fs::write(&wrong_extension, sample_text())?;
        assert!(matches!(Epw::from_file(&wrong_extension), Err(EpwError::NotEpw(_))));

        let missing = temp.path().join("missing.epw");
        assert!(matches!(Epw::from_file(&missing), Err(EpwError::InvalidPath(_))));
        assert!(matches!(Epw::from_file(temp.path()), Err(EpwError::InvalidPath(_))));

        Ok(())
    }

    #[test]
    fn test_latin1_station_name() -> Result<(), Box<dyn std::error::Error>> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("montreal.epw");
        let mut bytes = sample_text().replace("Denver Centennial  Golden   Nr", "Montr\u{1}al").into_bytes();
        let marker = bytes.iter().position(|b| *b == 1).ok_or("marker missing")?;
        bytes[marker] = 0xE9;
        fs::write(&path, bytes)?;

        let epw = Epw::from_file(&path)?;
        assert!(epw.location().city.starts_with("Montr"));
        Ok(())
    }
}
