//! Tool implementations
//!
//! Each tool takes its `arguments` object and returns an MCP tool result:
//! a `content` array with a text summary plus structured fields.

use std::sync::Arc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use ladybug_datatype::{DataType, DataTypeError, UnitConversion, UnitSystem, DATA_TYPES};
use ladybug_epw::{days_in_month, AnalysisPeriod, HourlyData, WeatherField};
use crate::config::Config;
use crate::error::ToolError;

pub fn call(config: &Config, name: &str, args: JsonValue) -> Result<JsonValue, ToolError> {
    match name {
        "convert" => tool_convert(args),
        "to_si" => tool_to_system(args, UnitSystem::Si),
        "to_ip" => tool_to_system(args, UnitSystem::Ip),
        "data_type" => tool_data_type(args),
        "list_units" => tool_list_units(),
        "weather_data" => tool_weather_data(config, args),
        _ => Err(ToolError::unknown_tool(name)),
    }
}

pub fn list() -> JsonValue {
    json!({
        "tools": [
            {
                "name": "convert",
                "description": "Convert numeric values between two units of the same data type.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "values": {
                            "type": "array",
                            "items": { "type": "number" },
                            "description": "Values to convert"
                        },
                        "from_unit": { "type": "string", "description": "Unit of the input values" },
                        "to_unit": { "type": "string", "description": "Target unit" },
                        "data_type": {
                            "type": "string",
                            "description": "Data type name (e.g. Temperature). Inferred from from_unit when omitted."
                        }
                    },
                    "required": ["values", "from_unit", "to_unit"]
                }
            },
            {
                "name": "to_si",
                "description": "Convert values to the SI default unit of their data type.",
                "inputSchema": unit_system_schema()
            },
            {
                "name": "to_ip",
                "description": "Convert values to the IP (imperial) default unit of their data type.",
                "inputSchema": unit_system_schema()
            },
            {
                "name": "data_type",
                "description": "Describe a data type by name and/or unit. Unknown name/unit pairs yield a generic type.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Data type name" },
                        "unit": { "type": "string", "description": "Unit label" }
                    }
                }
            },
            {
                "name": "list_units",
                "description": "List every registered data type and its accepted units.",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "weather_data",
                "description": "Read hourly values of one field from a weather file in the data directory.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "file": { "type": "string", "description": "Weather file name without .epw extension" },
                        "field": {
                            "type": "string",
                            "description": "Weather field key",
                            "enum": WeatherField::ALL.iter().map(|f| f.key()).collect::<Vec<_>>()
                        },
                        "period": {
                            "type": "object",
                            "description": "Analysis period (defaults to the whole year). Hours are 1-24.",
                            "properties": {
                                "st_month": { "type": "integer" },
                                "st_day": { "type": "integer" },
                                "st_hour": { "type": "integer" },
                                "end_month": { "type": "integer" },
                                "end_day": { "type": "integer", "description": "Defaults to the last day of end_month" },
                                "end_hour": { "type": "integer" },
                                "timestep": { "type": "integer" }
                            }
                        },
                        "unit": { "type": "string", "description": "Target unit label" },
                        "unit_system": {
                            "type": "string",
                            "description": "Convert to the SI or IP default unit instead of an explicit unit",
                            "enum": ["si", "ip"]
                        }
                    },
                    "required": ["file", "field"]
                }
            }
        ]
    })
}

fn unit_system_schema() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "values": {
                "type": "array",
                "items": { "type": "number" },
                "description": "Values to convert"
            },
            "unit": { "type": "string", "description": "Unit of the input values" },
            "data_type": {
                "type": "string",
                "description": "Data type name. Inferred from unit when omitted."
            }
        },
        "required": ["values", "unit"]
    })
}

fn parse_args<T: DeserializeOwned>(args: JsonValue) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::invalid_args(e.to_string()))
}

/// Explicit data type name, else the type owning `unit`
fn resolve(data_type: Option<&str>, unit: &str) -> Result<Arc<DataType>, ToolError> {
    Ok(match data_type {
        Some(name) => DATA_TYPES.type_by_name(name)?,
        None => DATA_TYPES.type_by_unit(unit)?,
    })
}

fn format_values(values: &[f64]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Deserialize)]
struct ConvertArgs {
    values: Vec<f64>,
    from_unit: String,
    to_unit: String,
    data_type: Option<String>,
}

fn tool_convert(args: JsonValue) -> Result<JsonValue, ToolError> {
    let args: ConvertArgs = parse_args(args)?;
    let data_type = resolve(args.data_type.as_deref(), &args.from_unit)?;
    let values = data_type.to_unit(&args.values, &args.to_unit, &args.from_unit)?;

    Ok(json!({
        "content": [{
            "type": "text",
            "text": format!("[{}] {} = [{}] {}", format_values(&args.values), args.from_unit, format_values(&values), args.to_unit)
        }],
        "data_type": data_type.name(),
        "unit": args.to_unit,
        "values": values
    }))
}

#[derive(Debug, Deserialize)]
struct UnitSystemArgs {
    values: Vec<f64>,
    unit: String,
    data_type: Option<String>,
}

fn tool_to_system(args: JsonValue, system: UnitSystem) -> Result<JsonValue, ToolError> {
    let args: UnitSystemArgs = parse_args(args)?;
    let data_type = resolve(args.data_type.as_deref(), &args.unit)?;
    let (values, unit) = match system {
        UnitSystem::Si => data_type.to_si(&args.values, &args.unit)?,
        UnitSystem::Ip => data_type.to_ip(&args.values, &args.unit)?,
    };

    Ok(json!({
        "content": [{
            "type": "text",
            "text": format!("[{}] {} = [{}] {}", format_values(&args.values), args.unit, format_values(&values), unit)
        }],
        "data_type": data_type.name(),
        "unit": unit,
        "values": values
    }))
}

#[derive(Debug, Deserialize)]
struct DataTypeArgs {
    name: Option<String>,
    unit: Option<String>,
}

fn tool_data_type(args: JsonValue) -> Result<JsonValue, ToolError> {
    let args: DataTypeArgs = parse_args(args)?;
    let data_type = match (args.name.as_deref(), args.unit.as_deref()) {
        (Some(name), unit) => DATA_TYPES.describe_by_name_and_unit(name, unit),
        (None, Some(unit)) => DATA_TYPES.type_by_unit(unit)?,
        (None, None) => return Err(ToolError::invalid_args("provide a name, a unit, or both")),
    };
    let record = serde_json::to_value(&*data_type).map_err(DataTypeError::from)?;

    Ok(json!({
        "content": [{ "type": "text", "text": data_type.units_summary() }],
        "generic": data_type.is_generic(),
        "record": record
    }))
}

fn tool_list_units() -> Result<JsonValue, ToolError> {
    Ok(json!({
        "content": [{ "type": "text", "text": DATA_TYPES.all_possible_units() }],
        "data_types": DATA_TYPES.names()
    }))
}

fn default_start() -> u32 {
    1
}

fn default_end_month() -> u32 {
    12
}

fn default_end_hour() -> u32 {
    24
}

#[derive(Debug, Deserialize)]
struct PeriodArgs {
    #[serde(default = "default_start")]
    st_month: u32,
    #[serde(default = "default_start")]
    st_day: u32,
    #[serde(default = "default_start")]
    st_hour: u32,
    #[serde(default = "default_end_month")]
    end_month: u32,
    /// Last day of `end_month` when omitted
    end_day: Option<u32>,
    #[serde(default = "default_end_hour")]
    end_hour: u32,
    #[serde(default = "default_start")]
    timestep: u32,
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    file: String,
    field: String,
    period: Option<PeriodArgs>,
    unit: Option<String>,
    unit_system: Option<UnitSystem>,
}

fn tool_weather_data(config: &Config, args: JsonValue) -> Result<JsonValue, ToolError> {
    let args: WeatherArgs = parse_args(args)?;
    let field: WeatherField = args.field.parse()?;
    let epw = config.load_weather(&args.file)?;

    let data = match args.period {
        Some(p) => {
            let end_day = match p.end_day {
                Some(day) => day,
                None => days_in_month(p.end_month)?,
            };
            let period = AnalysisPeriod::new(
                p.st_month, p.st_day, p.st_hour, p.end_month, end_day, p.end_hour, p.timestep,
            )?;
            epw.hourly_data_by_analysis_period(field, &period)
        }
        None => epw.annual_hourly_data(field),
    };

    let data = match (args.unit.as_deref(), args.unit_system) {
        (Some(_), Some(_)) => return Err(ToolError::invalid_args("give either unit or unit_system, not both")),
        (Some(unit), None) => data.convert_to_unit(unit)?,
        (None, Some(UnitSystem::Si)) => data.to_si()?,
        (None, Some(UnitSystem::Ip)) => data.to_ip()?,
        (None, None) => data,
    };

    Ok(json!({
        "content": [{ "type": "text", "text": summarize(&data) }],
        "header": data.header(),
        "timestamps": data.timestamps(),
        "values": data.values()
    }))
}

fn summarize(data: &HourlyData) -> String {
    let header = data.header();
    let (start_month, start_day, start_hour) = header.start();
    let (end_month, end_day, end_hour) = header.end();
    let mut text = format!(
        "{} ({}) in {} from {}/{} {}h to {}/{} {}h: {} values",
        header.full_name(), header.unit(), header.city(),
        start_month, start_day, start_hour, end_month, end_day, end_hour,
        data.len()
    );
    if !data.is_empty() {
        let values = data.values();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        text.push_str(&format!(", min {}, max {}, mean {:.2}", min, max, mean));
    }
    text
}
