//! JSON-RPC request handling

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};
use ladybug_epw::WeatherField;
use crate::config::Config;
use crate::error::ToolError;
use crate::tools;

pub const PROTOCOL_VERSION: &str = "2025-11-25";
const SERVER_NAME: &str = "ladybug";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const RESOURCE_PREFIX: &str = "ladybug://weather/";

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

// MCP Protocol types
#[derive(Debug, Deserialize)]
pub struct McpRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<JsonValue>,
    pub method: String,
    #[serde(default)]
    pub params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    /// Serialized as `null` when the request id could not be read
    pub id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl McpResponse {
    pub fn parse_error(details: impl std::fmt::Display) -> Self {
        McpResponse {
            jsonrpc: "2.0".to_string(),
            id: None,
            result: None,
            error: Some(McpError {
                code: PARSE_ERROR,
                message: format!("Parse error: {}", details),
                data: None,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        McpError {
            code: INVALID_PARAMS,
            message: err.to_string(),
            data: serde_json::to_value(&err).ok(),
        }
    }
}

pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Server { config }
    }

    pub fn handle_request(&self, request: &McpRequest) -> McpResponse {
        let result = match request.method.as_str() {
            // Lifecycle
            "initialize" => Ok(self.initialize(&request.params)),
            "initialized" => Ok(json!({})),
            "ping" => Ok(json!({})),

            // Tools
            "tools/list" => Ok(tools::list()),
            "tools/call" => self.tool_call(&request.params).map_err(McpError::from),

            // Resources
            "resources/list" => Ok(self.resources_list()),
            "resources/read" => self.resources_read(&request.params).map_err(McpError::from),

            _ => Err(McpError {
                code: METHOD_NOT_FOUND,
                message: format!("Method not found: {}", request.method),
                data: None,
            }),
        };

        match result {
            Ok(r) => McpResponse {
                jsonrpc: "2.0".to_string(),
                id: request.id.clone(),
                result: Some(r),
                error: None,
            },
            Err(e) => McpResponse {
                jsonrpc: "2.0".to_string(),
                id: request.id.clone(),
                result: None,
                error: Some(e),
            },
        }
    }

    fn initialize(&self, params: &Option<JsonValue>) -> JsonValue {
        let client_info = params.as_ref()
            .and_then(|p| p.get("clientInfo"))
            .and_then(|c| c.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or("unknown");

        // Use client's protocol version for compatibility
        let client_protocol = params.as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str())
            .unwrap_or(PROTOCOL_VERSION);

        info!(client = client_info, protocol = client_protocol, "client connected");

        json!({
            "protocolVersion": client_protocol,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION,
                "description": "Building-science unit conversion and EPW weather data"
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                },
                "resources": {
                    "subscribe": false,
                    "listChanged": false
                }
            },
            "instructions": "Ladybug converts measurement values between units of a data type (Temperature, Distance, Energy, ...) and reads hourly weather data from .epw files. Use 'list_units' to see every data type and its units, and resources/list to find weather files."
        })
    }

    fn tool_call(&self, params: &Option<JsonValue>) -> Result<JsonValue, ToolError> {
        let params = params.as_ref().ok_or_else(|| ToolError::invalid_args("missing params"))?;

        let name = params.get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::invalid_args("missing tool name"))?;

        let args = params.get("arguments").cloned().unwrap_or(json!({}));

        debug!(tool = name, "calling tool");
        tools::call(&self.config, name, args)
    }

    fn resources_list(&self) -> JsonValue {
        let resources: Vec<JsonValue> = self.config.weather_files().iter().map(|name| {
            json!({
                "uri": format!("{}{}", RESOURCE_PREFIX, name),
                "name": name,
                "description": format!("EPW weather file: {}.epw", name),
                "mimeType": "application/json"
            })
        }).collect();

        json!({ "resources": resources })
    }

    fn resources_read(&self, params: &Option<JsonValue>) -> Result<JsonValue, ToolError> {
        let uri = params.as_ref()
            .and_then(|p| p.get("uri"))
            .and_then(|u| u.as_str())
            .ok_or_else(|| ToolError::invalid_args("missing uri parameter"))?;

        let name = uri.strip_prefix(RESOURCE_PREFIX).ok_or_else(|| ToolError::invalid_uri(uri))?;
        let epw = self.config.load_weather(name)?;

        let fields: Vec<JsonValue> = WeatherField::ALL.iter().map(|field| {
            json!({
                "key": field.key(),
                "name": field.full_name(),
                "unit": field.unit(),
                "data_type": field.data_type_name()
            })
        }).collect();

        let summary = json!({
            "location": epw.location(),
            "hours": epw.len(),
            "fields": fields
        });

        Ok(json!({
            "contents": [{
                "uri": uri,
                "mimeType": "application/json",
                "text": summary.to_string()
            }]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn request(id: Option<i64>, method: &str, params: JsonValue) -> McpRequest {
        McpRequest {
            jsonrpc: "2.0".to_string(),
            id: id.map(JsonValue::from),
            method: method.to_string(),
            params: Some(params),
        }
    }

    fn server(path: &std::path::Path) -> Server {
        Server::new(Config { data_path: path.to_path_buf() })
    }

    #[test]
    fn test_initialize_echoes_protocol() {
        let server = server(std::path::Path::new("/nonexistent"));
        let response = server.handle_request(&request(Some(1), "initialize", json!({
            "protocolVersion": "2024-11-05",
            "clientInfo": { "name": "test" }
        })));
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "ladybug");
        assert_eq!(response.id, Some(json!(1)));
    }

    #[test]
    fn test_unknown_method() {
        let server = server(std::path::Path::new("/nonexistent"));
        let response = server.handle_request(&request(Some(2), "prompts/list", json!({})));
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[test]
    fn test_tool_error_carries_structured_data() {
        let server = server(std::path::Path::new("/nonexistent"));
        let response = server.handle_request(&request(Some(3), "tools/call", json!({
            "name": "convert",
            "arguments": { "values": [1.0], "from_unit": "m", "to_unit": "furlong" }
        })));
        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        let data = error.data.unwrap();
        assert_eq!(data["code"], "UNRECOGNIZED_UNIT");
        assert!(data["suggestion"].as_str().unwrap().starts_with("Accepted units: Distance"));
    }

    #[test]
    fn test_tool_call() {
        let server = server(std::path::Path::new("/nonexistent"));
        let response = server.handle_request(&request(Some(4), "tools/call", json!({
            "name": "convert",
            "arguments": { "values": [1.0], "from_unit": "fraction", "to_unit": "%" }
        })));
        assert_eq!(response.result.unwrap()["values"], json!([100.0]));

        let response = server.handle_request(&request(Some(5), "tools/call", json!({})));
        assert_eq!(response.error.unwrap().data.unwrap()["code"], "INVALID_ARGS");
    }

    #[test]
    fn test_parse_error_response() {
        let response = McpResponse::parse_error("expected value");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"]["code"], PARSE_ERROR);
        assert_eq!(json.get("id"), Some(&JsonValue::Null));
        assert!(json.get("result").is_none());
    }

    #[test]
    fn test_resources() -> Result<(), Box<dyn std::error::Error>> {
        let temp = tempfile::tempdir()?;
        let mut text = vec!["LOCATION,Golden,CO,USA,TMY3,724666,39.74,-105.18,-7.0,1829.0".to_string()];
        text.extend((0..7).map(|i| format!("HEADER {}", i)));
        fs::write(temp.path().join("golden.epw"), text.join("\n"))?;
        fs::write(temp.path().join("notes.txt"), "not weather")?;

        let server = server(temp.path());
        let response = server.handle_request(&request(Some(6), "resources/list", json!({})));
        let result = response.result.ok_or("no result")?;
        let resources = result["resources"].as_array().ok_or("no resources")?;
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0]["uri"], "ladybug://weather/golden");

        let response = server.handle_request(&request(Some(7), "resources/read", json!({
            "uri": "ladybug://weather/golden"
        })));
        let result = response.result.ok_or("no result")?;
        let summary: JsonValue = serde_json::from_str(result["contents"][0]["text"].as_str().ok_or("no text")?)?;
        assert_eq!(summary["location"]["city"], "Golden");
        assert_eq!(summary["hours"], 0);
        assert_eq!(summary["fields"].as_array().map(Vec::len), Some(15));

        let response = server.handle_request(&request(Some(8), "resources/read", json!({
            "uri": "file:///golden.epw"
        })));
        assert_eq!(response.error.ok_or("no error")?.data.ok_or("no data")?["code"], "INVALID_URI");

        Ok(())
    }
}
