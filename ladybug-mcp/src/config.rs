//! Server configuration, read from the environment once at startup

use std::env;
use std::fs;
use std::path::PathBuf;
use crate::error::ToolError;
use ladybug_epw::Epw;

const DATA_PATH_VAR: &str = "LADYBUG_DATA_PATH";
const DEFAULT_DATA_PATH: &str = "/app/ladybug";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `.epw` files
    pub data_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            data_path: env::var(DATA_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH)),
        }
    }

    /// Names (without extension) of the weather files in the data path, sorted
    pub fn weather_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.data_path)
            .into_iter()
            .flatten()
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().map_or(false, |e| e == "epw"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        names
    }

    /// Load a weather file by name, with or without the `.epw` extension
    pub fn load_weather(&self, name: &str) -> Result<Epw, ToolError> {
        let stem = name.strip_suffix(".epw").unwrap_or(name);
        if stem.is_empty() || stem.contains(['/', '\\']) || stem.contains("..") {
            return Err(ToolError::invalid_args(format!("'{}' is not a weather file name", name))
                .with_suggestion("Use resources/list to see available weather files"));
        }
        Ok(Epw::from_file(self.data_path.join(format!("{}.epw", stem)))?)
    }
}
