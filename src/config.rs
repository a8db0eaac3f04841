//! Runtime settings: defaults, then an optional YAML file named by `ATLAS_CONFIG`,
//! then `ATLAS_*` environment variables.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::data::registry::Region;

pub const CONFIG_ENV: &str = "ATLAS_CONFIG";
pub const BIND_ENV: &str = "ATLAS_BIND";
pub const DATA_DIR_ENV: &str = "ATLAS_DATA_DIR";
pub const REGIONS_ENV: &str = "ATLAS_REGIONS";
pub const RELOAD_TOKEN_ENV: &str = "ATLAS_RELOAD_TOKEN";
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to parse config {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("ATLAS_REGIONS: {0}")]
    Regions(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind: String,
    pub data_dir: PathBuf,
    pub regions: Vec<Region>,
    pub reload_token: Option<String>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            data_dir: PathBuf::from("data/master"),
            regions: Region::ALL.to_vec(),
            reload_token: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Settings from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(|key| std::env::var(key).ok())
    }

    /// Settings from an arbitrary variable source; the config file path is read from it too.
    pub fn from_sources(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = match var(CONFIG_ENV).filter(|path| !path.trim().is_empty()) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        settings.apply_overrides(var)?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let set = |key: &str| var(key).filter(|value| !value.trim().is_empty());
        if let Some(bind) = set(BIND_ENV) {
            self.bind = bind;
        }
        if let Some(dir) = set(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(regions) = set(REGIONS_ENV) {
            self.regions = parse_regions(&regions).map_err(ConfigError::Regions)?;
        }
        if let Some(token) = set(RELOAD_TOKEN_ENV) {
            self.reload_token = Some(token);
        }
        if let Some(filter) = set(LOG_FILTER_ENV) {
            self.log_filter = filter;
        }
        Ok(())
    }
}

/// `"JP, NA"` -> `[Jp, Na]`, keeping first occurrences only.
pub fn parse_regions(raw: &str) -> Result<Vec<Region>, String> {
    let mut regions = Vec::new();
    for part in raw.split(',').filter(|part| !part.trim().is_empty()) {
        let region = part.parse::<Region>()?;
        if !regions.contains(&region) {
            regions.push(region);
        }
    }
    if regions.is_empty() {
        return Err("no regions listed".to_string());
    }
    Ok(regions)
}
