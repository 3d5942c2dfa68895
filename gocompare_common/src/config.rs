use crate::{GoCompareError, HashAlgorithm, SortOrder};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "gocompare.toml";

/// Read buffer used when streaming file contents into the hasher
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ordering used for every path listing
    #[serde(default)]
    pub sort_order: SortOrder,

    /// Content hashing algorithm
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,

    /// Emit a progress event every N files (derived from the common set size when unset)
    #[serde(default)]
    pub report_every: Option<usize>,

    /// Read buffer size in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Enable portable mode (config alongside binary)
    #[serde(default)]
    pub portable_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sort_order: SortOrder::default(),
            hash_algorithm: HashAlgorithm::default(),
            report_every: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            portable_mode: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
    pub exists: bool,
    pub portable: bool,
}

pub fn load_config(prefer_portable: bool) -> Result<LoadedConfig, GoCompareError> {
    let (path, portable) = resolve_config_path(prefer_portable)?;
    let mut loaded = load_config_from(&path)?;
    loaded.portable = portable;
    loaded.config.portable_mode = portable;
    Ok(loaded)
}

/// Load a config from an explicit location; a missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<LoadedConfig, GoCompareError> {
    let exists = path.exists();

    let config = if exists {
        let data = fs::read_to_string(path)?;
        toml::from_str(&data).map_err(|e| GoCompareError::Serialization(e.to_string()))?
    } else {
        AppConfig::default()
    };

    if config.buffer_size == 0 {
        return Err(GoCompareError::Config(
            "buffer_size must be greater than zero".to_string(),
        ));
    }
    if config.report_every == Some(0) {
        return Err(GoCompareError::Config(
            "report_every must be greater than zero".to_string(),
        ));
    }

    Ok(LoadedConfig {
        portable: config.portable_mode,
        config,
        path: path.to_path_buf(),
        exists,
    })
}

pub fn ensure_config(prefer_portable: bool) -> Result<LoadedConfig, GoCompareError> {
    let loaded = load_config(prefer_portable)?;
    if !loaded.exists {
        save_config(&loaded.path, &loaded.config)?;
    }
    Ok(loaded)
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), GoCompareError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let data = toml::to_string_pretty(config)
        .map_err(|e| GoCompareError::Serialization(e.to_string()))?;
    fs::write(path, data)?;
    Ok(())
}

fn resolve_config_path(prefer_portable: bool) -> Result<(PathBuf, bool), GoCompareError> {
    if let Some(portable_path) = portable_config_path() {
        if prefer_portable || portable_path.exists() {
            return Ok((portable_path, true));
        }
    }

    let dirs = ProjectDirs::from("", "gocompare", "gocompare")
        .ok_or_else(|| GoCompareError::Config("Unable to determine config directory".to_string()))?;
    Ok((dirs.config_dir().join(CONFIG_FILE_NAME), false))
}

fn portable_config_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
}
