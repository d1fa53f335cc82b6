//! Subcommands of the hyresavi CLI.

pub mod batch;
pub mod config;
pub mod output;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use hyresavi_core::HyresaviConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hyresavi")
        .join("config.json")
}

/// Load configuration from an explicit path, else from the default
/// location if a file exists there, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<HyresaviConfig> {
    if let Some(path) = config_path {
        return Ok(HyresaviConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        return Ok(HyresaviConfig::from_file(&default_path)?);
    }

    Ok(HyresaviConfig::default())
}

/// User id for new records: command line, then config, then "local".
pub fn resolve_user(arg: Option<&str>, config: &HyresaviConfig) -> String {
    arg.map(str::to_string)
        .or_else(|| config.pipeline.default_user.clone())
        .unwrap_or_else(|| "local".to_string())
}
