//! Finds the TOML file holding the global directives.
//!
//! An explicit `--config` path wins. Otherwise `./trellis/config.toml` and
//! then the platform config directory are tried; with neither present the
//! plugin defaults apply.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use trellis::{TrellisError, config::AppConfig};

const LOCAL_CONFIG: &str = "trellis/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration file: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to parse TOML configuration {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl From<ConfigError> for TrellisError {
    fn from(err: ConfigError) -> Self {
        let kind = match err {
            ConfigError::Missing(_) => io::ErrorKind::NotFound,
            ConfigError::Parse { .. } => io::ErrorKind::InvalidData,
        };
        TrellisError::Io(io::Error::new(kind, err))
    }
}

/// Loads the global directives.
///
/// # Errors
///
/// Fails when the explicit path does not exist or when the chosen file is
/// not valid TOML for [`AppConfig`].
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, TrellisError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match discover() {
            Some(path) => path,
            None => {
                debug!("No configuration file found, using defaults");
                return Ok(AppConfig::default());
            }
        },
    };
    read(&path)
}

fn discover() -> Option<PathBuf> {
    let platform = ProjectDirs::from("com", "trellis", "trellis")
        .map(|dirs| dirs.config_dir().join("config.toml"));
    if platform.is_none() {
        debug!("No platform configuration directory");
    }

    std::iter::once(PathBuf::from(LOCAL_CONFIG))
        .chain(platform)
        .find(|path| path.is_file())
}

fn read(path: &Path) -> Result<AppConfig, TrellisError> {
    if !path.is_file() {
        return Err(ConfigError::Missing(path.to_path_buf()).into());
    }
    info!(path = path.display().to_string(); "Loading configuration");

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(extra = config.directives().extra().len(); "Configuration loaded");
    Ok(config)
}
