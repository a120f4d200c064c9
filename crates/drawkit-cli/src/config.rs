//! Locating and reading the drawkit configuration file.
//!
//! The first file found wins: the `--config` path, then
//! `drawkit/config.toml` under the working directory, then `config.toml` in
//! the platform config directory. Without any file the built-in defaults
//! apply.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use drawkit::{DrawkitError, config::AppConfig};

/// Config file looked up relative to the working directory.
const LOCAL_CONFIG: &str = "drawkit/config.toml";

/// Failures reading a drawkit config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot read config file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid drawkit config in {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

impl From<ConfigError> for DrawkitError {
    fn from(err: ConfigError) -> Self {
        DrawkitError::Config(err.to_string())
    }
}

/// Where the active configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigSource {
    Explicit(PathBuf),
    Local(PathBuf),
    System(PathBuf),
    Defaults,
}

impl ConfigSource {
    fn locate(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::Explicit(path.to_path_buf());
        }

        let local = PathBuf::from(LOCAL_CONFIG);
        if local.is_file() {
            return Self::Local(local);
        }

        match ProjectDirs::from("com", "drawkit", "drawkit") {
            Some(dirs) => {
                let system = dirs.config_dir().join("config.toml");
                if system.is_file() {
                    return Self::System(system);
                }
                debug!(path = system.display().to_string(); "No config in platform directory");
            }
            None => debug!("Platform config directory unavailable"),
        }
        Self::Defaults
    }

    fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Local(path) | Self::System(path) => Some(path),
            Self::Defaults => None,
        }
    }
}

/// Loads the drawkit configuration.
///
/// # Arguments
///
/// * `explicit_path` - The `--config` value, which skips the search
///
/// # Errors
///
/// Returns [`DrawkitError::Config`] when an explicit path does not exist or
/// the chosen file cannot be read or parsed. A missing file found by the
/// search simply falls back to the defaults.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, DrawkitError> {
    let source = ConfigSource::locate(explicit_path.as_ref().map(|path| path.as_ref()));

    let Some(path) = source.path() else {
        debug!("Using default configuration");
        return Ok(AppConfig::default());
    };

    let config = read_config(path)?;
    info!(source:? = source; "Configuration loaded");
    Ok(config)
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    toml::from_str(&content).map_err(|err| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: err.message().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use drawkit::config::BatchMode;

    use super::*;

    #[test]
    fn test_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[editing]\nbatch = \"best-effort\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.editing().batch(), BatchMode::BestEffort);
    }

    #[test]
    fn test_explicit_path_skips_search() {
        let path = Path::new("/nowhere/drawkit.toml");
        assert_eq!(
            ConfigSource::locate(Some(path)),
            ConfigSource::Explicit(path.to_path_buf())
        );
        assert_eq!(ConfigSource::Defaults.path(), None);
    }

    #[test]
    fn test_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("absent.toml"))).unwrap_err();

        assert!(matches!(err, DrawkitError::Config(_)));
        assert!(err.to_string().contains("absent.toml does not exist"));
    }

    #[test]
    fn test_invalid_toml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout]\nvertical_spacing = \"wide\"\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, DrawkitError::Config(_)));
        let message = err.to_string();
        assert!(message.contains("invalid drawkit config in"));
        assert!(message.contains("config.toml"));
    }
}
