use crate::config::models::{GlobalConfig, Profile};
use crate::config::profile_name::ProfileName;
use crate::config::ProfileLoader;
use crate::constants;
use crate::error::Error;
use crate::fs::FileSystem;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed access to `config.toml` and the profile directory.
pub struct ConfigManager<F: FileSystem> {
    fs: F,
    config_dir: PathBuf,
}

impl<F: FileSystem> ConfigManager<F> {
    pub const fn with_fs(fs: F, config_dir: PathBuf) -> Self {
        Self { fs, config_dir }
    }

    /// Get the configuration directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Loads `config.toml`, falling back to defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_global_config(&self) -> Result<GlobalConfig, Error> {
        let config_path = self.config_dir.join(constants::CONFIG_FILE);
        if !self.fs.exists(&config_path) {
            debug!(target: "portico::config", "no config file at {}, using defaults", config_path.display());
            return Ok(GlobalConfig::default());
        }
        let content = self.fs.read_to_string(&config_path)?;
        toml::from_str(&content).map_err(|e| {
            Error::invalid_config(format!("{}: {e}", config_path.display()))
        })
    }
}

impl<F: FileSystem> ProfileLoader for ConfigManager<F> {
    fn load_profile(&self, name: &str) -> Result<Profile, Error> {
        let validated = ProfileName::new(name)?;
        let path = self
            .config_dir
            .join(constants::DIR_PROFILES)
            .join(format!("{}.{}", validated.as_str(), constants::FILE_EXT_JSON));
        let content = self
            .fs
            .read_to_string(&path)
            .map_err(|e| Error::profile_load(name, format!("{}: {e}", path.display())))?;
        let mut profile: Profile =
            serde_json::from_str(&content).map_err(|e| Error::profile_load(name, e))?;
        if profile.name.is_empty() {
            profile.name = name.to_string();
        }
        debug!(
            target: "portico::config",
            "loaded profile '{}' with {} authenticator(s)",
            profile.name,
            profile.authenticators.len()
        );
        Ok(profile)
    }
}

/// Resolves the configuration directory: `$PORTICO_CONFIG_DIR`, else `~/.config/portico`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf, Error> {
    if let Ok(dir) = std::env::var(constants::ENV_PORTICO_CONFIG_DIR) {
        return Ok(PathBuf::from(dir));
    }
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::invalid_config("could not determine the home directory"))?;
    Ok(home_dir.join(".config").join("portico"))
}
