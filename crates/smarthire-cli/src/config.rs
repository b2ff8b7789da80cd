//! Configuration file location for the CLI.
//!
//! The file itself is [`SmartHireConfig`]; this module only decides where it
//! lives and where relative storage paths point.

use crate::error::{CliError, Result};
use smarthire_pipeline::SmartHireConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the configuration file is read from and written to.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLocation {
    path: PathBuf,
}

impl ConfigLocation {
    /// Default configuration file path: `~/.smarthire/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".smarthire").join("config.toml"))
    }

    /// Use `explicit` if given, otherwise the default path.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path,
            None => Self::default_path()?,
        };
        Ok(Self { path })
    }

    /// The configuration file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that relative storage paths resolve against.
    pub fn base_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Load the file, or the defaults when it does not exist.
    pub fn load(&self) -> Result<SmartHireConfig> {
        if self.path.exists() {
            Ok(SmartHireConfig::from_file(&self.path)?)
        } else {
            Ok(SmartHireConfig::default())
        }
    }

    /// Write a default configuration file. Returns false if one exists and `force` is not set.
    pub fn init(&self, force: bool) -> Result<bool> {
        if self.path.exists() && !force {
            return Ok(false);
        }

        // Create parent directory if it doesn't exist
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, SmartHireConfig::default().to_toml()?)?;
        Ok(true)
    }
}
