//! The TOML settings file.

use crate::error::{LinepickError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Name of the matcher to start with.
    pub matcher: Option<String>,
    pub layout: Option<String>,
    pub prompt: Option<String>,
    /// Key name → action name.
    pub keymap: HashMap<String, String>,
    /// Matcher name → command and arguments.
    pub custom_matcher: BTreeMap<String, Vec<String>>,
}

impl ConfigFile {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| LinepickError::config(err.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| LinepickError::io(format!("reading {}", path.display()), err))?;
        Self::parse(&text).map_err(|err| match err {
            LinepickError::Config { message } => {
                LinepickError::config(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    /// `<config dir>/linepick/config.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("config.toml"))
    }

    /// Load the file named on the command line, or the default one if it exists.
    /// A missing default file means an empty configuration.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("loading settings from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}
