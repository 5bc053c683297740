use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::parse::{Limits, MAX_ARGS, MAX_PIPES};

pub const CONFIG_ENV: &str = "SSHELL_CONFIG";
pub const LOG_DIR_ENV: &str = "SSHELL_LOG_DIR";

const DEFAULT_PROMPT: &str = "sshell@ucd$ ";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub prompt: String,
    pub max_args: usize,
    pub max_pipes: usize,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.into(),
            max_args: MAX_ARGS,
            max_pipes: MAX_PIPES,
            log_dir: None,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file named by `SSHELL_CONFIG`, then
    /// `SSHELL_LOG_DIR`.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(dir) = env::var_os(LOG_DIR_ENV) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_owned(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_args: self.max_args,
            max_pipes: self.max_pipes,
        }
    }
}
