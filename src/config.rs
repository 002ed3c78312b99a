use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourcesConfig {
    pub codes: SourceConfig,
    pub rates: SourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            codes: SourceConfig {
                base_url: "https://www.iban.ru".to_string(),
            },
            rates: SourceConfig {
                base_url: "https://www.finmarket.ru".to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

fn default_timezone() -> String {
    "Europe/Moscow".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Zone in which "today" is evaluated for date validation.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Snapshots and codes persist here; unset means in-memory only.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            sources: SourcesConfig::default(),
            server: ServerConfig::default(),
            timezone: default_timezone(),
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Explicit path if given, otherwise the default location when a
    /// file exists there, otherwise built-in defaults.
    pub fn resolve(config_path: Option<&str>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_path(path),
            None => {
                let path = Self::default_config_path()?;
                if path.exists() {
                    Self::load_from_path(&path)
                } else {
                    debug!("no config file found, using built-in defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("ru", "kursview", "kursview")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|e| anyhow!("unknown time zone `{}`: {e}", self.timezone))
    }
}
