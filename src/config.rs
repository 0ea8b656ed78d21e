//! Settings: optional TOML file plus environment-variable credentials.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_API_USER: &str = "RISKWATCH_API_USER";
pub const ENV_API_PASSWORD: &str = "RISKWATCH_API_PASSWORD";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub api: ApiSettings,
    pub refresh: RefreshSettings,
    /// When set, every fetch's raw response is dumped here.
    pub dump_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:9000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub host: String,
    /// Per-fetch deadline. The source occasionally responds slowly, so this
    /// is more generous than a typical connect timeout.
    pub timeout_secs: u64,
    /// Credentials never come from the config file.
    #[serde(skip)]
    pub username: String,
    #[serde(skip)]
    pub password: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: "https://incident-api.use1stag.elevatesecurity.io".to_string(),
            timeout_secs: 10,
            username: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    pub interval_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self { interval_secs: 8 }
    }
}

impl Settings {
    /// Load settings from a TOML file (or defaults when no file is given),
    /// then pull credentials from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => {
                let text = fs::read_to_string(p)
                    .with_context(|| format!("reading settings file {}", p.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("parsing settings file {}", p.display()))?
            }
            None => Settings::default(),
        };
        settings.api.username = std::env::var(ENV_API_USER).unwrap_or_default();
        settings.api.password = std::env::var(ENV_API_PASSWORD).unwrap_or_default();
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.server.bind, "0.0.0.0:9000");
        assert_eq!(settings.refresh.interval_secs, 8);
        assert!(settings.dump_dir.is_none());
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[server]\nbind = \"127.0.0.1:9100\"\n\n[refresh]\ninterval_secs = 60\n"
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.server.bind, "127.0.0.1:9100");
        assert_eq!(settings.refresh.interval_secs, 60);
        // Untouched sections keep their defaults.
        assert_eq!(settings.api.timeout_secs, 10);
    }
}
