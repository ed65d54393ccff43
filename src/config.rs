use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Main application configuration, read from `~/.askr/config.toml` with
/// per-field defaults. The API key may also come from the environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bearer credential for the completion endpoint
    pub api_key: Option<String>,

    /// Model identifier sent with every request
    pub model: String,

    /// Base URL of the completion endpoint
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            base_url: "https://api.openai.com".to_string(),
        }
    }
}

/// Directory holding the config file and diagnostic log.
pub fn askr_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".askr"))
}

impl Config {
    /// Load configuration from `~/.askr/config.toml`, falling back to
    /// defaults when the file is absent.
    pub fn load() -> Result<Self> {
        let askr_home = askr_home()?;
        fs::create_dir_all(&askr_home).context("Failed to create .askr directory")?;

        let config_path = askr_home.join("config.toml");
        if config_path.exists() {
            let content =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Config::default())
        }
    }

    /// Get the API key from config or environment. A missing key is not an
    /// error here; it surfaces at the first completion call.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}
