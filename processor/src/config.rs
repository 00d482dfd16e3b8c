use gateway::GatewayConfig;
use serde::Deserialize;
use std::fs::File;

#[derive(Deserialize, Debug)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

fn default_space_id() -> String {
    "Space_1".into()
}

fn default_category() -> String {
    "student".into()
}

/// Process configuration, loaded once at startup. There is no reload
/// mechanism; restart to pick up changes.
#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    pub gateway: GatewayConfig,
    /// Identifier of the tracked space row within each lot.
    #[serde(default = "default_space_id")]
    pub space_id: String,
    /// Classification label written when a row is first created.
    #[serde(default = "default_category")]
    pub category: String,
    /// Optional shared secret required in the x-processor-secret header.
    pub processor_secret: Option<String>,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}
