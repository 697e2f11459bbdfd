use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Name of the document collection holding the notes.
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    #[default]
    Memory,
    Postgres {
        dsn: String,
    },
}

const fn default_port() -> u16 {
    8000
}

fn default_collection() -> String {
    "notes".to_string()
}

fn load_from_file(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(Into::into)
}

fn load_from_env() -> Result<Config, Box<dyn std::error::Error>> {
    let port = match env::var("PORT") {
        Ok(port) => port
            .parse::<u16>()
            .map_err(|e| format!("Failed to parse PORT: {e}"))?,
        Err(_) => default_port(),
    };

    let collection = env::var("NOTES_COLLECTION").unwrap_or_else(|_| default_collection());

    let store = match env::var("PG_DSN") {
        Ok(dsn) => StoreConfig::Postgres { dsn },
        Err(_) => StoreConfig::Memory,
    };

    Ok(Config {
        port,
        collection,
        store,
    })
}

/// Tries `config_path`, then `config.yaml`, then `config.example.yaml`,
/// then environment variables.
pub fn load_config_from(config_path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    // Try requested path
    if Path::new(config_path).exists() {
        return load_from_file(Path::new(config_path));
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return load_from_file(Path::new("config.yaml"));
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'",
            config_path
        );
        return load_from_file(Path::new("config.example.yaml"));
    }

    // Fallback to environment variables
    tracing::info!(
        "No config file found, attempting to load configuration from environment variables"
    );
    load_from_env().map_err(|e| {
        format!(
            "Config file not found and environment variables are invalid. \
             Tried: '{config_path}', 'config.yaml', 'config.example.yaml', and environment variables. \
             Error: {e}"
        )
        .into()
    })
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let config_path = env::var("NOTES_API_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    load_config_from(&config_path)
}
