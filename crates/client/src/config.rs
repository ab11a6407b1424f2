use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/divvy.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the group-data provider.
    pub base_url: String,
    /// API key sent as a bearer token. Credentials are configured, never
    /// prompted for.
    pub api_key: String,
    /// Exchange-rate snapshot endpoint (USD base).
    pub rates_url: String,
    /// Hours a rate snapshot stays fresh before a refresh is attempted.
    pub rate_refresh_hours: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8090".to_string(),
            api_key: String::new(),
            rates_url: "https://open.er-api.com/v6/latest/USD".to_string(),
            rate_refresh_hours: 24,
        }
    }
}

pub fn load() -> Result<ClientConfig> {
    load_from(DEFAULT_CONFIG_PATH)
}

/// Loads from an optional TOML file, then `DIVVY_*` environment variables,
/// falling back to defaults.
pub fn load_from(path: &str) -> Result<ClientConfig> {
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("DIVVY"));
    Ok(builder.build()?.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_from("does/not/exist").unwrap();
        assert_eq!(config.rate_refresh_hours, 24);
        assert!(config.api_key.is_empty());
    }
}
