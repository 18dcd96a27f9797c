use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::auth::AuthConfig;
use super::error::ConfigError;
use super::logging::LoggingConfig;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct ConfigV1 {
    pub bind_address: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
}

/// Load config from a YAML file, then apply `AUTHGATE_` environment
/// overrides (`AUTHGATE_AUTH__PASSWORD` sets `auth.password`).
pub fn load_config(path: &str) -> Result<ConfigV1, ConfigError> {
    let figment = Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed("AUTHGATE_").split("__"));
    from_figment(figment)
}

/// Parse a configuration from an in-memory YAML document.
pub fn config_from_yaml(yaml: &str) -> Result<ConfigV1, ConfigError> {
    from_figment(Figment::new().merge(Yaml::string(yaml)))
}

fn from_figment(figment: Figment) -> Result<ConfigV1, ConfigError> {
    let config = figment.extract::<Config>().map_err(Box::new)?;
    match config {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to render configuration schema: {}", e),
    }
}
