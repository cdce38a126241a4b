/// Configuration loader
use super::schema::Config;
use crate::error::ConfigError;
use std::fs;
use std::path::Path;

/// Load configuration from a JSON file
///
/// Without a path the defaults are used (enabled, no secret).
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            parse_config(&content)?
        }
        None => Config::default(),
    };

    config.validate().map_err(ConfigError::Invalid)?;

    Ok(config)
}

/// Parse JSON config text; the secret is trimmed like a pasted value
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;
    let secret = config.secret.clone();
    Ok(config.with_secret(&secret))
}
