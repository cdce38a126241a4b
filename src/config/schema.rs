/// Configuration schema for the signature fixer
use serde::{Deserialize, Serialize};
use std::fmt;

/// Log levels accepted in `log_level`
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Host-side configuration
///
/// Owned by the host; the signer only ever sees the secret, and only when
/// signing is enabled.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Automatic signature fixing on/off
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// HMAC shared secret. Empty means requests pass through unsigned.
    #[serde(default)]
    pub secret: String,

    /// Log level: "trace", "debug", "info", "warn", "error", "off"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            secret: String::new(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Replace the secret; surrounding whitespace is dropped
    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret = secret.trim().to_string();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(format!(
                "log_level must be one of {}, got {:?}",
                LOG_LEVELS.join(", "),
                self.log_level
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("enabled", &self.enabled)
            .field("secret", &format!("[REDACTED, {} chars]", self.secret.chars().count()))
            .field("log_level", &self.log_level)
            .finish()
    }
}
