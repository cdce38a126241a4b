/// Error types
use thiserror::Error;

/// Signing failures surfaced to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignError {
    /// The MAC primitive could not be keyed. Retrying with the same input cannot succeed.
    #[error("Failed to initialize HMAC-SHA256: {0}")]
    CryptoInit(String),
}

/// Errors while parsing a raw HTTP request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing to parse.
    #[error("Request is empty")]
    Empty,

    /// First line is not `METHOD target VERSION`.
    #[error("Malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// Header line without a `:` separator.
    #[error("Malformed header line: {0:?}")]
    MalformedHeader(String),
}

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
