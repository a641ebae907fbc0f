//! Error types for PowLedger

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("Invalid peer address: {0}")]
    InvalidPeerAddress(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ChainError::InvalidPeerAddress("not a url".to_string());
        assert_eq!(err.to_string(), "Invalid peer address: not a url");

        let err = ChainError::Config("api_port must be non-zero".to_string());
        assert_eq!(err.to_string(), "Configuration error: api_port must be non-zero");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
        let err: ChainError = io.into();
        assert!(matches!(err, ChainError::Io(msg) if msg.contains("config.toml")));
    }
}
