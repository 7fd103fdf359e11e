use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0} API key is missing")]
    CredentialMissing(&'static str),

    #[error("{provider} error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("Timed out after {timeout:?} waiting for lock on {}", path.display())]
    LockTimeout { path: PathBuf, timeout: Duration },

    #[error("Could not read config {}: {reason}", path.display())]
    ConfigRead { path: PathBuf, reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }

    /// Errors a caller must not silently proceed past.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::LockTimeout { .. } | Self::ConfigRead { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::CredentialMissing("OpenAI").to_string(),
            "OpenAI API key is missing"
        );
        let err = Error::LockTimeout {
            path: PathBuf::from("config.json.lock"),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 5s waiting for lock on config.json.lock"
        );
        assert!(err.is_config_error());
        assert!(!Error::provider("NewsAPI", "rateLimited").is_config_error());
    }
}
