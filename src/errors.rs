//! Error types for the gamehub webhook receiver
//!
//! One enum per concern, aggregated under [`GamehubError`].

use thiserror::Error;

/// Root error type for all gamehub operations
#[derive(Debug, Error)]
pub enum GamehubError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Webhook verification and parsing errors
    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    /// Wallet backend errors
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// Server bind/serve failures
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Failures of the webhook core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WebhookError {
    /// Body is not a JSON object
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Signature did not match the body
    #[error("Invalid webhook signature")]
    InvalidSignature,

    /// Handler constructed without a shared secret
    #[error("Webhook secret not configured")]
    SecretRequired,
}

/// Wallet backend errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Backend failure: {0}")]
    Backend(String),
}

/// Configuration and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),
}

// Convenience type alias for Results
pub type GamehubResult<T> = Result<T, GamehubError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_error_display() {
        let config_error = ConfigurationError::LoadFailed("test".to_string());
        let error = GamehubError::Configuration(config_error);

        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("test"));
    }

    #[test]
    fn test_invalid_value_details() {
        let error = ConfigurationError::InvalidValue {
            field: "GAMEHUB_PORT".to_string(),
            value: "abc".to_string(),
            reason: "Invalid port number".to_string(),
        };

        assert!(error.to_string().contains("GAMEHUB_PORT"));
        assert!(error.to_string().contains("'abc'"));
    }

    #[test]
    fn test_error_conversion() {
        let error: GamehubError = WebhookError::InvalidSignature.into();

        match error {
            GamehubError::Webhook(WebhookError::InvalidSignature) => {}
            _ => panic!("Expected webhook error"),
        }
    }

    #[test]
    fn test_error_source() {
        let error = GamehubError::Webhook(WebhookError::MalformedPayload("eof".to_string()));
        assert!(error.source().is_some());
    }
}
