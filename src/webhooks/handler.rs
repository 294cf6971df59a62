//! Webhook Handler
//!
//! Holds the shared secret and ties signature verification to parsing.

use super::{payload::WebhookEvent, signature};
use crate::errors::WebhookError;
use std::{fmt, sync::Arc};

/// Verifies and parses inbound webhooks for one shared secret.
///
/// The secret is fixed at construction. Cloning is cheap and clones share
/// the secret, so one handler can serve any number of concurrent requests.
#[derive(Clone)]
pub struct WebhookHandler {
    secret: Arc<str>,
}

impl WebhookHandler {
    /// Create a handler; an empty secret is rejected
    pub fn new(secret: impl Into<String>) -> Result<Self, WebhookError> {
        let secret: String = secret.into();
        if secret.is_empty() {
            return Err(WebhookError::SecretRequired);
        }
        Ok(Self {
            secret: Arc::from(secret),
        })
    }

    /// Lowercase hex HMAC-SHA256 of `payload` under this handler's secret
    pub fn sign(&self, payload: &[u8]) -> String {
        signature::sign(self.secret.as_bytes(), payload)
    }

    /// Constant-time check of `signature_hex` against `payload`
    pub fn verify(&self, payload: &[u8], signature_hex: &str) -> bool {
        signature::verify(self.secret.as_bytes(), payload, signature_hex)
    }

    /// Parse without authenticating; prefer [`WebhookHandler::verify_and_parse`]
    pub fn parse(&self, payload: &[u8]) -> Result<WebhookEvent, WebhookError> {
        WebhookEvent::parse(payload)
    }

    /// Authenticate, then parse. The body is never parsed when the
    /// signature does not match.
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_hex: &str,
    ) -> Result<WebhookEvent, WebhookError> {
        if !self.verify(payload, signature_hex) {
            return Err(WebhookError::InvalidSignature);
        }
        self.parse(payload)
    }
}

impl fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("secret", &"<redacted>")
            .finish()
    }
}
