//! Canonical webhook replies
//!
//! Every balance in a reply is integer minor units, converted from the
//! major-unit float the caller supplies via [`money::major_to_minor`].

use super::money;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

pub const CODE_PLAYER_NOT_FOUND: &str = "PLAYER_NOT_FOUND";
pub const CODE_INSUFFICIENT_FUNDS: &str = "INSUFFICIENT_FUNDS";

/// Reply body returned to the webhook sender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebhookResponse(Map<String, Value>);

impl WebhookResponse {
    /// `{status: "success", balance: <minor units>}`
    pub fn success(balance: f64) -> Self {
        Self::success_with(balance, Map::new())
    }

    /// Success reply with additional fields. `status` and `balance` always
    /// reflect the arguments; extra keys can add to them but not replace them.
    pub fn success_with(balance: f64, extra: Map<String, Value>) -> Self {
        let mut body = extra;
        body.insert("status".to_string(), Value::from(STATUS_SUCCESS));
        body.insert("balance".to_string(), Value::from(money::major_to_minor(balance)));
        Self(body)
    }

    /// `{status: "error", error_code, error_message}`
    pub fn error(code: &str, message: &str) -> Self {
        let mut body = Map::new();
        body.insert("status".to_string(), Value::from(STATUS_ERROR));
        body.insert("error_code".to_string(), Value::from(code));
        body.insert("error_message".to_string(), Value::from(message));
        Self(body)
    }

    pub fn player_not_found() -> Self {
        Self::error(CODE_PLAYER_NOT_FOUND, "Player not found")
    }

    pub fn insufficient_funds(balance: f64) -> Self {
        let mut response = Self::error(CODE_INSUFFICIENT_FUNDS, "Insufficient funds");
        response
            .0
            .insert("balance".to_string(), Value::from(money::major_to_minor(balance)));
        response
    }

    /// Success reply for a duplicate delivery of an already-applied transaction
    pub fn already_processed(balance: f64) -> Self {
        let mut extra = Map::new();
        extra.insert("already_processed".to_string(), Value::Bool(true));
        Self::success_with(balance, extra)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_success(&self) -> bool {
        self.get("status").and_then(Value::as_str) == Some(STATUS_SUCCESS)
    }

    pub fn error_code(&self) -> Option<&str> {
        self.get("error_code").and_then(Value::as_str)
    }

    /// Balance in minor units, if the reply carries one
    pub fn balance(&self) -> Option<i64> {
        self.get("balance").and_then(Value::as_i64)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_response() {
        let response = WebhookResponse::success(100.50);
        assert_eq!(response.into_value(), json!({"status": "success", "balance": 10050}));
    }

    #[test]
    fn test_success_with_extra_fields() {
        let mut extra = Map::new();
        extra.insert("currency".to_string(), json!("USD"));
        extra.insert("status".to_string(), json!("overridden"));
        extra.insert("balance".to_string(), json!(1));

        let response = WebhookResponse::success_with(12.34, extra);
        assert_eq!(
            response.into_value(),
            json!({"status": "success", "balance": 1234, "currency": "USD"})
        );
    }

    #[test]
    fn test_error_response() {
        let response = WebhookResponse::error("TEST_ERROR", "Test message");
        assert!(!response.is_success());
        assert_eq!(
            response.into_value(),
            json!({"status": "error", "error_code": "TEST_ERROR", "error_message": "Test message"})
        );
    }

    #[test]
    fn test_player_not_found_response() {
        let response = WebhookResponse::player_not_found();
        assert_eq!(response.error_code(), Some("PLAYER_NOT_FOUND"));
        assert_eq!(response.get("error_message"), Some(&json!("Player not found")));
        assert_eq!(response.balance(), None);
    }

    #[test]
    fn test_insufficient_funds_response() {
        let response = WebhookResponse::insufficient_funds(50.25);
        assert_eq!(
            response.into_value(),
            json!({
                "status": "error",
                "error_code": "INSUFFICIENT_FUNDS",
                "error_message": "Insufficient funds",
                "balance": 5025
            })
        );
    }

    #[test]
    fn test_already_processed_response() {
        let response = WebhookResponse::already_processed(7.5);
        assert!(response.is_success());
        assert_eq!(response.balance(), Some(750));
        assert_eq!(response.get("already_processed"), Some(&json!(true)));
    }

    #[test]
    fn test_balance_rounds_to_nearest_cent() {
        assert_eq!(WebhookResponse::success(0.29).balance(), Some(29));
        assert_eq!(WebhookResponse::insufficient_funds(0.29).balance(), Some(29));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let body = serde_json::to_string(&WebhookResponse::success(1.0)).unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value, json!({"balance": 100, "status": "success"}));
    }
}
