//! Webhook payload normalization
//!
//! Turns the sender's JSON body into a [`WebhookEvent`]. The upstream schema
//! has been renamed over time, so a few fields are looked up under an
//! ordered list of candidate keys; the first key holding a usable value wins.

use super::{money, types::EventType};
use crate::errors::WebhookError;
use serde::Serialize;
use serde_json::{Map, Value};

const KEY_TYPE: &str = "type";
const KEY_PLAYER_ID: &str = "player_id";
const KEY_CURRENCY: &str = "currency";
const KEY_TIMESTAMP: &str = "timestamp";
const KEY_GAME_ID: &str = "game_id";
const KEY_GAME_TYPE: &str = "game_type";
const KEY_TRANSACTION_ID: &str = "transaction_id";
const KEY_AMOUNT: &str = "amount";
const KEY_SESSION_ID: &str = "session_id";
const KEY_ROUND_ID: &str = "round_id";
const KEY_REWARD_TYPE: &str = "reward_type";
const KEY_REWARD_TITLE: &str = "reward_title";
const KEY_FREESPIN_TOTAL: &str = "freespin_total";
const KEY_FREESPIN_ROUND_NUMBER: &str = "freespin_round_number";
const KEY_FREESPIN_TOTAL_WINNINGS: &str = "freespin_total_winnings";

/// Current key first, legacy key second
const KEYS_IS_FREESPIN: &[&str] = &["is_freespin_round", "is_freespin"];
const KEYS_FREESPIN_ID: &[&str] = &["freespin_id", "bonus_id"];
const KEYS_FREESPINS_REMAINING: &[&str] = &["freespins_remaining", "freespin_left"];

/// A normalized inbound webhook.
///
/// Built fresh per request by [`WebhookEvent::parse`]. Absent optional
/// fields stay `None`; a present zero is `Some(0)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookEvent {
    pub event_type: EventType,
    pub player_id: String,
    pub currency: String,
    /// ISO-8601 as sent, not validated
    pub timestamp: String,

    // Game fields
    pub game_id: Option<i64>,
    pub game_type: Option<String>,

    // Transaction fields
    /// Upstream idempotency key for financial events
    pub transaction_id: Option<i64>,
    /// Always minor units (cents)
    pub amount_minor_units: Option<i64>,
    pub session_id: Option<String>,
    pub round_id: Option<String>,

    // Reward fields
    pub reward_type: Option<String>,
    pub reward_title: Option<String>,

    // Freespin fields
    pub is_freespin: bool,
    pub freespin_id: Option<String>,
    pub freespin_total: Option<i64>,
    pub freespins_remaining: Option<i64>,
    pub freespin_round_number: Option<i64>,
    pub freespin_total_winnings: Option<f64>,

    #[serde(skip)]
    raw_fields: Map<String, Value>,
}

impl WebhookEvent {
    /// Parse a raw webhook body.
    ///
    /// Fails with [`WebhookError::MalformedPayload`] when the bytes are not
    /// a JSON object. Missing or mistyped optional fields never fail the
    /// parse. Fractional numbers in integer fields are truncated toward zero.
    pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
        let raw: Map<String, Value> = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

        let event_type = text(&raw, KEY_TYPE)
            .map(EventType::from)
            .unwrap_or_else(|| EventType::Other(String::new()));

        Ok(Self {
            event_type,
            player_id: text(&raw, KEY_PLAYER_ID).unwrap_or_default(),
            currency: text(&raw, KEY_CURRENCY).unwrap_or_default(),
            timestamp: text(&raw, KEY_TIMESTAMP).unwrap_or_default(),
            game_id: integer(&raw, KEY_GAME_ID),
            game_type: text(&raw, KEY_GAME_TYPE),
            transaction_id: integer(&raw, KEY_TRANSACTION_ID),
            amount_minor_units: integer(&raw, KEY_AMOUNT),
            session_id: text(&raw, KEY_SESSION_ID),
            round_id: text(&raw, KEY_ROUND_ID),
            reward_type: text(&raw, KEY_REWARD_TYPE),
            reward_title: text(&raw, KEY_REWARD_TITLE),
            is_freespin: first_present(&raw, KEYS_IS_FREESPIN, Value::as_bool).unwrap_or(false),
            freespin_id: first_present(&raw, KEYS_FREESPIN_ID, as_text),
            freespin_total: integer(&raw, KEY_FREESPIN_TOTAL),
            freespins_remaining: first_present(&raw, KEYS_FREESPINS_REMAINING, as_integer),
            freespin_round_number: integer(&raw, KEY_FREESPIN_ROUND_NUMBER),
            freespin_total_winnings: first_present(&raw, &[KEY_FREESPIN_TOTAL_WINNINGS], Value::as_f64),
            raw_fields: raw,
        })
    }

    pub fn is_authenticate(&self) -> bool {
        self.event_type == EventType::Authenticate
    }

    pub fn is_balance_check(&self) -> bool {
        self.event_type == EventType::BalanceCheck
    }

    pub fn is_bet(&self) -> bool {
        self.event_type == EventType::Bet
    }

    pub fn is_win(&self) -> bool {
        self.event_type == EventType::Win
    }

    pub fn is_rollback(&self) -> bool {
        self.event_type == EventType::Rollback
    }

    pub fn is_reward(&self) -> bool {
        self.event_type == EventType::Reward
    }

    /// Amount in major units (dollars), `None` when the payload had no amount
    pub fn amount_in_major_units(&self) -> Option<f64> {
        self.amount_minor_units.map(money::minor_to_major)
    }

    /// Any field of the original payload, modeled or not
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw_fields.get(key)
    }

    /// The complete original key/value mapping
    pub fn raw_fields(&self) -> &Map<String, Value> {
        &self.raw_fields
    }
}

/// Try each key in order and return the first value `extract` accepts
fn first_present<T>(
    raw: &Map<String, Value>,
    keys: &[&str],
    extract: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    keys.iter().find_map(|key| raw.get(*key).and_then(&extract))
}

fn text(raw: &Map<String, Value>, key: &str) -> Option<String> {
    first_present(raw, &[key], as_text)
}

fn integer(raw: &Map<String, Value>, key: &str) -> Option<i64> {
    first_present(raw, &[key], as_integer)
}

/// Non-empty strings, plus numbers rendered in decimal (some senders emit
/// numeric ids)
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integers as-is; floats truncated toward zero (saturating)
fn as_integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}
