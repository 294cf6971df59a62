use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire tag of an authentication request
pub const TYPE_AUTHENTICATE: &str = "authenticate";
/// Wire tag of a balance check
pub const TYPE_BALANCE_CHECK: &str = "balance_check";
/// Wire tag of a bet (debit)
pub const TYPE_BET: &str = "bet";
/// Wire tag of a win (credit)
pub const TYPE_WIN: &str = "win";
/// Wire tag of a rollback
pub const TYPE_ROLLBACK: &str = "rollback";
/// Wire tag of a promotional reward (credit)
pub const TYPE_REWARD: &str = "reward";

/// Webhook event type
///
/// Open set: tags the normalizer does not know are kept verbatim in
/// [`EventType::Other`] instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Authenticate,
    BalanceCheck,
    Bet,
    Win,
    Rollback,
    Reward,
    Other(String),
}

impl EventType {
    /// The tag exactly as it appears on the wire
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Authenticate => TYPE_AUTHENTICATE,
            EventType::BalanceCheck => TYPE_BALANCE_CHECK,
            EventType::Bet => TYPE_BET,
            EventType::Win => TYPE_WIN,
            EventType::Rollback => TYPE_ROLLBACK,
            EventType::Reward => TYPE_REWARD,
            EventType::Other(tag) => tag,
        }
    }

    /// Whether the event moves money
    pub fn is_financial(&self) -> bool {
        matches!(
            self,
            EventType::Bet | EventType::Win | EventType::Rollback | EventType::Reward
        )
    }
}

impl From<&str> for EventType {
    fn from(tag: &str) -> Self {
        match tag {
            TYPE_AUTHENTICATE => EventType::Authenticate,
            TYPE_BALANCE_CHECK => EventType::BalanceCheck,
            TYPE_BET => EventType::Bet,
            TYPE_WIN => EventType::Win,
            TYPE_ROLLBACK => EventType::Rollback,
            TYPE_REWARD => EventType::Reward,
            other => EventType::Other(other.to_string()),
        }
    }
}

impl From<String> for EventType {
    fn from(tag: String) -> Self {
        EventType::from(tag.as_str())
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        event_type.as_str().to_string()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
