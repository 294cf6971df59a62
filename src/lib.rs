//! Gamehub Webhooks - signed callback handling for game-aggregator wallets
//!
//! The aggregator reports player activity (authentication, balance checks,
//! bets, wins, rollbacks, rewards) by POSTing signed JSON to the operator.
//! This crate authenticates those callbacks, normalizes them into typed
//! events, applies them idempotently to a wallet and builds the replies the
//! aggregator expects.
//!
//! ```
//! use gamehub_webhooks::webhooks::{WebhookHandler, WebhookResponse};
//!
//! let handler = WebhookHandler::new("shared-secret").unwrap();
//! let body = br#"{"type":"bet","player_id":"p1","amount":1000,"transaction_id":7}"#;
//! let signature = handler.sign(body);
//!
//! let event = handler.verify_and_parse(body, &signature).unwrap();
//! assert!(event.is_bet());
//! assert_eq!(event.amount_in_major_units(), Some(10.0));
//!
//! let reply = WebhookResponse::success(90.0);
//! assert_eq!(reply.balance(), Some(9000));
//! ```

pub mod api;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod wallet;
pub mod webhooks;

pub use errors::{GamehubError, GamehubResult, WebhookError};
pub use webhooks::{EventType, WebhookEvent, WebhookHandler, WebhookResponse};
