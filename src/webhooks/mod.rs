//! Webhook Core
//!
//! Authenticates inbound aggregator callbacks and normalizes them into typed
//! events. Everything in here is synchronous and free of I/O; the hosting
//! HTTP layer owns transport, status codes and logging.

pub mod handler;
pub mod money;
pub mod payload;
pub mod responses;
pub mod signature;
pub mod types;

pub use handler::WebhookHandler;
pub use payload::WebhookEvent;
pub use responses::WebhookResponse;
pub use types::EventType;
