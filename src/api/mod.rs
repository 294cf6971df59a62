//! Webhook Receiver API
//!
//! HTTP surface for the upstream platform: accepts signed callbacks, runs
//! them through the webhook core and the wallet dispatcher, and replies.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use server::ApiServer;
