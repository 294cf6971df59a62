//! Event Dispatch
//!
//! Routes a verified [`WebhookEvent`] to the wallet by event type and builds
//! the reply the sender expects.

use crate::{
    wallet::{LedgerOutcome, TransactionKind, Wallet, WalletTransaction},
    webhooks::{money, EventType, WebhookEvent, WebhookResponse},
};
use serde_json::{Map, Value};
use tracing::{error, info, warn};

pub const CODE_INVALID_REQUEST: &str = "INVALID_REQUEST";
pub const CODE_INVALID_AMOUNT: &str = "INVALID_AMOUNT";
pub const CODE_INVALID_CURRENCY: &str = "INVALID_CURRENCY";
pub const CODE_DUPLICATE_TRANSACTION_CONFLICT: &str = "DUPLICATE_TRANSACTION_CONFLICT";
pub const CODE_UNKNOWN_EVENT_TYPE: &str = "UNKNOWN_EVENT_TYPE";
pub const CODE_INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Handle one event against `wallet`. Always yields a reply; failures are
/// expressed as error replies rather than Rust errors.
pub async fn dispatch<W>(wallet: &W, event: &WebhookEvent) -> WebhookResponse
where
    W: Wallet + ?Sized,
{
    if event.player_id.is_empty() {
        return WebhookResponse::error(CODE_INVALID_REQUEST, "Missing player_id");
    }
    if event.event_type.is_financial() && event.transaction_id.is_none() {
        return WebhookResponse::error(CODE_INVALID_REQUEST, "Missing transaction_id");
    }

    let account = match wallet.account(&event.player_id).await {
        Ok(Some(account)) => account,
        Ok(None) => return WebhookResponse::player_not_found(),
        Err(e) => {
            error!("Wallet lookup failed for {}: {}", event.player_id, e);
            return WebhookResponse::error(CODE_INTERNAL_ERROR, "Wallet unavailable");
        }
    };

    if !event.currency.is_empty() && event.currency != account.currency {
        warn!(
            "Currency mismatch for {}: event {} vs account {}",
            event.player_id, event.currency, account.currency
        );
        return WebhookResponse::error(CODE_INVALID_CURRENCY, "Currency does not match account");
    }

    let balance = money::minor_to_major(account.balance_minor);

    match &event.event_type {
        EventType::Authenticate | EventType::BalanceCheck => {
            let mut extra = Map::new();
            extra.insert("player_id".to_string(), Value::from(account.player_id.as_str()));
            extra.insert("currency".to_string(), Value::from(account.currency.as_str()));
            WebhookResponse::success_with(balance, extra)
        }
        EventType::Bet => apply(wallet, event, TransactionKind::Debit).await,
        EventType::Win | EventType::Reward => apply(wallet, event, TransactionKind::Credit).await,
        EventType::Rollback => rollback(wallet, event).await,
        EventType::Other(tag) => {
            warn!("Unknown webhook type '{}'", tag);
            WebhookResponse::error(CODE_UNKNOWN_EVENT_TYPE, "Unknown event type")
        }
    }
}

async fn apply<W>(wallet: &W, event: &WebhookEvent, kind: TransactionKind) -> WebhookResponse
where
    W: Wallet + ?Sized,
{
    let (Some(transaction_id), Some(amount_minor)) = (event.transaction_id, event.amount_minor_units) else {
        return WebhookResponse::error(CODE_INVALID_REQUEST, "Missing transaction_id or amount");
    };
    if amount_minor < 0 {
        return WebhookResponse::error(CODE_INVALID_AMOUNT, "Amount must not be negative");
    }

    let transaction = WalletTransaction {
        transaction_id,
        player_id: event.player_id.clone(),
        kind,
        amount_minor,
        round_id: event.round_id.clone(),
    };

    match wallet.apply(transaction).await {
        Ok(outcome) => {
            info!(
                "{} tx {} for {}: {:?}",
                event.event_type, transaction_id, event.player_id, outcome
            );
            reply_for(outcome)
        }
        Err(e) => {
            error!("Wallet apply failed for tx {}: {}", transaction_id, e);
            WebhookResponse::error(CODE_INTERNAL_ERROR, "Wallet unavailable")
        }
    }
}

async fn rollback<W>(wallet: &W, event: &WebhookEvent) -> WebhookResponse
where
    W: Wallet + ?Sized,
{
    let Some(transaction_id) = event.transaction_id else {
        return WebhookResponse::error(CODE_INVALID_REQUEST, "Missing transaction_id");
    };

    match wallet.rollback(&event.player_id, transaction_id).await {
        Ok(outcome) => {
            info!("rollback tx {} for {}: {:?}", transaction_id, event.player_id, outcome);
            reply_for(outcome)
        }
        Err(e) => {
            error!("Wallet rollback failed for tx {}: {}", transaction_id, e);
            WebhookResponse::error(CODE_INTERNAL_ERROR, "Wallet unavailable")
        }
    }
}

fn reply_for(outcome: LedgerOutcome) -> WebhookResponse {
    match outcome {
        LedgerOutcome::Applied { balance_minor } => {
            WebhookResponse::success(money::minor_to_major(balance_minor))
        }
        LedgerOutcome::AlreadyProcessed { balance_minor } => {
            WebhookResponse::already_processed(money::minor_to_major(balance_minor))
        }
        LedgerOutcome::InsufficientFunds { balance_minor } => {
            WebhookResponse::insufficient_funds(money::minor_to_major(balance_minor))
        }
        LedgerOutcome::PlayerNotFound => WebhookResponse::player_not_found(),
        LedgerOutcome::Conflict => WebhookResponse::error(
            CODE_DUPLICATE_TRANSACTION_CONFLICT,
            "Transaction id already used with different details",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::WalletError, wallet::{Account, InMemoryWallet}};
    use async_trait::async_trait;
    use serde_json::json;

    fn wallet() -> InMemoryWallet {
        let wallet = InMemoryWallet::new();
        wallet.open_account("player_456", "USD", 5_000);
        wallet
    }

    fn event(json: Value) -> WebhookEvent {
        WebhookEvent::parse(json.to_string().as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_authenticate() {
        let reply = dispatch(&wallet(), &event(json!({"type": "authenticate", "player_id": "player_456"}))).await;
        assert_eq!(
            reply.into_value(),
            json!({"status": "success", "balance": 5000, "player_id": "player_456", "currency": "USD"})
        );
    }

    #[tokio::test]
    async fn test_balance_check_unknown_player() {
        let reply = dispatch(&wallet(), &event(json!({"type": "balance_check", "player_id": "nobody"}))).await;
        assert_eq!(reply.error_code(), Some("PLAYER_NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_bet_then_duplicate() {
        let wallet = wallet();
        let bet = event(json!({
            "type": "bet", "player_id": "player_456", "currency": "USD",
            "amount": 1000, "transaction_id": 12345
        }));

        let reply = dispatch(&wallet, &bet).await;
        assert!(reply.is_success());
        assert_eq!(reply.balance(), Some(4000));
        assert_eq!(reply.get("already_processed"), None);

        let reply = dispatch(&wallet, &bet).await;
        assert_eq!(reply.balance(), Some(4000));
        assert_eq!(reply.get("already_processed"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_bet_insufficient_funds() {
        let reply = dispatch(
            &wallet(),
            &event(json!({"type": "bet", "player_id": "player_456", "amount": 9000, "transaction_id": 1})),
        )
        .await;
        assert_eq!(reply.error_code(), Some("INSUFFICIENT_FUNDS"));
        assert_eq!(reply.balance(), Some(5000));
    }

    #[tokio::test]
    async fn test_zero_amount_bet_is_valid() {
        let reply = dispatch(
            &wallet(),
            &event(json!({"type": "bet", "player_id": "player_456", "amount": 0, "transaction_id": 2, "is_freespin_round": true})),
        )
        .await;
        assert!(reply.is_success());
        assert_eq!(reply.balance(), Some(5000));
    }

    #[tokio::test]
    async fn test_bet_missing_fields() {
        let wallet = wallet();
        let reply = dispatch(&wallet, &event(json!({"type": "bet", "player_id": "player_456", "amount": 100}))).await;
        assert_eq!(reply.error_code(), Some(CODE_INVALID_REQUEST));

        let reply = dispatch(&wallet, &event(json!({"type": "win", "player_id": "player_456", "transaction_id": 3}))).await;
        assert_eq!(reply.error_code(), Some(CODE_INVALID_REQUEST));
    }

    #[tokio::test]
    async fn test_negative_amount_rejected() {
        let reply = dispatch(
            &wallet(),
            &event(json!({"type": "win", "player_id": "player_456", "amount": -100, "transaction_id": 4})),
        )
        .await;
        assert_eq!(reply.error_code(), Some(CODE_INVALID_AMOUNT));
    }

    #[tokio::test]
    async fn test_currency_mismatch() {
        let reply = dispatch(
            &wallet(),
            &event(json!({"type": "bet", "player_id": "player_456", "currency": "EUR", "amount": 100, "transaction_id": 5})),
        )
        .await;
        assert_eq!(reply.error_code(), Some(CODE_INVALID_CURRENCY));
    }

    #[tokio::test]
    async fn test_win_and_reward_credit() {
        let wallet = wallet();
        let reply = dispatch(&wallet, &event(json!({"type": "win", "player_id": "player_456", "amount": 250, "transaction_id": 6}))).await;
        assert_eq!(reply.balance(), Some(5250));

        let reply = dispatch(
            &wallet,
            &event(json!({"type": "reward", "player_id": "player_456", "amount": 750, "transaction_id": 7, "reward_type": "cashback"})),
        )
        .await;
        assert_eq!(reply.balance(), Some(6000));
    }

    #[tokio::test]
    async fn test_rollback_flow() {
        let wallet = wallet();
        dispatch(&wallet, &event(json!({"type": "bet", "player_id": "player_456", "amount": 1500, "transaction_id": 8}))).await;

        let rollback = event(json!({"type": "rollback", "player_id": "player_456", "transaction_id": 8}));
        let reply = dispatch(&wallet, &rollback).await;
        assert_eq!(reply.balance(), Some(5000));
        assert_eq!(reply.get("already_processed"), None);

        let reply = dispatch(&wallet, &rollback).await;
        assert_eq!(reply.get("already_processed"), Some(&json!(true)));

    }

    #[tokio::test]
    async fn test_rollback_arriving_before_bet() {
        let wallet = wallet();
        let reply = dispatch(&wallet, &event(json!({"type": "rollback", "player_id": "player_456", "transaction_id": 50}))).await;
        assert!(reply.is_success());
        assert_eq!(reply.balance(), Some(5000));

        let reply = dispatch(
            &wallet,
            &event(json!({"type": "bet", "player_id": "player_456", "amount": 1000, "transaction_id": 50})),
        )
        .await;
        assert_eq!(reply.balance(), Some(5000));
        assert_eq!(reply.get("already_processed"), Some(&json!(true)));
        assert_eq!(wallet.account("player_456").await.unwrap().unwrap().balance_minor, 5_000);
    }

    #[tokio::test]
    async fn test_transaction_id_reused_by_another_player() {
        let wallet = wallet();
        wallet.open_account("player_789", "USD", 0);
        dispatch(&wallet, &event(json!({"type": "bet", "player_id": "player_456", "amount": 1000, "transaction_id": 60}))).await;

        let reply = dispatch(
            &wallet,
            &event(json!({"type": "win", "player_id": "player_789", "amount": 700, "transaction_id": 60})),
        )
        .await;
        assert_eq!(reply.error_code(), Some(CODE_DUPLICATE_TRANSACTION_CONFLICT));
        assert_eq!(wallet.account("player_789").await.unwrap().unwrap().balance_minor, 0);

        let reply = dispatch(&wallet, &event(json!({"type": "rollback", "player_id": "player_789", "transaction_id": 60}))).await;
        assert_eq!(reply.error_code(), Some(CODE_DUPLICATE_TRANSACTION_CONFLICT));
        assert_eq!(wallet.account("player_456").await.unwrap().unwrap().balance_minor, 4_000);
    }

    #[tokio::test]
    async fn test_financial_event_without_transaction_id() {
        for tag in ["bet", "win", "reward", "rollback"] {
            let reply = dispatch(&FailingWallet, &event(json!({"type": tag, "player_id": "p", "amount": 100}))).await;
            assert_eq!(reply.error_code(), Some(CODE_INVALID_REQUEST), "{}", tag);
        }
    }

    #[tokio::test]
    async fn test_unknown_type_and_missing_player() {
        let wallet = wallet();
        let reply = dispatch(&wallet, &event(json!({"type": "jackpot", "player_id": "player_456"}))).await;
        assert_eq!(reply.error_code(), Some(CODE_UNKNOWN_EVENT_TYPE));

        let reply = dispatch(&wallet, &event(json!({"type": "bet"}))).await;
        assert_eq!(reply.error_code(), Some(CODE_INVALID_REQUEST));
    }

    struct FailingWallet;

    #[async_trait]
    impl Wallet for FailingWallet {
        async fn account(&self, _player_id: &str) -> Result<Option<Account>, WalletError> {
            Err(WalletError::Backend("connection refused".to_string()))
        }

        async fn apply(&self, _transaction: WalletTransaction) -> Result<LedgerOutcome, WalletError> {
            Err(WalletError::Backend("connection refused".to_string()))
        }

        async fn rollback(&self, _player_id: &str, _transaction_id: i64) -> Result<LedgerOutcome, WalletError> {
            Err(WalletError::Backend("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_error_reply() {
        let reply = dispatch(&FailingWallet, &event(json!({"type": "balance_check", "player_id": "p"}))).await;
        assert_eq!(reply.error_code(), Some(CODE_INTERNAL_ERROR));
    }
}
