//! Wallet Module
//!
//! The receiving system's side of a webhook: player accounts and an
//! idempotent ledger keyed by the upstream transaction id. Amounts are
//! integer minor units throughout.

use crate::errors::WalletError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Direction of a balance mutation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Debit,
    Credit,
}

/// A player account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub player_id: String,
    pub currency: String,
    pub balance_minor: i64,
}

/// A balance mutation requested by a webhook
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletTransaction {
    pub transaction_id: i64,
    pub player_id: String,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_id: Option<String>,
}

/// Ledger record of a transaction id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub player_id: String,
    /// `None` marks a tombstone: a rollback that arrived before its
    /// transaction. The id can then never be applied.
    pub transaction: Option<WalletTransaction>,
    pub recorded_at: DateTime<Utc>,
    pub rolled_back: bool,
}

impl LedgerEntry {
    /// Whether `incoming` is a redelivery of what this entry recorded
    fn is_redelivery_of(&self, incoming: &WalletTransaction) -> bool {
        match &self.transaction {
            Some(stored) => {
                stored.player_id == incoming.player_id
                    && stored.kind == incoming.kind
                    && stored.amount_minor == incoming.amount_minor
            }
            None => self.player_id == incoming.player_id,
        }
    }
}

/// Result of a wallet operation. Balances are after the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOutcome {
    Applied { balance_minor: i64 },
    AlreadyProcessed { balance_minor: i64 },
    InsufficientFunds { balance_minor: i64 },
    PlayerNotFound,
    /// Transaction id already recorded with a different player, kind or amount
    Conflict,
}

/// Storage interface for player balances
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Look up an account
    async fn account(&self, player_id: &str) -> Result<Option<Account>, WalletError>;

    /// Apply a debit or credit exactly once per transaction id
    async fn apply(&self, transaction: WalletTransaction) -> Result<LedgerOutcome, WalletError>;

    /// Reverse a previously applied transaction exactly once
    async fn rollback(&self, player_id: &str, transaction_id: i64) -> Result<LedgerOutcome, WalletError>;
}

/// Process-local wallet backed by concurrent maps.
///
/// Lock order is always ledger then accounts.
#[derive(Debug, Default)]
pub struct InMemoryWallet {
    accounts: DashMap<String, Account>,
    ledger: DashMap<i64, LedgerEntry>,
}

impl InMemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace an account
    pub fn open_account(&self, player_id: &str, currency: &str, balance_minor: i64) {
        self.accounts.insert(
            player_id.to_string(),
            Account {
                player_id: player_id.to_string(),
                currency: currency.to_string(),
                balance_minor,
            },
        );
    }

    pub fn ledger_entry(&self, transaction_id: i64) -> Option<LedgerEntry> {
        self.ledger.get(&transaction_id).map(|entry| entry.clone())
    }

    pub fn ledger_len(&self) -> usize {
        self.ledger.len()
    }

    fn balance_of(&self, player_id: &str) -> Option<i64> {
        self.accounts.get(player_id).map(|account| account.balance_minor)
    }
}

#[async_trait]
impl Wallet for InMemoryWallet {
    async fn account(&self, player_id: &str) -> Result<Option<Account>, WalletError> {
        Ok(self.accounts.get(player_id).map(|account| account.clone()))
    }

    async fn apply(&self, transaction: WalletTransaction) -> Result<LedgerOutcome, WalletError> {
        let slot = match self.ledger.entry(transaction.transaction_id) {
            Entry::Occupied(existing) => {
                if !existing.get().is_redelivery_of(&transaction) {
                    warn!(
                        "Transaction {} reused by {} with different details",
                        transaction.transaction_id, transaction.player_id
                    );
                    return Ok(LedgerOutcome::Conflict);
                }
                debug!("Duplicate transaction {}", transaction.transaction_id);
                return Ok(match self.balance_of(&transaction.player_id) {
                    Some(balance_minor) => LedgerOutcome::AlreadyProcessed { balance_minor },
                    None => LedgerOutcome::PlayerNotFound,
                });
            }
            Entry::Vacant(slot) => slot,
        };

        let Some(mut account) = self.accounts.get_mut(&transaction.player_id) else {
            return Ok(LedgerOutcome::PlayerNotFound);
        };

        let new_balance = match transaction.kind {
            TransactionKind::Debit => {
                if account.balance_minor < transaction.amount_minor {
                    return Ok(LedgerOutcome::InsufficientFunds {
                        balance_minor: account.balance_minor,
                    });
                }
                account.balance_minor - transaction.amount_minor
            }
            TransactionKind::Credit => account
                .balance_minor
                .checked_add(transaction.amount_minor)
                .ok_or_else(|| WalletError::Backend("balance overflow".to_string()))?,
        };
        account.balance_minor = new_balance;

        debug!(
            "Applied {:?} {} for {} (tx {})",
            transaction.kind, transaction.amount_minor, transaction.player_id, transaction.transaction_id
        );
        slot.insert(LedgerEntry {
            player_id: transaction.player_id.clone(),
            transaction: Some(transaction),
            recorded_at: Utc::now(),
            rolled_back: false,
        });

        Ok(LedgerOutcome::Applied {
            balance_minor: new_balance,
        })
    }

    async fn rollback(&self, player_id: &str, transaction_id: i64) -> Result<LedgerOutcome, WalletError> {
        let mut entry = match self.ledger.entry(transaction_id) {
            Entry::Occupied(entry) => entry,
            Entry::Vacant(slot) => {
                let Some(balance_minor) = self.balance_of(player_id) else {
                    return Ok(LedgerOutcome::PlayerNotFound);
                };
                warn!(
                    "Rollback of unseen tx {} for {}, recording tombstone",
                    transaction_id, player_id
                );
                slot.insert(LedgerEntry {
                    player_id: player_id.to_string(),
                    transaction: None,
                    recorded_at: Utc::now(),
                    rolled_back: true,
                });
                return Ok(LedgerOutcome::Applied { balance_minor });
            }
        };
        let record = entry.get_mut();
        if record.player_id != player_id {
            warn!(
                "Rollback of tx {} by {} but it belongs to {}",
                transaction_id, player_id, record.player_id
            );
            return Ok(LedgerOutcome::Conflict);
        }

        let Some(mut account) = self.accounts.get_mut(player_id) else {
            return Ok(LedgerOutcome::PlayerNotFound);
        };

        let (kind, amount) = match &record.transaction {
            Some(original) if !record.rolled_back => (original.kind, original.amount_minor),
            _ => {
                return Ok(LedgerOutcome::AlreadyProcessed {
                    balance_minor: account.balance_minor,
                });
            }
        };

        let new_balance = match kind {
            TransactionKind::Debit => account
                .balance_minor
                .checked_add(amount)
                .ok_or_else(|| WalletError::Backend("balance overflow".to_string()))?,
            TransactionKind::Credit => {
                if account.balance_minor < amount {
                    return Ok(LedgerOutcome::InsufficientFunds {
                        balance_minor: account.balance_minor,
                    });
                }
                account.balance_minor - amount
            }
        };
        account.balance_minor = new_balance;
        record.rolled_back = true;

        debug!("Rolled back tx {} for {}", transaction_id, player_id);
        Ok(LedgerOutcome::Applied {
            balance_minor: new_balance,
        })
    }
}
