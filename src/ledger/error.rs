//! Error types for coin ledger operations.

use thiserror::Error;

use crate::Amount;
use crate::model::{Count, Denomination};

/// Error returned by [`Ledger`](super::Ledger) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("not enough {denomination} coins: held {held}, requested {requested}")]
    InsufficientCoins {
        denomination: Denomination,
        held: Count,
        requested: Count,
    },

    /// Greedy change making left `remaining` uncovered.
    #[error("cannot make change for {amount}: {remaining} left uncovered")]
    ChangeUnavailable { amount: Amount, remaining: Amount },
}
