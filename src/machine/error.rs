//! Error types for machine operations.

use thiserror::Error;

use crate::Amount;
use crate::ledger::LedgerError;
use crate::model::ProductId;

/// Reason a purchase was refused. A refused purchase changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("product {0} out of stock")]
    OutOfStock(ProductId),

    #[error("insufficient funds, need {price}")]
    InsufficientFunds { price: Amount, balance: Amount },

    #[error("cannot dispense change of {0}")]
    CannotDispenseChange(Amount),

    #[error("bank rejected change plan: {0}")]
    Ledger(#[from] LedgerError),
}

/// Error during catalog maintenance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("quantity must be positive")]
    ZeroQuantity,

    #[error("price must be positive")]
    ZeroPrice,

    #[error("product name is empty")]
    EmptyName,
}
