pub mod amount;
pub mod auth;
pub mod config;
pub mod csv;
pub mod ledger;
pub mod machine;
pub mod model;
pub mod session;

pub use amount::Amount;
pub use auth::{Authorizer, PinAuthorizer};
pub use config::MachineConfig;
pub use ledger::{Ledger, LedgerError};
pub use machine::{Machine, PurchaseError, Sale};
pub use model::{Coins, Count, Denomination, Product, ProductId};
pub use session::{Command, Output, Session};
