//! Command session driving a [`Machine`].
//!
//! The session is the outer collaborator of the machine: it turns commands
//! into machine calls, gates admin commands behind an [`Authorizer`] and
//! reports what physically leaves the machine. Also supports async stream
//! of commands.

use thiserror::Error;
use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::Amount;
use crate::auth::Authorizer;
use crate::machine::{CatalogError, Machine, PurchaseError};
use crate::model::{Coins, Count, Denomination, Product, ProductId};

/// A request made at the machine's front panel or by an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Put coins in the tray.
    Insert {
        denomination: Denomination,
        count: Count,
    },
    /// Buy one unit with the tray's coins.
    Purchase { product: ProductId },
    /// Return the tray's coins.
    Cancel,
    /// List the catalog.
    List,
    AddProduct {
        pin: String,
        name: String,
        price: Amount,
        quantity: Count,
    },
    Restock {
        pin: String,
        product: ProductId,
        amount: Count,
    },
    Reprice {
        pin: String,
        product: ProductId,
        price: Amount,
    },
    BankReport { pin: String },
    CollectCash { pin: String },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Insert { .. } => "insert",
            Command::Purchase { .. } => "purchase",
            Command::Cancel => "cancel",
            Command::List => "list",
            Command::AddProduct { .. } => "add",
            Command::Restock { .. } => "restock",
            Command::Reprice { .. } => "reprice",
            Command::BankReport { .. } => "report",
            Command::CollectCash { .. } => "collect",
        }
    }

    fn pin(&self) -> Option<&str> {
        match self {
            Command::AddProduct { pin, .. }
            | Command::Restock { pin, .. }
            | Command::Reprice { pin, .. }
            | Command::BankReport { pin }
            | Command::CollectCash { pin } => Some(pin.as_str()),
            _ => None,
        }
    }
}

/// Observable result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// A product was dispensed along with `change`.
    Vended {
        product: ProductId,
        name: String,
        remaining: Count,
        change: Coins,
    },
    /// Tray coins handed back on cancel.
    Refunded { coins: Coins },
    Products(Vec<Product>),
    /// A product was added to the catalog.
    Added { product: ProductId, name: String },
    Bank { holdings: Coins, total: Amount },
    Collected { total: Amount },
    /// A command was refused; nothing changed.
    Rejected { command: &'static str, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("{0}: not authorized")]
    Unauthorized(&'static str),

    #[error("purchase failed: {0}")]
    Purchase(#[from] PurchaseError),

    #[error("{0}")]
    Catalog(#[from] CatalogError),
}

pub struct Session<A> {
    machine: Machine,
    authorizer: A,
}

/// Public API
impl<A: Authorizer> Session<A> {
    pub fn new(machine: Machine, authorizer: A) -> Self {
        Self {
            machine,
            authorizer,
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Run the session over the given command stream.
    ///
    /// Failed commands do not stop the session; they show up as
    /// [`Output::Rejected`].
    pub async fn run(&mut self, mut stream: impl Stream<Item = Command> + Unpin) -> Vec<Output> {
        let mut outputs = Vec::new();
        while let Some(command) = stream.next().await {
            let name = command.name();
            match self.apply(command) {
                Ok(Some(output)) => outputs.push(output),
                Ok(None) => {}
                Err(e) => outputs.push(Output::Rejected {
                    command: name,
                    reason: e.to_string(),
                }),
            }
        }
        outputs
    }

    /// Apply a single command to the machine.
    pub fn apply(&mut self, command: Command) -> Result<Option<Output>, SessionError> {
        let name = command.name();
        let result = self.authorize(&command).and_then(|()| self.dispatch(command));
        match &result {
            Ok(_) => info!(command = name, "{name} applied"),
            Err(e) => info!(command = name, reason = %e, "{name} skipped"),
        }
        result
    }
}

/// Private API
impl<A: Authorizer> Session<A> {
    fn authorize(&self, command: &Command) -> Result<(), SessionError> {
        match command.pin() {
            Some(pin) if !self.authorizer.authorize(pin) => {
                Err(SessionError::Unauthorized(command.name()))
            }
            _ => Ok(()),
        }
    }

    fn dispatch(&mut self, command: Command) -> Result<Option<Output>, SessionError> {
        let machine = &mut self.machine;
        let output = match command {
            Command::Insert {
                denomination,
                count,
            } => {
                machine.insert_coin(denomination, count);
                None
            }
            Command::Purchase { product } => {
                let sale = machine.purchase(product)?;
                let remaining = machine.product(product).map_or(0, |p| p.quantity);
                Some(Output::Vended {
                    product: sale.product,
                    name: sale.name,
                    remaining,
                    change: sale.change,
                })
            }
            Command::Cancel => {
                let coins = machine.cancel();
                (!coins.is_empty()).then_some(Output::Refunded { coins })
            }
            Command::List => Some(Output::Products(machine.products().cloned().collect())),
            Command::AddProduct {
                name,
                price,
                quantity,
                ..
            } => {
                let product = machine.add_product(name.clone(), price, quantity)?;
                Some(Output::Added { product, name })
            }
            Command::Restock {
                product, amount, ..
            } => {
                machine.restock(product, amount)?;
                None
            }
            Command::Reprice { product, price, .. } => {
                machine.reprice(product, price)?;
                None
            }
            Command::BankReport { .. } => {
                let report = machine.bank_report();
                Some(Output::Bank {
                    holdings: report.holdings,
                    total: report.total,
                })
            }
            Command::CollectCash { .. } => Some(Output::Collected {
                total: machine.collect_cash(),
            }),
        };
        Ok(output)
    }
}
