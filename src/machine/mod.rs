//! Vending machine transaction coordinator.
//!
//! The machine owns the product catalog, the bank (coins the machine owns)
//! and the tray (coins inserted by the customer but not yet committed).
//! A purchase either completes fully or leaves all three untouched.

use tracing::{info, warn};

use crate::Amount;
use crate::config::MachineConfig;
use crate::ledger::Ledger;
use crate::model::{Coins, Count, Denomination, Product, ProductId};

mod catalog;
pub use catalog::Catalog;

mod error;
pub use error::{CatalogError, PurchaseError};

/// A completed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    pub product: ProductId,
    pub name: String,
    pub price: Amount,
    /// Coins to hand back to the customer, zero entries pruned.
    pub change: Coins,
}

/// Bank holdings at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankReport {
    /// Every configured denomination, zero counts included.
    pub holdings: Coins,
    pub total: Amount,
}

pub struct Machine {
    catalog: Catalog,
    bank: Ledger,
    tray: Ledger,
}

/// Public API
impl Machine {
    /// Create a machine with an empty catalog.
    pub fn new(denominations: &[Denomination], bank_seed: &Coins) -> Self {
        Self {
            catalog: Catalog::new(),
            bank: Ledger::with_holdings(denominations.iter().copied(), bank_seed),
            tray: Ledger::new(denominations.iter().copied()),
        }
    }

    /// Create a machine with the configured bank seed and products.
    pub fn from_config(config: &MachineConfig) -> Result<Self, CatalogError> {
        let mut machine = Self::new(&config.denominations, &config.bank_seed);
        for seed in &config.products {
            machine.add_product(seed.name.clone(), seed.price, seed.quantity)?;
        }
        Ok(machine)
    }

    /// Products in insertion order.
    pub fn products(&self) -> impl Iterator<Item = &Product> + '_ {
        self.catalog.iter()
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.catalog.get(id)
    }

    pub fn bank(&self) -> &Ledger {
        &self.bank
    }

    pub fn tray(&self) -> &Ledger {
        &self.tray
    }

    /// Put coins in the tray. Unknown denominations and zero counts are ignored.
    pub fn insert_coin(&mut self, denomination: Denomination, count: Count) {
        if count == 0 {
            return;
        }
        self.tray.add(denomination, count);
    }

    /// Value of the coins currently in the tray.
    pub fn balance(&self) -> Amount {
        self.tray.total()
    }

    /// Empty the tray and return its nonzero contents.
    pub fn cancel(&mut self) -> Coins {
        let returned = self.tray.snapshot().without_zeros();
        self.tray.clear();
        returned
    }

    /// Buy one unit of `id` with the coins in the tray.
    ///
    /// Change is planned against the bank before the tray is deposited. On
    /// any error the tray, bank and catalog are left as they were.
    pub fn purchase(&mut self, id: ProductId) -> Result<Sale, PurchaseError> {
        let product = self
            .catalog
            .get(id)
            .ok_or(PurchaseError::ProductNotFound(id))?;

        if !product.in_stock() {
            return Err(PurchaseError::OutOfStock(id));
        }

        let balance = self.balance();
        let price = product.price;
        let change_amount = balance
            .checked_sub(price)
            .ok_or(PurchaseError::InsufficientFunds { price, balance })?;

        let change = if change_amount.is_zero() {
            Coins::new()
        } else {
            self.bank.make_change(change_amount).map_err(|e| {
                warn!(
                    product = %id,
                    change = %change_amount,
                    reason = %e,
                    "bank cannot cover change"
                );
                PurchaseError::CannotDispenseChange(change_amount)
            })?
        };

        // Commit. The plan came from the current bank, so the withdrawal
        // cannot fail; it runs first so nothing is touched if it ever does.
        self.bank.withdraw(&change)?;
        let inserted = self.tray.snapshot();
        self.bank.deposit(&inserted);
        self.tray.clear();

        let product = self
            .catalog
            .get_mut(id)
            .ok_or(PurchaseError::ProductNotFound(id))?;
        product.quantity -= 1;

        info!(
            product = %id,
            price = %price,
            paid = %balance,
            change = %change,
            "sale committed"
        );

        Ok(Sale {
            product: id,
            name: product.name.clone(),
            price,
            change,
        })
    }

    pub fn add_product(
        &mut self,
        name: impl Into<String>,
        price: Amount,
        quantity: Count,
    ) -> Result<ProductId, CatalogError> {
        self.catalog.add(name, price, quantity)
    }

    pub fn restock(&mut self, id: ProductId, amount: Count) -> Result<(), CatalogError> {
        self.catalog.restock(id, amount)
    }

    pub fn reprice(&mut self, id: ProductId, price: Amount) -> Result<(), CatalogError> {
        self.catalog.reprice(id, price)
    }

    pub fn bank_report(&self) -> BankReport {
        BankReport {
            holdings: self.bank.snapshot(),
            total: self.bank.total(),
        }
    }

    /// Empty the bank and return the value collected.
    pub fn collect_cash(&mut self) -> Amount {
        let total = self.bank.total();
        self.bank.clear();
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DENOMINATIONS: [Denomination; 6] = [100, 50, 10, 5, 2, 1];

    // test utils

    fn machine(bank: &[(Denomination, Count)]) -> Machine {
        let seed: Coins = bank.iter().copied().collect();
        let mut machine = Machine::new(&DENOMINATIONS, &seed);
        machine.add_product("Cola", Amount::new(15), 3).unwrap();
        machine
    }

    /// Tray, bank and stock of product 1.
    fn state(machine: &Machine) -> (Coins, Coins, Count) {
        (
            machine.tray().snapshot(),
            machine.bank().snapshot(),
            machine.product(1).map_or(0, |p| p.quantity),
        )
    }

    // Tray

    #[test]
    fn insert_coin_accumulates_balance() {
        let mut machine = machine(&[]);
        machine.insert_coin(10, 2);
        machine.insert_coin(5, 1);
        assert_eq!(machine.balance(), Amount::new(25));
        assert_eq!(machine.bank().total(), Amount::ZERO);
    }

    #[test]
    fn insert_coin_ignores_unknown_denomination_and_zero_count() {
        let mut machine = machine(&[]);
        machine.insert_coin(20, 1);
        machine.insert_coin(10, 0);
        assert_eq!(machine.balance(), Amount::ZERO);
        assert!(machine.tray().snapshot().is_empty());
    }

    #[test]
    fn cancel_returns_inserted_coins_once() {
        let mut machine = machine(&[(10, 5)]);
        machine.insert_coin(10, 2);
        machine.insert_coin(1, 3);

        assert_eq!(machine.cancel(), Coins::from([(10, 2), (1, 3)]));
        assert_eq!(machine.balance(), Amount::ZERO);
        assert_eq!(machine.cancel(), Coins::new());
        assert_eq!(machine.bank().total(), Amount::new(50));
    }

    #[test]
    fn cancel_on_empty_tray_changes_nothing() {
        let mut machine = machine(&[(5, 1)]);
        let before = state(&machine);
        assert_eq!(machine.cancel(), Coins::new());
        assert_eq!(state(&machine), before);
    }

    // Purchase

    #[test]
    fn purchase_commits_change_and_deposit() {
        let mut machine = machine(&[(10, 5), (5, 5)]);
        machine.insert_coin(10, 2);

        let sale = machine.purchase(1).unwrap();
        assert_eq!(sale.change, Coins::from([(5, 1)]));
        assert_eq!(sale.name, "Cola");
        assert_eq!(
            machine.bank().snapshot(),
            Coins::from([(100, 0), (50, 0), (10, 7), (5, 4), (2, 0), (1, 0)])
        );
        assert!(machine.tray().snapshot().is_empty());
        assert_eq!(machine.product(1).unwrap().quantity, 2);
    }

    #[test]
    fn purchase_exact_amount_needs_no_change() {
        let mut machine = machine(&[]);
        machine.insert_coin(10, 1);
        machine.insert_coin(5, 1);

        let sale = machine.purchase(1).unwrap();
        assert_eq!(sale.change, Coins::new());
        assert_eq!(machine.bank().total(), Amount::new(15));
    }

    #[test]
    fn purchase_cannot_use_tray_coins_for_change() {
        // Tray holds a 5 and a 10, but the 5 is not in the bank yet.
        let mut machine = machine(&[]);
        machine.insert_coin(10, 1);
        machine.insert_coin(5, 1);
        machine.insert_coin(5, 1);
        let before = state(&machine);

        assert_eq!(
            machine.purchase(1),
            Err(PurchaseError::CannotDispenseChange(Amount::new(5)))
        );
        assert_eq!(state(&machine), before);
    }

    #[test]
    fn purchase_unknown_product_changes_nothing() {
        let mut machine = machine(&[(10, 5)]);
        machine.insert_coin(50, 1);
        let before = state(&machine);

        assert_eq!(machine.purchase(9), Err(PurchaseError::ProductNotFound(9)));
        assert_eq!(state(&machine), before);
    }

    #[test]
    fn purchase_out_of_stock_changes_nothing() {
        let mut machine = machine(&[(10, 5)]);
        let id = machine.add_product("Chips", Amount::new(25), 0).unwrap();
        machine.insert_coin(50, 1);
        let before = state(&machine);

        assert_eq!(machine.purchase(id), Err(PurchaseError::OutOfStock(id)));
        assert_eq!(state(&machine), before);
    }

    #[test]
    fn purchase_insufficient_funds_changes_nothing() {
        let mut machine = machine(&[(10, 5)]);
        machine.insert_coin(10, 1);
        let before = state(&machine);

        let err = machine.purchase(1).unwrap_err();
        assert_eq!(
            err,
            PurchaseError::InsufficientFunds {
                price: Amount::new(15),
                balance: Amount::new(10)
            }
        );
        assert_eq!(err.to_string(), "insufficient funds, need 15");
        assert_eq!(state(&machine), before);
    }

    #[test]
    fn purchase_infeasible_change_changes_nothing() {
        let mut machine = machine(&[]);
        machine.reprice(1, Amount::new(2)).unwrap();
        machine.insert_coin(5, 1);
        let before = state(&machine);

        let err = machine.purchase(1).unwrap_err();
        assert_eq!(err, PurchaseError::CannotDispenseChange(Amount::new(3)));
        assert!(err.to_string().starts_with("cannot dispense change"));
        assert_eq!(state(&machine), before);
    }

    #[test]
    fn purchase_follows_greedy_even_when_other_plan_exists() {
        // Change of 6: greedy picks the 5 and strands 1, though 2+2+2 would do.
        let mut machine = machine(&[(5, 1), (2, 3)]);
        machine.reprice(1, Amount::new(4)).unwrap();
        machine.insert_coin(10, 1);

        assert_eq!(
            machine.purchase(1),
            Err(PurchaseError::CannotDispenseChange(Amount::new(6)))
        );
        assert_eq!(machine.balance(), Amount::new(10));
    }

    #[test]
    fn purchase_last_unit_then_out_of_stock() {
        let mut machine = machine(&[]);
        for _ in 0..3 {
            machine.insert_coin(10, 1);
            machine.insert_coin(5, 1);
            machine.purchase(1).unwrap();
        }
        machine.insert_coin(10, 1);
        machine.insert_coin(5, 1);
        assert_eq!(machine.purchase(1), Err(PurchaseError::OutOfStock(1)));
        assert_eq!(machine.bank().total(), Amount::new(45));
        assert_eq!(machine.balance(), Amount::new(15));
    }

    // Admin

    #[test]
    fn restock_and_reprice() {
        let mut machine = machine(&[]);
        machine.restock(1, 2).unwrap();
        machine.reprice(1, Amount::new(20)).unwrap();

        let product = machine.product(1).unwrap();
        assert_eq!(product.quantity, 5);
        assert_eq!(product.price, Amount::new(20));

        assert_eq!(machine.restock(2, 1), Err(CatalogError::ProductNotFound(2)));
        assert_eq!(machine.reprice(1, Amount::ZERO), Err(CatalogError::ZeroPrice));
    }

    #[test]
    fn bank_report_lists_every_denomination() {
        let machine = machine(&[(10, 5), (5, 5)]);
        let report = machine.bank_report();
        assert_eq!(report.total, Amount::new(75));
        assert_eq!(report.holdings.iter().count(), 6);
        assert_eq!(report.holdings.to_string(), "100x0 50x0 10x5 5x5 2x0 1x0");
    }

    #[test]
    fn collect_cash_empties_bank() {
        let mut machine = machine(&[(100, 1), (10, 5), (1, 2)]);
        machine.insert_coin(50, 1);
        let before = machine.bank().total();

        assert_eq!(machine.collect_cash(), before);
        assert_eq!(machine.bank().total(), Amount::ZERO);
        // the tray is not the machine's money
        assert_eq!(machine.balance(), Amount::new(50));
        assert_eq!(machine.collect_cash(), Amount::ZERO);
    }

    #[test]
    fn machines_are_independent() {
        let mut a = machine(&[(10, 1)]);
        let b = machine(&[(10, 1)]);
        a.collect_cash();
        assert_eq!(b.bank().total(), Amount::new(10));
    }

    #[test]
    fn from_config_seeds_bank_and_products() {
        let machine = Machine::from_config(&MachineConfig::default()).unwrap();
        assert_eq!(machine.bank().total(), Amount::new(75));

        let names: Vec<_> = machine.products().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Cola", "Chips", "Candy"]);
        assert_eq!(machine.product(1).unwrap().price, Amount::new(15));
    }
}
