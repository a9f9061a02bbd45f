//! Core domain types for the vending machine.

use std::collections::BTreeMap;
use std::fmt;

use crate::Amount;

/// Face value of a coin.
pub type Denomination = u32;

/// Number of coins of one denomination.
pub type Count = u32;

/// Product identifier, assigned sequentially starting at 1.
pub type ProductId = u32;

/// Coin counts keyed by denomination.
///
/// Used for ledger snapshots, tray contents and change breakdowns. It is an
/// owned value: cloning or mutating a `Coins` never touches the ledger it was
/// taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coins(BTreeMap<Denomination, Count>);

impl Coins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count held for `denomination`, zero when absent.
    pub fn get(&self, denomination: Denomination) -> Count {
        self.0.get(&denomination).copied().unwrap_or(0)
    }

    /// Add `count` coins of `denomination`.
    pub fn add(&mut self, denomination: Denomination, count: Count) {
        let entry = self.0.entry(denomination).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Entries in ascending denomination order, zero counts included.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Denomination, Count)> + '_ {
        self.0.iter().map(|(&d, &c)| (d, c))
    }

    pub fn total(&self) -> Amount {
        self.iter().map(|(d, c)| Amount::of(d, c)).sum()
    }

    /// True when no entry has a nonzero count.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|&c| c == 0)
    }

    /// Drop zero-count entries.
    pub fn without_zeros(mut self) -> Self {
        self.0.retain(|_, c| *c > 0);
        self
    }
}

impl FromIterator<(Denomination, Count)> for Coins {
    fn from_iter<I: IntoIterator<Item = (Denomination, Count)>>(iter: I) -> Self {
        let mut coins = Coins::new();
        for (d, c) in iter {
            coins.add(d, c);
        }
        coins
    }
}

impl<const N: usize> From<[(Denomination, Count); N]> for Coins {
    fn from(entries: [(Denomination, Count); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// `100x0 10x7 5x4`, largest denomination first.
impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (d, c)) in self.iter().rev().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{d}x{c}")?;
        }
        Ok(())
    }
}

/// A product offered by the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Amount,
    pub quantity: Count,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}
