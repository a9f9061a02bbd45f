//! Denominated coin ledger.
//!
//! A ledger tracks how many coins of each configured denomination are held.
//! The machine's bank and the customer's coin tray are both ledgers over the
//! same denomination set.

use std::collections::BTreeMap;

use tracing::debug;

use crate::Amount;
use crate::model::{Coins, Count, Denomination};

mod error;
pub use error::LedgerError;

/// Coin counts over a fixed set of denominations.
///
/// Every configured denomination has an entry (possibly zero); nothing else
/// ever gets one.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Configured denominations, largest first.
    denominations: Vec<Denomination>,
    counts: BTreeMap<Denomination, Count>,
}

/// Public API
impl Ledger {
    /// Create an empty ledger. Zero and duplicate denominations are dropped.
    pub fn new(denominations: impl IntoIterator<Item = Denomination>) -> Self {
        let mut denominations: Vec<_> = denominations.into_iter().filter(|&d| d > 0).collect();
        denominations.sort_unstable_by(|a, b| b.cmp(a));
        denominations.dedup();

        let counts = denominations.iter().map(|&d| (d, 0)).collect();
        Self {
            denominations,
            counts,
        }
    }

    /// Create a ledger seeded with `holdings`.
    pub fn with_holdings(
        denominations: impl IntoIterator<Item = Denomination>,
        holdings: &Coins,
    ) -> Self {
        let mut ledger = Self::new(denominations);
        ledger.deposit(holdings);
        ledger
    }

    /// Configured denominations, largest first.
    pub fn denominations(&self) -> &[Denomination] {
        &self.denominations
    }

    pub fn accepts(&self, denomination: Denomination) -> bool {
        self.counts.contains_key(&denomination)
    }

    pub fn count(&self, denomination: Denomination) -> Count {
        self.counts.get(&denomination).copied().unwrap_or(0)
    }

    /// Sum of face value over all held coins.
    pub fn total(&self) -> Amount {
        self.counts.iter().map(|(&d, &c)| Amount::of(d, c)).sum()
    }

    /// Add coins to the ledger. Unrecognized denominations are ignored.
    pub fn deposit(&mut self, amounts: &Coins) {
        for (denomination, count) in amounts.iter() {
            self.add(denomination, count);
        }
    }

    /// Add `count` coins of one denomination.
    ///
    /// Returns `false` (and does nothing) for an unrecognized denomination.
    pub fn add(&mut self, denomination: Denomination, count: Count) -> bool {
        match self.counts.get_mut(&denomination) {
            Some(held) => {
                *held = held.saturating_add(count);
                true
            }
            None => {
                debug!(denomination, count, "ignoring unrecognized denomination");
                false
            }
        }
    }

    /// Remove coins from the ledger, all or nothing.
    ///
    /// Fails without mutation if any requested count exceeds what is held.
    /// Unrecognized denominations count as held zero.
    pub fn withdraw(&mut self, amounts: &Coins) -> Result<(), LedgerError> {
        for (denomination, requested) in amounts.iter() {
            let held = self.count(denomination);
            if held < requested {
                return Err(LedgerError::InsufficientCoins {
                    denomination,
                    held,
                    requested,
                });
            }
        }

        for (denomination, requested) in amounts.iter() {
            if let Some(held) = self.counts.get_mut(&denomination) {
                *held -= requested;
            }
        }

        Ok(())
    }

    /// Propose a change breakdown for `amount` without mutating the ledger.
    ///
    /// Greedy by descending denomination, bounded by held counts. A
    /// `ChangeUnavailable` error means greedy found no plan, not that no plan
    /// exists. The returned breakdown has no zero entries.
    pub fn make_change(&self, amount: Amount) -> Result<Coins, LedgerError> {
        let mut remaining = amount.value();
        let mut plan = Coins::new();

        for &denomination in &self.denominations {
            if remaining == 0 {
                break;
            }
            let face = u64::from(denomination);
            let used = (remaining / face).min(u64::from(self.count(denomination)));
            if used > 0 {
                // bounded by a held Count
                plan.add(denomination, used as Count);
                remaining -= used * face;
            }
        }

        if remaining != 0 {
            return Err(LedgerError::ChangeUnavailable {
                amount,
                remaining: Amount::new(remaining),
            });
        }

        Ok(plan)
    }

    /// Copy of current holdings, zero counts included.
    pub fn snapshot(&self) -> Coins {
        self.counts.iter().map(|(&d, &c)| (d, c)).collect()
    }

    /// Reset every count to zero.
    pub fn clear(&mut self) {
        self.counts.values_mut().for_each(|c| *c = 0);
    }
}
