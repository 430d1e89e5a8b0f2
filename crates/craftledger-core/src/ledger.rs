//! The reconciliation ledger: per-run record of quantity increases and the
//! parent item that caused each one.
//!
//! Created fresh for every reconciliation pass and discarded after
//! reporting. The ledger records *offered* amounts, not capped ones, so
//! leftover math can see quantity that arrived but was never needed.

use std::collections::HashMap;
use std::fmt;

/// One attribution line: how much of an item's increase came from a given
/// parent (`None` = applied directly from inventory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub parent: Option<String>,
    pub amount: u32,
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "{} [{parent}]", self.amount),
            None => write!(f, "{} [direct]", self.amount),
        }
    }
}

/// Accumulates, per item, the total quantity added and the breakdown by
/// immediate parent.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    totals: HashMap<String, u32>,
    sourced: HashMap<(String, Option<String>), u32>,
}

impl Ledger {
    pub fn new() -> Ledger {
        Ledger::default()
    }

    pub(crate) fn record(&mut self, item: &str, parent: Option<&str>, amount: u32) {
        if amount == 0 {
            return;
        }
        *self.totals.entry(item.to_string()).or_insert(0) += amount;
        *self
            .sourced
            .entry((item.to_string(), parent.map(str::to_string)))
            .or_insert(0) += amount;
    }

    /// Total quantity recorded against an item, across all parents.
    pub fn total_added(&self, item: &str) -> u32 {
        self.totals.get(item).copied().unwrap_or(0)
    }

    /// Attribution breakdown for an item, sorted direct-first, then by
    /// descending amount, then by parent name for determinism.
    pub fn attribution(&self, item: &str) -> Vec<Attribution> {
        let mut out: Vec<Attribution> = self
            .sourced
            .iter()
            .filter(|((name, _), _)| name == item)
            .map(|((_, parent), &amount)| Attribution {
                parent: parent.clone(),
                amount,
            })
            .collect();
        out.sort_by(|a, b| {
            a.parent
                .is_some()
                .cmp(&b.parent.is_some())
                .then(b.amount.cmp(&a.amount))
                .then(a.parent.cmp(&b.parent))
        });
        out
    }

    /// All item names with recorded increases, sorted.
    pub fn items(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.totals.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}
