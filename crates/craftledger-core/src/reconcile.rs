//! The inventory reconciler: applies on-hand stock to an outstanding
//! requirement set in one all-or-nothing pass.
//!
//! Before anything is mutated, every inventory item that maps onto an
//! outstanding craft requirement gets a dry-run recipe check over its
//! ingredient tree. Any missing recipe aborts the whole pass, because
//! applying a partial inventory would silently skip ingredient reductions
//! and leave the merged totals overstated.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::engine::{Engine, RequirementSet, UpdateTrace};
use crate::entry::InventoryItem;
use crate::ledger::{Attribution, Ledger};
use crate::recipe::RecipeStore;
use std::fmt;

/// The reconciler's only failure mode. Diagnostics from the dry run ride
/// along so the caller can report chains and cycles.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReconcileError {
    #[error("missing recipes, not reconciling: {}", .items.join(", "))]
    MissingRecipes {
        items: Vec<String>,
        diagnostics: Diagnostics,
    },
}

/// One item that received more quantity than its requirement needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leftover {
    pub item: String,
    pub prev_current: u32,
    pub total: u32,
    /// Quantity recorded for the item during this pass, uncapped.
    pub added: u32,
    /// Per-parent breakdown of `added`.
    pub attribution: Vec<Attribution>,
}

impl Leftover {
    /// Quantity that arrived beyond what the requirement could absorb.
    pub fn excess(&self) -> u32 {
        (self.prev_current + self.added).saturating_sub(self.total)
    }

    pub fn new_current(&self) -> u32 {
        (self.prev_current + self.added).min(self.total)
    }
}

impl fmt::Display for Leftover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} left over ({}/{}, +{}:",
            self.item,
            self.excess(),
            self.prev_current,
            self.total,
            self.added
        )?;
        for attribution in &self.attribution {
            write!(f, " {attribution}")?;
        }
        write!(f, ")")
    }
}

/// Everything one reconciliation pass produced.
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    pub updates: Vec<UpdateTrace>,
    pub leftovers: Vec<Leftover>,
    pub diagnostics: Diagnostics,
    pub ledger: Ledger,
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for update in &self.updates {
            writeln!(f, "{update}")?;
        }
        for leftover in &self.leftovers {
            writeln!(f, "{leftover}")?;
        }
        write!(f, "{}", self.diagnostics)
    }
}

/// Apply inventory quantities to the requirement set.
///
/// Phase one dry-runs each relevant inventory item and collects craft items
/// with no recipe; any hit aborts with nothing mutated. Phase two applies
/// each item's quantity through the engine. Inventory items with no tracked
/// entry are reported as chainless [`Diagnostic::MissingEntry`]s but still
/// get ledger records, and everything they over-supplied comes back as
/// [`Leftover`]s.
pub fn reconcile(
    requirements: &mut RequirementSet,
    recipes: &RecipeStore,
    inventory: &[InventoryItem],
) -> Result<ReconcileReport, ReconcileError> {
    let mut engine = Engine::new(requirements, recipes);

    // Untracked stock is reported as a missing entry with an empty chain;
    // it still flows through the apply phase into the ledger.
    let mut untracked = Diagnostics::new();
    let mut missing: Vec<String> = Vec::new();
    for item in inventory {
        if !engine.requirements().contains(&item.name) {
            untracked.push(Diagnostic::MissingEntry {
                item: item.name.clone(),
                chain: Vec::new(),
            });
            continue;
        }
        if !engine.requirements().is_outstanding(&item.name) {
            continue;
        }
        for name in engine.missing_recipes(&item.name) {
            if !missing.contains(&name) {
                missing.push(name);
            }
        }
    }
    if !missing.is_empty() {
        let (_, mut diagnostics, _) = engine.finish();
        diagnostics.merge(untracked);
        return Err(ReconcileError::MissingRecipes {
            items: missing,
            diagnostics,
        });
    }

    let before = engine.requirements().snapshot();
    for item in inventory {
        engine.apply_increase(&item.name, item.quantity);
    }
    let (ledger, mut diagnostics, updates) = engine.finish();
    diagnostics.merge(untracked);

    // Anything the ledger saw arrive that exceeded its requirement (or had
    // no requirement at all) is a leftover.
    let mut leftovers = Vec::new();
    for name in ledger.items() {
        let added = ledger.total_added(name);
        let (prev_current, total) = before.get(name).copied().unwrap_or((0, 0));
        if prev_current + added > total {
            leftovers.push(Leftover {
                item: name.to_string(),
                prev_current,
                total,
                added,
                attribution: ledger.attribution(name),
            });
        }
    }

    Ok(ReconcileReport {
        updates,
        leftovers,
        diagnostics,
        ledger,
    })
}
