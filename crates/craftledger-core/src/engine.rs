//! The yield reconciliation engine.
//!
//! Aggregated demand for a craftable item is a sum of per-list requirements
//! that were each rounded up to whole batches, so the sum can overshoot the
//! true need. This module owns the two traversals that correct for that:
//!
//! - [`Engine::apply_increase`] propagates an availability increase down the
//!   ingredient tree in whole-batch units, capping at what each requirement
//!   still needs.
//! - [`Engine::fix_overshoot`] finds multi-list craft items whose combined
//!   batch count is lower than the per-list batch counts summed, and feeds
//!   the freed ingredient quantities back through `apply_increase`.
//!
//! The [`Engine`] is an explicit traversal context: it borrows the mutable
//! [`RequirementSet`] and the immutable [`RecipeStore`] for one run and owns
//! the run's [`Ledger`], [`Diagnostics`], and update traces. Both recursive
//! walks carry the ancestor chain, which doubles as the cycle guard: a
//! recipe that reaches one of its own ancestors fails fast with a
//! [`Diagnostic::CyclicRecipe`] instead of recursing unbounded.

use crate::aggregate::AggregatedRequirements;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::entry::RequirementKind;
use crate::ledger::Ledger;
use crate::recipe::{Ingredient, RecipeStore};
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Requirement state
// ---------------------------------------------------------------------------

/// Mutable per-item state during a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedItem {
    pub name: String,
    /// Amount already satisfied or consumed.
    pub current: u32,
    /// Amount still required overall. `current` never exceeds this.
    pub total: u32,
    pub kind: RequirementKind,
    /// Cleared when the item becomes fully satisfied; satisfied items leave
    /// the outstanding-requirements view but keep their state for reporting.
    pub outstanding: bool,
}

impl TrackedItem {
    pub fn is_satisfied(&self) -> bool {
        self.current == self.total
    }
}

/// The set of tracked requirements for one run: items in insertion order
/// plus a lowercased-name index, so reports are deterministic.
#[derive(Debug, Clone, Default)]
pub struct RequirementSet {
    items: Vec<TrackedItem>,
    index: HashMap<String, usize>,
}

impl RequirementSet {
    pub fn new() -> RequirementSet {
        RequirementSet::default()
    }

    /// Add or replace a tracked item. `current` is clamped to `total`.
    pub fn insert(&mut self, name: &str, current: u32, total: u32, kind: RequirementKind) {
        let name = name.to_lowercase();
        let current = current.min(total);
        let item = TrackedItem {
            outstanding: current < total,
            name: name.clone(),
            current,
            total,
            kind,
        };
        match self.index.get(&name) {
            Some(&i) => self.items[i] = item,
            None => {
                self.index.insert(name, self.items.len());
                self.items.push(item);
            }
        }
    }

    /// Add a tracked item at the front of the iteration order. Used when a
    /// quality move materializes a normal-quality entry that should sit
    /// next to the items it was derived from.
    pub(crate) fn insert_front(&mut self, name: &str, current: u32, total: u32, kind: RequirementKind) {
        let name = name.to_lowercase();
        let current = current.min(total);
        self.items.insert(
            0,
            TrackedItem {
                outstanding: current < total,
                name: name.clone(),
                current,
                total,
                kind,
            },
        );
        for i in self.index.values_mut() {
            *i += 1;
        }
        self.index.insert(name, 0);
    }

    /// Build a fresh set from aggregation output: nothing satisfied yet.
    pub fn from_aggregated(aggregated: &AggregatedRequirements) -> RequirementSet {
        let mut set = RequirementSet::new();
        for req in aggregated.iter() {
            set.insert(&req.item, 0, req.total_amount, req.kind);
        }
        set
    }

    pub fn get(&self, name: &str) -> Option<&TrackedItem> {
        self.index.get(&name.to_lowercase()).map(|&i| &self.items[i])
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut TrackedItem> {
        let i = *self.index.get(&name.to_lowercase())?;
        Some(&mut self.items[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_lowercase())
    }

    /// Whether the item is tracked and not yet fully satisfied.
    pub fn is_outstanding(&self, name: &str) -> bool {
        self.get(name).is_some_and(|item| item.outstanding)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedItem> {
        self.items.iter()
    }

    pub fn outstanding(&self) -> impl Iterator<Item = &TrackedItem> {
        self.items.iter().filter(|item| item.outstanding)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Snapshot of (current, total) per item, for before/after reporting.
    pub fn snapshot(&self) -> HashMap<String, (u32, u32)> {
        self.items
            .iter()
            .map(|item| (item.name.clone(), (item.current, item.total)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Run output records
// ---------------------------------------------------------------------------

/// One applied state change, with the ancestor chain that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTrace {
    pub item: String,
    pub prev_current: u32,
    pub new_current: u32,
    pub total: u32,
    pub chain: Vec<String>,
    /// The item became fully satisfied in this step.
    pub satisfied: bool,
}

impl fmt::Display for UpdateTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "updated {} ({}/{}) -> ({}/{})",
            self.item, self.prev_current, self.total, self.new_current, self.total
        )?;
        if !self.chain.is_empty() {
            write!(f, " via {}", self.chain.join("->"))?;
        }
        if self.satisfied {
            write!(f, " [satisfied]")?;
        }
        Ok(())
    }
}

/// One corrected overshoot: a craft item whose per-list batch rounding
/// summed to more batches than the combined demand needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autofix {
    pub item: String,
    pub batches_removed: u32,
    /// Ingredient quantities freed by the removed batches.
    pub ingredient_deltas: Vec<Ingredient>,
}

impl fmt::Display for Autofix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} batch(es) removed:", self.item, self.batches_removed)?;
        for delta in &self.ingredient_deltas {
            write!(f, " -{} {}", delta.quantity, delta.name)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Traversal context for one reconciliation run.
pub struct Engine<'a> {
    requirements: &'a mut RequirementSet,
    recipes: &'a RecipeStore,
    ledger: Ledger,
    diagnostics: Diagnostics,
    updates: Vec<UpdateTrace>,
}

impl<'a> Engine<'a> {
    pub fn new(requirements: &'a mut RequirementSet, recipes: &'a RecipeStore) -> Engine<'a> {
        Engine {
            requirements,
            recipes,
            ledger: Ledger::new(),
            diagnostics: Diagnostics::new(),
            updates: Vec::new(),
        }
    }

    pub fn requirements(&self) -> &RequirementSet {
        self.requirements
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn updates(&self) -> &[UpdateTrace] {
        &self.updates
    }

    /// Release the borrowed requirement set and hand back the run records.
    pub fn finish(self) -> (Ledger, Diagnostics, Vec<UpdateTrace>) {
        (self.ledger, self.diagnostics, self.updates)
    }

    /// Apply an availability increase for `item`, propagating whole-batch
    /// reductions down its ingredient tree.
    ///
    /// The offered amount is recorded in the ledger in full; only the
    /// portion the requirement still needs is applied, and only applied
    /// amounts propagate. Untracked items get an unsourced ledger record
    /// and nothing else.
    pub fn apply_increase(&mut self, item: &str, amount: u32) {
        let mut chain = Vec::new();
        self.apply_inner(&item.to_lowercase(), amount, &mut chain);
    }

    fn apply_inner(&mut self, item: &str, amount: u32, chain: &mut Vec<String>) {
        if amount == 0 {
            return;
        }
        if chain.iter().any(|ancestor| ancestor == item) {
            self.diagnostics.push(Diagnostic::CyclicRecipe {
                item: item.to_string(),
                chain: chain.clone(),
            });
            return;
        }

        self.ledger
            .record(item, chain.last().map(String::as_str), amount);

        let Some(state) = self.requirements.get_mut(item) else {
            return;
        };
        if state.is_satisfied() {
            return;
        }

        let prev_current = state.current;
        let capped = amount.min(state.total - state.current);
        state.current += capped;
        let satisfied = state.is_satisfied();
        if satisfied {
            state.outstanding = false;
        }
        let total = state.total;
        let kind = state.kind;
        let new_current = state.current;

        self.updates.push(UpdateTrace {
            item: item.to_string(),
            prev_current,
            new_current,
            total,
            chain: chain.clone(),
            satisfied,
        });

        if kind != RequirementKind::Craft {
            return;
        }
        let recipes = self.recipes;
        let Some(recipe) = recipes.lookup(item) else {
            self.diagnostics.push(Diagnostic::MissingRecipe {
                item: item.to_string(),
            });
            return;
        };

        // Newly-unnecessary whole batches. The final batch's leftover target
        // is `total % yield`, not zero, hence the extra batch when the item
        // just became satisfied short of a batch boundary.
        let batch_yield = recipe.batch_yield;
        let mut batches = (prev_current % batch_yield + capped) / batch_yield;
        if satisfied && total % batch_yield != 0 {
            batches += 1;
        }
        if batches == 0 {
            return;
        }

        chain.push(item.to_string());
        for ingredient in &recipe.ingredients {
            self.apply_inner(&ingredient.name, ingredient.quantity * batches, chain);
        }
        chain.pop();
    }

    /// Dry-run recipe-availability check over the ingredient tree rooted at
    /// a tracked item. Returns the names of craft items with no recipe;
    /// ingredients absent from the requirement set are recorded as
    /// [`Diagnostic::MissingEntry`] with their ancestor chain. Mutates
    /// nothing but the diagnostics.
    pub fn missing_recipes(&mut self, item: &str) -> Vec<String> {
        let mut missing = Vec::new();
        let mut chain = Vec::new();
        self.missing_inner(&item.to_lowercase(), &mut chain, &mut missing);
        missing
    }

    fn missing_inner(&mut self, item: &str, chain: &mut Vec<String>, missing: &mut Vec<String>) {
        if chain.iter().any(|ancestor| ancestor == item) {
            self.diagnostics.push(Diagnostic::CyclicRecipe {
                item: item.to_string(),
                chain: chain.clone(),
            });
            return;
        }
        let Some(state) = self.requirements.get(item) else {
            return;
        };
        if state.kind != RequirementKind::Craft {
            return;
        }
        let recipes = self.recipes;
        let Some(recipe) = recipes.lookup(item) else {
            missing.push(item.to_string());
            return;
        };

        chain.push(item.to_string());
        for ingredient in &recipe.ingredients {
            if self.requirements.contains(&ingredient.name) {
                self.missing_inner(&ingredient.name, chain, missing);
            } else {
                self.diagnostics.push(Diagnostic::MissingEntry {
                    item: ingredient.name.clone(),
                    chain: chain.clone(),
                });
            }
        }
        chain.pop();
    }

    /// Correct batch-rounding overshoot in aggregated demand.
    ///
    /// For every craft item required by more than one list, with a known
    /// recipe of yield > 1: the batches saved by crafting the combined
    /// demand instead of each list's demand separately are
    /// `sum(ceil(a_i / yield)) - ceil(sum(a_i) / yield)`. The freed
    /// ingredient quantities are pushed through [`Engine::apply_increase`]
    /// with this item as the parent, so reductions cascade. Craft items
    /// without a recipe are left to the missing-recipe audit.
    pub fn fix_overshoot(&mut self, aggregated: &AggregatedRequirements) -> Vec<Autofix> {
        let mut fixes = Vec::new();
        for req in aggregated.iter() {
            if !req.kind.is_craft() || req.per_list.len() < 2 {
                continue;
            }
            let recipes = self.recipes;
            let Some(recipe) = recipes.lookup(&req.item) else {
                continue;
            };
            let batch_yield = recipe.batch_yield;
            if batch_yield <= 1 {
                continue;
            }
            let separate: u32 = req
                .per_list
                .iter()
                .map(|(_, amount)| amount.div_ceil(batch_yield))
                .sum();
            let combined = req.total_amount.div_ceil(batch_yield);
            let batches_removed = separate - combined;
            if batches_removed == 0 {
                continue;
            }

            let ingredient_deltas: Vec<Ingredient> = recipe
                .ingredients
                .iter()
                .map(|i| Ingredient::new(&i.name, i.quantity * batches_removed))
                .collect();
            let mut chain = vec![req.item.clone()];
            for ingredient in &recipe.ingredients {
                self.apply_inner(
                    &ingredient.name,
                    ingredient.quantity * batches_removed,
                    &mut chain,
                );
            }
            fixes.push(Autofix {
                item: req.item.clone(),
                batches_removed,
                ingredient_deltas,
            });
        }
        fixes
    }
}

// ===========================================================================
// Tests
// ===========================================================================
