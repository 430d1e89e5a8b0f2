//! Craftledger Core -- merging game crafting shopping lists with recipe-yield
//! reconciliation.
//!
//! This crate takes many per-stage shopping lists of required items, merges
//! them into one aggregated list, and keeps the aggregated quantities honest
//! when recipes produce more than one unit per craft. Everything is pure
//! data-in, data-out; file formats live in `craftledger-data`.
//!
//! # Reconciliation Pipeline
//!
//! 1. **Parse** -- Each list gets a [`list_id::ListId`] and its entries become
//!    [`entry::RequirementEntry`] values (names lowercased, high-quality
//!    variants suffixed).
//! 2. **Aggregate** -- [`aggregate::aggregate`] merges lists in canonical id
//!    order into per-item totals with provenance.
//! 3. **Fix overshoot** -- [`engine::Engine::fix_overshoot`] removes batches
//!    that per-list rounding double-counted and cascades the freed
//!    ingredients.
//! 4. **Reconcile inventory** -- [`reconcile::reconcile`] applies on-hand
//!    stock through the ingredient tree, all-or-nothing.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Traversal context for one reconciliation run.
//! - [`engine::RequirementSet`] -- Mutable per-run requirement state.
//! - [`recipe::RecipeStore`] -- Case-insensitive name-to-recipe mapping.
//! - [`aggregate::AggregatedRequirements`] -- Ordered merged output.
//! - [`ledger::Ledger`] -- Per-run record of increases and their parents.
//! - [`diagnostics::Diagnostics`] -- Accumulated non-fatal problems.
//! - [`quality::lower_quality`] -- Demand moves from high to normal quality.

pub mod aggregate;
pub mod diagnostics;
pub mod engine;
pub mod entry;
pub mod ledger;
pub mod list_id;
pub mod quality;
pub mod recipe;
pub mod reconcile;
