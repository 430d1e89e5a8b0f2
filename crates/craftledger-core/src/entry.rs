//! Requirement entries, crafting lists, and inventory records.
//!
//! These are the raw inputs the aggregator and reconciler consume. Item
//! names are case-insensitive everywhere in the system; constructors
//! normalize them to lowercase so lookups never have to.

use crate::list_id::ListId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requirement kinds
// ---------------------------------------------------------------------------

/// How an item is obtained. The raw tag text from the source data is kept
/// alongside (see [`RequirementEntry::kind_tag`]) for display; this closed
/// enum is what the engine branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequirementKind {
    /// Crafted from a recipe (`craft` tag).
    Craft,
    /// Gathered from a node (`node` tag).
    Gather,
    /// Anything else: vendor, drop, free-text provenance.
    Other,
}

impl RequirementKind {
    /// Map a raw kind tag to the closed enum.
    pub fn from_tag(tag: &str) -> RequirementKind {
        match tag {
            "craft" => RequirementKind::Craft,
            "node" => RequirementKind::Gather,
            _ => RequirementKind::Other,
        }
    }

    pub fn is_craft(self) -> bool {
        self == RequirementKind::Craft
    }
}

// ---------------------------------------------------------------------------
// Entries and lists
// ---------------------------------------------------------------------------

/// One required component on one crafting list. Identity is
/// (item, list id); the same item may appear across many lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementEntry {
    pub item: String,
    pub amount: u32,
    pub kind: RequirementKind,
    /// Raw kind tag as it appeared in the source record.
    pub kind_tag: String,
    pub source: String,
    pub list_id: ListId,
    pub high_quality: bool,
}

impl RequirementEntry {
    /// Build an entry from a raw record. The item name is lowercased and,
    /// for high-quality lists, suffixed with ` hq` so the two qualities
    /// track as distinct items.
    pub fn new(
        item: &str,
        amount: u32,
        kind_tag: &str,
        source: &str,
        list_id: ListId,
        high_quality: bool,
    ) -> RequirementEntry {
        let mut item = item.to_lowercase();
        if high_quality && !item.ends_with(" hq") {
            item.push_str(" hq");
        }
        RequirementEntry {
            item,
            amount,
            kind: RequirementKind::from_tag(kind_tag),
            kind_tag: kind_tag.to_string(),
            source: source.to_string(),
            list_id,
            high_quality,
        }
    }
}

/// One source list: all entries share the list id and quality flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingList {
    pub high_quality: bool,
    pub id: ListId,
    pub entries: Vec<RequirementEntry>,
}

impl CraftingList {
    pub fn new(id: ListId, high_quality: bool, entries: Vec<RequirementEntry>) -> CraftingList {
        CraftingList {
            high_quality,
            id,
            entries,
        }
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// On-hand stock for one item. Read-only input to the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub quantity: u32,
}

impl InventoryItem {
    pub fn new(name: &str, quantity: u32) -> InventoryItem {
        InventoryItem {
            name: name.to_lowercase(),
            quantity,
        }
    }
}
