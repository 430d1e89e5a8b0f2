//! The list aggregator: merges many independent requirement lists into one
//! ordered mapping from item to total required quantity.
//!
//! Lists are processed in canonical [`ListId`] order and items keep their
//! first-seen order, so aggregation output is deterministic. Each item also
//! gets a canonical kind/source picked from its entries: a high-quality
//! item's provenance favors crafting/gathering, a normal-quality item's
//! favors direct purchase or drop when one exists.

use crate::entry::{CraftingList, RequirementEntry, RequirementKind};
use crate::list_id::ListId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One item's merged requirement across all lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRequirement {
    pub item: String,
    /// Arithmetic sum of all entries' amounts, before any yield correction.
    pub total_amount: u32,
    pub kind: RequirementKind,
    pub kind_tag: String,
    pub source: String,
    pub high_quality: bool,
    /// (list id, amount) per contributing entry, in list order.
    pub per_list: Vec<(ListId, u32)>,
}

impl fmt::Display for AggregatedRequirement {
    /// Renders the merged-list line: `name (0/total) (kind: source) [id/amt]...`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (0/{}) ({}: {}) ",
            self.item, self.total_amount, self.kind_tag, self.source
        )?;
        for (list_id, amount) in &self.per_list {
            write!(f, "[{list_id}/{amount}]")?;
        }
        Ok(())
    }
}

/// Aggregation output: items in first-seen order plus a name index.
#[derive(Debug, Clone, Default)]
pub struct AggregatedRequirements {
    items: Vec<AggregatedRequirement>,
    index: HashMap<String, usize>,
}

impl AggregatedRequirements {
    pub fn get(&self, item: &str) -> Option<&AggregatedRequirement> {
        self.index
            .get(&item.to_lowercase())
            .map(|&i| &self.items[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregatedRequirement> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Merge all lists into per-item aggregated requirements.
pub fn aggregate(lists: &[CraftingList]) -> AggregatedRequirements {
    let mut ordered: Vec<&CraftingList> = lists.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    // Group entries per item, preserving first-seen item order and original
    // entry order within each group.
    let mut groups: Vec<(String, Vec<&RequirementEntry>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for list in ordered {
        for entry in &list.entries {
            match index.get(&entry.item) {
                Some(&i) => groups[i].1.push(entry),
                None => {
                    index.insert(entry.item.clone(), groups.len());
                    groups.push((entry.item.clone(), vec![entry]));
                }
            }
        }
    }

    let items = groups
        .into_iter()
        .map(|(item, entries)| {
            let total_amount = entries.iter().map(|e| e.amount).sum();
            let high_quality = entries.iter().any(|e| e.high_quality);
            let pick = canonical_entry(&entries, high_quality);
            let per_list = entries
                .iter()
                .map(|e| (e.list_id.clone(), e.amount))
                .collect();
            AggregatedRequirement {
                item,
                total_amount,
                kind: pick.kind,
                kind_tag: pick.kind_tag.clone(),
                source: pick.source.clone(),
                high_quality,
                per_list,
            }
        })
        .collect();

    AggregatedRequirements { items, index }
}

/// Pick the entry whose kind/source become canonical for the item.
///
/// High-quality: first craft entry, else first gather entry, else the first
/// entry. Normal-quality: first non-craft entry, else the first entry.
fn canonical_entry<'a>(
    entries: &[&'a RequirementEntry],
    high_quality: bool,
) -> &'a RequirementEntry {
    let found = if high_quality {
        entries
            .iter()
            .copied()
            .find(|e| e.kind == RequirementKind::Craft)
            .or_else(|| {
                entries
                    .iter()
                    .copied()
                    .find(|e| e.kind == RequirementKind::Gather)
            })
    } else {
        entries.iter().copied().find(|e| e.kind != RequirementKind::Craft)
    };
    found.unwrap_or(entries[0])
}
