//! Line-based record formats.
//!
//! Three one-record-per-line grammars plus the raw comma-separated list
//! files:
//!
//! - Recipe record: `name (yield): qty1 ing1, qty2 ing2, ...` (the
//!   ingredient section may be empty).
//! - Merged-list record: `name (current/total)` then optionally
//!   ` (kind: source)`, optionally a ` -- recipe --` annotation, then
//!   free-form tag text.
//! - Inventory record: `quantity name`.
//! - List file: `name,amount,kind,source...` rows under a file stem that
//!   carries the list id and an optional `-hq` marker.

use craftledger_core::engine::RequirementSet;
use craftledger_core::entry::{CraftingList, InventoryItem, RequirementEntry, RequirementKind};
use craftledger_core::list_id::{ListId, ListIdError};
use craftledger_core::recipe::{Ingredient, Recipe};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-record parse failures. One bad line is fatal for that record only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("malformed recipe record: {0}")]
    MalformedRecipe(String),
    #[error("malformed list record: {0}")]
    MalformedList(String),
    #[error("malformed inventory record: {0}")]
    MalformedInventory(String),
    #[error(transparent)]
    ListId(#[from] ListIdError),
}

// ---------------------------------------------------------------------------
// Recipe records
// ---------------------------------------------------------------------------

/// Parse `name (yield): qty1 ing1, qty2 ing2, ...`.
pub fn parse_recipe_record(line: &str) -> Result<Recipe, RecordError> {
    let malformed = || RecordError::MalformedRecipe(line.to_string());

    // The name may itself contain parentheses; the yield group is the
    // first ` (digits):` occurrence.
    for (pos, _) in line.match_indices(" (") {
        let rest = &line[pos + 2..];
        let Some(close) = rest.find(')') else { continue };
        let digits = &rest[..close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let Some(section) = rest[close + 1..].strip_prefix(':') else {
            continue;
        };
        let batch_yield = digits.parse().map_err(|_| malformed())?;
        let mut ingredients = Vec::new();
        for piece in section.split(',') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            let (quantity, name) = piece.split_once(' ').ok_or_else(malformed)?;
            let quantity = quantity.parse().map_err(|_| malformed())?;
            ingredients.push(Ingredient::new(name, quantity));
        }
        return Ok(Recipe::new(&line[..pos], batch_yield, ingredients));
    }
    Err(malformed())
}

// ---------------------------------------------------------------------------
// Merged-list records
// ---------------------------------------------------------------------------

/// One parsed merged-list line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRecord {
    pub name: String,
    pub current: u32,
    pub total: u32,
    /// Empty when the record carried no `(kind: source)` group.
    pub kind_tag: String,
    pub source: String,
    /// The raw ` -- ... --` annotation text, when present.
    pub recipe: Option<String>,
    pub tags: String,
}

impl ListRecord {
    pub fn kind(&self) -> RequirementKind {
        RequirementKind::from_tag(&self.kind_tag)
    }

    /// Pull current/total back out of a reconciled requirement set.
    pub fn sync(&mut self, requirements: &RequirementSet) {
        if let Some(item) = requirements.get(&self.name) {
            self.current = item.current;
            self.total = item.total;
        }
    }
}

impl fmt::Display for ListRecord {
    /// Renders the record back to its line form. The recipe annotation is
    /// dropped, matching how rewritten lists are stored.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.current, self.total)?;
        if !self.kind_tag.is_empty() {
            write!(f, " ({}: {})", self.kind_tag, self.source)?;
        }
        if !self.tags.is_empty() {
            write!(f, " {}", self.tags)?;
        }
        Ok(())
    }
}

/// Parse a merged-list record line.
pub fn parse_list_record(line: &str) -> Result<ListRecord, RecordError> {
    let malformed = || RecordError::MalformedList(line.to_string());

    // Find the first ` (c/t)` group; everything before it is the name.
    let mut found = None;
    for (pos, _) in line.match_indices(" (") {
        let rest = &line[pos + 2..];
        let Some(close) = rest.find(')') else { continue };
        let inside = &rest[..close];
        let Some((current, total)) = inside.split_once('/') else {
            continue;
        };
        if current.is_empty()
            || total.is_empty()
            || !current.bytes().all(|b| b.is_ascii_digit())
            || !total.bytes().all(|b| b.is_ascii_digit())
        {
            continue;
        }
        let current = current.parse().map_err(|_| malformed())?;
        let total = total.parse().map_err(|_| malformed())?;
        found = Some((pos, current, total, pos + 2 + close + 1));
        break;
    }
    let (name_end, current, total, mut cursor) = found.ok_or_else(malformed)?;
    let name = line[..name_end].to_lowercase();

    // Optional ` (kind: source)` group.
    let mut kind_tag = String::new();
    let mut source = String::new();
    let rest = &line[cursor..];
    if let Some(inner) = rest.strip_prefix(" (") {
        if let Some(close) = inner.find(')') {
            if let Some((tag, src)) = inner[..close].split_once(": ") {
                kind_tag = tag.to_string();
                source = src.to_string();
                cursor += 2 + close + 1;
            }
        }
    }

    // Optional ` -- recipe --` annotation.
    let mut recipe = None;
    let rest = &line[cursor..];
    if let Some(inner) = rest.strip_prefix(" -- ") {
        if let Some(close) = inner.find(" --") {
            recipe = Some(inner[..close].to_string());
            cursor += 4 + close + 3;
        }
    }

    let tags = line[cursor..].trim_start().to_string();
    Ok(ListRecord {
        name,
        current,
        total,
        kind_tag,
        source,
        recipe,
        tags,
    })
}

/// Build a requirement set from parsed merged-list records.
pub fn requirement_set_from_records(records: &[ListRecord]) -> RequirementSet {
    let mut set = RequirementSet::new();
    for record in records {
        set.insert(&record.name, record.current, record.total, record.kind());
    }
    set
}

/// Reorder records so each normal-quality record immediately precedes its
/// high-quality variant. Records without a counterpart keep their relative
/// order.
pub fn pair_hq_with_nq(records: Vec<ListRecord>) -> Vec<ListRecord> {
    let mut out: Vec<ListRecord> = Vec::with_capacity(records.len());
    for record in &records {
        if out.iter().any(|r| r.name == record.name) {
            continue;
        }
        match record.name.strip_suffix(" hq") {
            Some(nq_name) => {
                if let Some(nq) = records.iter().find(|r| r.name == nq_name) {
                    out.push(nq.clone());
                }
                out.push(record.clone());
            }
            None => {
                out.push(record.clone());
                let hq_name = format!("{} hq", record.name);
                if let Some(hq) = records.iter().find(|r| r.name == hq_name) {
                    out.push(hq.clone());
                }
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Inventory records
// ---------------------------------------------------------------------------

/// Parse `quantity name`.
pub fn parse_inventory_record(line: &str) -> Result<InventoryItem, RecordError> {
    let malformed = || RecordError::MalformedInventory(line.to_string());
    let (quantity, name) = line.trim().split_once(' ').ok_or_else(malformed)?;
    let quantity = quantity.parse().map_err(|_| malformed())?;
    Ok(InventoryItem::new(name, quantity))
}

// ---------------------------------------------------------------------------
// Raw list files
// ---------------------------------------------------------------------------

/// Split a list-file stem into its id and high-quality marker
/// (`HWa1-hq` is the high-quality sub-list of `HWa1`).
pub fn parse_stem(stem: &str) -> Result<(ListId, bool), ListIdError> {
    let (raw, high_quality) = match stem.strip_suffix("-hq") {
        Some(raw) => (raw, true),
        None => (stem, false),
    };
    Ok((ListId::parse(raw)?, high_quality))
}

/// Parse one comma-separated list-file row. Rows without a numeric amount
/// column are headers or notes and yield `None`.
pub fn parse_entry_record(
    line: &str,
    list_id: &ListId,
    high_quality: bool,
) -> Option<RequirementEntry> {
    let columns: Vec<&str> = line.split(',').collect();
    if columns.len() < 3 {
        return None;
    }
    let amount: u32 = columns[1].trim().parse().ok()?;
    let name = columns[0].trim_matches('"');
    let source = columns[3..].join(", ");
    Some(RequirementEntry::new(
        name,
        amount,
        columns[2],
        source.trim_matches('"'),
        list_id.clone(),
        high_quality,
    ))
}

/// Parse a whole list file from its stem and lines.
pub fn parse_list_file<'a, I>(stem: &str, lines: I) -> Result<CraftingList, ListIdError>
where
    I: IntoIterator<Item = &'a str>,
{
    let (list_id, high_quality) = parse_stem(stem)?;
    let entries = lines
        .into_iter()
        .filter_map(|line| parse_entry_record(line, &list_id, high_quality))
        .collect();
    Ok(CraftingList::new(list_id, high_quality, entries))
}

// ===========================================================================
// Tests
// ===========================================================================
