//! Run diagnostics: collected during traversal, reported at the end.
//!
//! Nothing here is thrown mid-walk; a single run surfaces the complete set
//! of problems at once. Missing or cyclic recipes are blocking (the merged
//! totals would be wrong), missing entries are informational.

use crate::aggregate::AggregatedRequirements;
use crate::recipe::RecipeStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One problem found during a reconciliation or aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A craft-kind item with no recipe in the store, reached during an
    /// ingredient-tree traversal.
    MissingRecipe { item: String },
    /// A craft item with no recipe that appears on multiple lists with a
    /// source known for dense batch recipes: likely to cause silent
    /// overshoot.
    SuspiciousMissingRecipe { item: String, source: String },
    /// An ingredient that is not in the current requirement set, with the
    /// ancestor chain that reached it.
    MissingEntry { item: String, chain: Vec<String> },
    /// An ingredient recipe that references one of its own ancestors.
    CyclicRecipe { item: String, chain: Vec<String> },
}

impl Diagnostic {
    /// Blocking diagnostics prevent the run from producing merged output.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Diagnostic::MissingEntry { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingRecipe { item } => write!(f, "missing recipe: {item}"),
            Diagnostic::SuspiciousMissingRecipe { item, source } => {
                write!(f, "suspicious missing recipe: {item} ({source})")
            }
            Diagnostic::MissingEntry { item, chain } => {
                write!(f, "missing entry: {item}: {}", chain.join("->"))
            }
            Diagnostic::CyclicRecipe { item, chain } => {
                write!(f, "cyclic recipe: {item}: {}", chain.join("->"))
            }
        }
    }
}

/// Deduplicating accumulator for [`Diagnostic`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    /// Record a diagnostic, dropping exact duplicates.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if !self.entries.contains(&diagnostic) {
            self.entries.push(diagnostic);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn has_blocking(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_blocking)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn merge(&mut self, other: Diagnostics) {
        for diagnostic in other.entries {
            self.push(diagnostic);
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.entries {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Missing-recipe audit
// ---------------------------------------------------------------------------

/// Configures which missing recipes count as suspicious.
#[derive(Debug, Clone, Default)]
pub struct AuditConfig {
    /// Source tags whose recipes tend to be dense multi-ingredient batches.
    pub suspicious_sources: HashSet<String>,
    /// Items known to have unusual yields, flagged regardless of source.
    pub weird_yield_items: HashSet<String>,
}

impl AuditConfig {
    pub fn new<S, W>(suspicious_sources: S, weird_yield_items: W) -> AuditConfig
    where
        S: IntoIterator<Item = String>,
        W: IntoIterator<Item = String>,
    {
        AuditConfig {
            suspicious_sources: suspicious_sources.into_iter().collect(),
            weird_yield_items: weird_yield_items.into_iter().map(|i| i.to_lowercase()).collect(),
        }
    }
}

/// Flag craft items with no recipe whose aggregated demand spans multiple
/// lists and whose provenance suggests a batch recipe. A missing recipe on a
/// single list stays quiet here; if the ingredient tree actually reaches it,
/// the traversal reports it as a plain [`Diagnostic::MissingRecipe`].
pub fn audit_missing_recipes(
    aggregated: &AggregatedRequirements,
    recipes: &RecipeStore,
    config: &AuditConfig,
) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    for req in aggregated.iter() {
        if !req.kind.is_craft() || recipes.lookup(&req.item).is_some() {
            continue;
        }
        let multi_list = req.per_list.len() > 1;
        let suspicious_source = config.suspicious_sources.contains(&req.source);
        let weird_yield = config.weird_yield_items.contains(&req.item);
        if multi_list && (suspicious_source || weird_yield) {
            diagnostics.push(Diagnostic::SuspiciousMissingRecipe {
                item: req.item.clone(),
                source: req.source.clone(),
            });
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::entry::{CraftingList, RequirementEntry};
    use crate::list_id::ListId;
    use crate::recipe::{DuplicatePolicy, Recipe, RecipeStore};

    fn single_entry_list(id: &str, item: &str, amount: u32, tag: &str, source: &str) -> CraftingList {
        let list_id = ListId::parse(id).unwrap();
        let entry = RequirementEntry::new(item, amount, tag, source, list_id.clone(), false);
        CraftingList::new(list_id, false, vec![entry])
    }

    #[test]
    fn push_deduplicates() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::MissingRecipe {
            item: "potion".to_string(),
        });
        diagnostics.push(Diagnostic::MissingRecipe {
            item: "potion".to_string(),
        });
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn missing_entry_is_not_blocking() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::MissingEntry {
            item: "herb".to_string(),
            chain: vec!["potion".to_string()],
        });
        assert!(!diagnostics.has_blocking());
        diagnostics.push(Diagnostic::MissingRecipe {
            item: "potion".to_string(),
        });
        assert!(diagnostics.has_blocking());
    }

    #[test]
    fn audit_flags_multi_list_suspicious_source() {
        let lists = vec![
            single_entry_list("ARR1", "glue", 2, "craft", "Alchemist"),
            single_entry_list("ARR2", "glue", 3, "craft", "Alchemist"),
        ];
        let agg = aggregate(&lists);
        let recipes = RecipeStore::new();
        let config = AuditConfig::new(vec!["Alchemist".to_string()], vec![]);
        let diagnostics = audit_missing_recipes(&agg, &recipes, &config);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.has_blocking());
    }

    #[test]
    fn audit_flags_weird_yield_allow_list() {
        let lists = vec![
            single_entry_list("ARR1", "Growth Formula", 2, "craft", "Botanist"),
            single_entry_list("ARR2", "Growth Formula", 1, "craft", "Botanist"),
        ];
        let agg = aggregate(&lists);
        let recipes = RecipeStore::new();
        let config = AuditConfig::new(vec![], vec!["growth formula".to_string()]);
        let diagnostics = audit_missing_recipes(&agg, &recipes, &config);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn audit_ignores_single_list_items() {
        let lists = vec![single_entry_list("ARR1", "glue", 2, "craft", "Alchemist")];
        let agg = aggregate(&lists);
        let recipes = RecipeStore::new();
        let config = AuditConfig::new(vec!["Alchemist".to_string()], vec![]);
        assert!(audit_missing_recipes(&agg, &recipes, &config).is_empty());
    }

    #[test]
    fn audit_ignores_items_with_recipes() {
        let lists = vec![
            single_entry_list("ARR1", "glue", 2, "craft", "Alchemist"),
            single_entry_list("ARR2", "glue", 3, "craft", "Alchemist"),
        ];
        let agg = aggregate(&lists);
        let recipes = RecipeStore::from_recipes(
            vec![Recipe::new("glue", 1, vec![])],
            DuplicatePolicy::LastWins,
        )
        .unwrap();
        let config = AuditConfig::new(vec!["Alchemist".to_string()], vec![]);
        assert!(audit_missing_recipes(&agg, &recipes, &config).is_empty());
    }

    #[test]
    fn audit_ignores_non_craft_items() {
        let lists = vec![
            single_entry_list("ARR1", "ore", 2, "node", "mining"),
            single_entry_list("ARR2", "ore", 3, "node", "mining"),
        ];
        let agg = aggregate(&lists);
        let recipes = RecipeStore::new();
        let config = AuditConfig::new(vec!["mining".to_string()], vec![]);
        assert!(audit_missing_recipes(&agg, &recipes, &config).is_empty());
    }
}
