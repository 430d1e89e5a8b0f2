//! Quality moves: shifting demand from a high-quality requirement down to
//! its normal-quality counterpart.
//!
//! Some of a high-quality sub-list's amounts can be crafted or bought at
//! normal quality instead. A move reduces the `"<name> hq"` entry's total
//! and grows the plain entry's total by the same amount. Quantity the
//! high-quality entry had already covered beyond its shrunken total spills
//! into the normal-quality entry's current. A craftable normal-quality
//! entry is never auto-completed by spillover alone; it stays one unit
//! short so the craft still shows up as outstanding.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::engine::RequirementSet;
use crate::entry::CraftingList;
use std::fmt;

/// One applied demand move, with before/after state for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityMove {
    pub hq_item: String,
    pub nq_item: String,
    /// Amount moved, capped at the high-quality entry's total.
    pub amount: u32,
    /// Covered quantity displaced from the high-quality entry.
    pub spillover: u32,
    pub hq_before: (u32, u32),
    pub hq_after: (u32, u32),
    pub nq_before: (u32, u32),
    pub nq_after: (u32, u32),
    /// The normal-quality entry was held one short of completion.
    pub held_short: bool,
}

impl fmt::Display for QualityMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lowered {} | {} ({}/{}) -> ({}/{}); {} ({}/{}) -> ({}/{})",
            self.hq_item,
            self.amount,
            self.hq_before.0,
            self.hq_before.1,
            self.hq_after.0,
            self.hq_after.1,
            self.nq_item,
            self.nq_before.0,
            self.nq_before.1,
            self.nq_after.0,
            self.nq_after.1,
        )?;
        if self.held_short {
            write!(f, " [held short]")?;
        }
        Ok(())
    }
}

/// Everything one lowering pass produced.
#[derive(Debug, Clone, Default)]
pub struct QualityReport {
    pub moves: Vec<QualityMove>,
    pub diagnostics: Diagnostics,
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for quality_move in &self.moves {
            writeln!(f, "{quality_move}")?;
        }
        write!(f, "{}", self.diagnostics)
    }
}

/// Move a high-quality sub-list's amounts down to normal quality.
///
/// Each sub-list entry must match a tracked high-quality requirement;
/// misses are reported as [`Diagnostic::MissingEntry`] and skipped. The
/// normal-quality entry is created at the front of the set when absent, so
/// it lands next to the requirements it was split from.
pub fn lower_quality(requirements: &mut RequirementSet, sub: &CraftingList) -> QualityReport {
    let mut report = QualityReport::default();

    for entry in &sub.entries {
        if entry.amount == 0 {
            continue;
        }
        let Some(hq) = requirements.get_mut(&entry.item) else {
            report.diagnostics.push(Diagnostic::MissingEntry {
                item: entry.item.clone(),
                chain: Vec::new(),
            });
            continue;
        };

        let hq_item = hq.name.clone();
        let nq_item = hq_item
            .strip_suffix(" hq")
            .unwrap_or(hq_item.as_str())
            .to_string();
        let hq_before = (hq.current, hq.total);
        let hq_kind = hq.kind;
        let amount = entry.amount.min(hq.total);
        let spillover = (amount + hq.current).saturating_sub(hq.total);

        hq.total -= amount;
        hq.current = hq.current.min(hq.total);
        hq.outstanding = hq.current < hq.total;
        let hq_after = (hq.current, hq.total);

        if !requirements.contains(&nq_item) {
            requirements.insert_front(&nq_item, 0, 0, hq_kind);
        }
        let Some(nq) = requirements.get_mut(&nq_item) else {
            continue;
        };
        let nq_before = (nq.current, nq.total);
        nq.total += amount;
        let held_short = nq.kind.is_craft() && nq.current + spillover >= nq.total;
        if held_short {
            nq.current = nq.total.saturating_sub(1);
        } else {
            nq.current += spillover;
        }
        nq.outstanding = nq.current < nq.total;
        let nq_after = (nq.current, nq.total);

        report.moves.push(QualityMove {
            hq_item,
            nq_item,
            amount,
            spillover,
            hq_before,
            hq_after,
            nq_before,
            nq_after,
            held_short,
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{RequirementEntry, RequirementKind};
    use crate::list_id::ListId;

    fn hq_sublist(entries: &[(&str, u32)]) -> CraftingList {
        let id = ListId::parse("HWa1").unwrap();
        let entries = entries
            .iter()
            .map(|&(item, amount)| {
                RequirementEntry::new(item, amount, "craft", "Weaver", id.clone(), true)
            })
            .collect();
        CraftingList::new(id, true, entries)
    }

    #[test]
    fn moves_demand_from_hq_to_nq() {
        let mut requirements = RequirementSet::new();
        requirements.insert("velvet hq", 2, 8, RequirementKind::Gather);
        requirements.insert("velvet", 0, 3, RequirementKind::Gather);

        let report = lower_quality(&mut requirements, &hq_sublist(&[("velvet", 5)]));

        let hq = requirements.get("velvet hq").unwrap();
        assert_eq!((hq.current, hq.total), (2, 3));
        let nq = requirements.get("velvet").unwrap();
        assert_eq!((nq.current, nq.total), (0, 8));
        assert_eq!(report.moves.len(), 1);
        assert_eq!(report.moves[0].amount, 5);
        assert_eq!(report.moves[0].spillover, 0);
    }

    #[test]
    fn spillover_carries_covered_quantity_down() {
        // Moving 6 leaves the hq total at 2 but 4 were already covered;
        // the extra 2 covered units land on the nq entry.
        let mut requirements = RequirementSet::new();
        requirements.insert("velvet hq", 4, 8, RequirementKind::Gather);
        requirements.insert("velvet", 1, 3, RequirementKind::Gather);

        let report = lower_quality(&mut requirements, &hq_sublist(&[("velvet", 6)]));

        let hq = requirements.get("velvet hq").unwrap();
        assert_eq!((hq.current, hq.total), (2, 2));
        assert!(!hq.outstanding);
        let nq = requirements.get("velvet").unwrap();
        assert_eq!((nq.current, nq.total), (3, 9));
        assert_eq!(report.moves[0].spillover, 2);
    }

    #[test]
    fn missing_nq_entry_is_created_at_the_front() {
        let mut requirements = RequirementSet::new();
        requirements.insert("herb", 0, 4, RequirementKind::Gather);
        requirements.insert("velvet hq", 0, 8, RequirementKind::Gather);

        lower_quality(&mut requirements, &hq_sublist(&[("velvet", 5)]));

        let order: Vec<&str> = requirements.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(order, ["velvet", "herb", "velvet hq"]);
        let nq = requirements.get("velvet").unwrap();
        assert_eq!((nq.current, nq.total), (0, 5));
    }

    #[test]
    fn craft_nq_entry_is_held_one_short() {
        // Spillover would complete the craftable nq entry; it is held at
        // total - 1 so the craft stays visible.
        let mut requirements = RequirementSet::new();
        requirements.insert("potion hq", 5, 5, RequirementKind::Craft);
        requirements.insert("potion", 0, 0, RequirementKind::Craft);

        let report = lower_quality(&mut requirements, &hq_sublist(&[("potion", 5)]));

        let nq = requirements.get("potion").unwrap();
        assert_eq!((nq.current, nq.total), (4, 5));
        assert!(nq.outstanding);
        assert!(report.moves[0].held_short);
    }

    #[test]
    fn gather_nq_entry_may_complete() {
        let mut requirements = RequirementSet::new();
        requirements.insert("ore hq", 5, 5, RequirementKind::Gather);

        lower_quality(&mut requirements, &hq_sublist(&[("ore", 5)]));

        let nq = requirements.get("ore").unwrap();
        assert_eq!((nq.current, nq.total), (5, 5));
        assert!(!nq.outstanding);
    }

    #[test]
    fn amount_is_capped_at_hq_total() {
        let mut requirements = RequirementSet::new();
        requirements.insert("velvet hq", 0, 3, RequirementKind::Gather);

        let report = lower_quality(&mut requirements, &hq_sublist(&[("velvet", 10)]));

        assert_eq!(report.moves[0].amount, 3);
        let hq = requirements.get("velvet hq").unwrap();
        assert_eq!(hq.total, 0);
        assert_eq!(requirements.get("velvet").unwrap().total, 3);
    }

    #[test]
    fn missing_hq_entry_is_diagnosed_and_skipped() {
        let mut requirements = RequirementSet::new();
        let report = lower_quality(&mut requirements, &hq_sublist(&[("velvet", 5)]));
        assert!(report.moves.is_empty());
        assert!(report.diagnostics.iter().any(|d| matches!(
            d,
            Diagnostic::MissingEntry { item, .. } if item == "velvet hq"
        )));
        assert!(requirements.is_empty());
    }

    #[test]
    fn move_display() {
        let quality_move = QualityMove {
            hq_item: "velvet hq".to_string(),
            nq_item: "velvet".to_string(),
            amount: 5,
            spillover: 0,
            hq_before: (2, 8),
            hq_after: (2, 3),
            nq_before: (0, 3),
            nq_after: (0, 8),
            held_short: false,
        };
        assert_eq!(
            quality_move.to_string(),
            "lowered velvet hq | 5 (2/8) -> (2/3); velvet (0/3) -> (0/8)"
        );
    }
}
