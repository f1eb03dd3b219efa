//! Data-quality findings collected during a reconciliation run.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::forces::ForceDirection;
use crate::normalize::ElementId;
use crate::tables::TableKind;

/// A requested output case with no usable force sample for a pile.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MissingForce {
    /// Pile lacking the force.
    pub element_id: ElementId,
    /// Case that had no sample.
    pub output_case: String,
}

/// A section and load direction whose capacity was replaced by `1.0`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CapacityGap {
    /// Section label without a usable capacity.
    pub section_label: String,
    /// Direction whose capacity was substituted.
    pub direction: ForceDirection,
}

/// Non-fatal findings returned alongside the results.
///
/// Every element or case that is left out of the output is accounted for here,
/// so a missing pile is never mistaken for a safe one.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Rows dropped because their identifier did not resolve to an integer.
    pub dropped_rows: BTreeMap<TableKind, usize>,
    /// Rows ignored because an earlier row had the same key.
    pub duplicate_rows: BTreeMap<TableKind, usize>,
    /// Force rows without a numeric station or force.
    pub invalid_samples: usize,
    /// Assigned elements without a connectivity row.
    pub missing_connectivity: Vec<ElementId>,
    /// Connectivity rows without a section assignment.
    pub unassigned_elements: Vec<ElementId>,
    /// Elements whose head could not be located; excluded from the output.
    pub unresolved_geometry: Vec<ElementId>,
    /// Selected cases that appear nowhere in the force table.
    pub unknown_cases: Vec<String>,
    /// Selected `(element, case)` pairs without a head force.
    pub missing_forces: Vec<MissingForce>,
    /// Piles without a force in any selected case; excluded from the output.
    pub unloaded_piles: Vec<ElementId>,
    /// Capacities substituted with `1.0`.
    pub capacity_gaps: BTreeSet<CapacityGap>,
}

impl Diagnostics {
    /// Return `true` when nothing was dropped, excluded or substituted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dropped_rows.values().all(|n| *n == 0)
            && self.duplicate_rows.values().all(|n| *n == 0)
            && self.invalid_samples == 0
            && self.missing_connectivity.is_empty()
            && self.unassigned_elements.is_empty()
            && self.unresolved_geometry.is_empty()
            && self.unknown_cases.is_empty()
            && self.missing_forces.is_empty()
            && self.unloaded_piles.is_empty()
            && self.capacity_gaps.is_empty()
    }

    /// Number of dropped rows recorded for `table`.
    #[must_use]
    pub fn dropped(&self, table: TableKind) -> usize {
        self.dropped_rows.get(&table).copied().unwrap_or(0)
    }

    /// Number of duplicate rows recorded for `table`.
    #[must_use]
    pub fn duplicates(&self, table: TableKind) -> usize {
        self.duplicate_rows.get(&table).copied().unwrap_or(0)
    }

    /// Record one row dropped from `table`.
    pub(crate) fn record_dropped(&mut self, table: TableKind) {
        *self.dropped_rows.entry(table).or_insert(0) += 1;
    }

    /// Record one duplicate row in `table`.
    pub(crate) fn record_duplicate(&mut self, table: TableKind) {
        *self.duplicate_rows.entry(table).or_insert(0) += 1;
    }
}

/// Join element identifiers for display.
fn join_ids(ids: &[ElementId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "No data-quality issues.");
        }
        for (table, count) in self.dropped_rows.iter().filter(|(_, n)| **n > 0) {
            writeln!(f, "{count} row(s) of `{table}` dropped: identifier is not an integer")?;
        }
        for (table, count) in self.duplicate_rows.iter().filter(|(_, n)| **n > 0) {
            writeln!(f, "{count} duplicate row(s) of `{table}` ignored")?;
        }
        if self.invalid_samples > 0 {
            writeln!(
                f,
                "{} force sample(s) skipped: station or force is not numeric",
                self.invalid_samples
            )?;
        }
        if !self.missing_connectivity.is_empty() {
            writeln!(
                f,
                "No connectivity for element(s): {}",
                join_ids(&self.missing_connectivity)
            )?;
        }
        if !self.unassigned_elements.is_empty() {
            writeln!(
                f,
                "No section assignment for element(s): {}",
                join_ids(&self.unassigned_elements)
            )?;
        }
        if !self.unresolved_geometry.is_empty() {
            writeln!(
                f,
                "Excluded, head position unresolved: {}",
                join_ids(&self.unresolved_geometry)
            )?;
        }
        if !self.unknown_cases.is_empty() {
            writeln!(
                f,
                "Selected case(s) not found in forces: {}",
                self.unknown_cases.join(", ")
            )?;
        }
        for missing in &self.missing_forces {
            writeln!(
                f,
                "No force for element {} in case `{}`",
                missing.element_id, missing.output_case
            )?;
        }
        if !self.unloaded_piles.is_empty() {
            writeln!(
                f,
                "Excluded, no force in any selected case: {}",
                join_ids(&self.unloaded_piles)
            )?;
        }
        for gap in &self.capacity_gaps {
            writeln!(
                f,
                "No {} capacity for section `{}`; 1.0 used",
                gap.direction, gap.section_label
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_clean() {
        let diagnostics = Diagnostics::default();
        assert!(diagnostics.is_clean());
        assert_eq!(diagnostics.to_string(), "No data-quality issues.\n");
    }

    #[test]
    fn counts_accumulate_per_table() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record_dropped(TableKind::Forces);
        diagnostics.record_dropped(TableKind::Forces);
        diagnostics.record_duplicate(TableKind::Points);
        assert_eq!(diagnostics.dropped(TableKind::Forces), 2);
        assert_eq!(diagnostics.dropped(TableKind::Points), 0);
        assert_eq!(diagnostics.duplicates(TableKind::Points), 1);
        assert!(!diagnostics.is_clean());
    }

    #[test]
    fn summary_names_excluded_piles() {
        let diagnostics = Diagnostics {
            unresolved_geometry: vec![ElementId(7), ElementId(9)],
            capacity_gaps: [CapacityGap {
                section_label: "P60".into(),
                direction: ForceDirection::Tension,
            }]
            .into_iter()
            .collect(),
            ..Diagnostics::default()
        };
        let text = diagnostics.to_string();
        assert!(text.contains("head position unresolved: 7, 9"));
        assert!(text.contains("No tension capacity for section `P60`"));
    }

    #[test]
    fn serializes_table_keys_by_name() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record_dropped(TableKind::Connectivity);
        let json = serde_json::to_value(&diagnostics).expect("diagnostics serialize");
        assert_eq!(json["dropped_rows"]["connectivity"], 1);
    }
}
