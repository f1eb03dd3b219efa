//! End-to-end reconciliation of the exported tables.

use std::collections::{BTreeMap, BTreeSet};

use log::info;
use serde::Serialize;

use crate::classify::{Status, Thresholds};
use crate::config::CheckConfig;
use crate::coordinates::{resolve_coordinates, ResolvedPile};
use crate::diagnostics::Diagnostics;
use crate::envelope::{envelope, GoverningForce};
use crate::errors::ReconcileError;
use crate::forces::{extract_head_forces, HeadForces, StationMatch};
use crate::normalize::{ElementId, NormalizedTables};
use crate::tables::{ColumnSchema, InputTables};

/// Result row for one pile.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PileRecord {
    /// Element identifier.
    pub element_id: ElementId,
    /// Section property label.
    pub section_label: String,
    /// Human-facing label, when the export has one.
    pub display_label: Option<String>,
    /// Plan X of the pile head.
    pub x: f64,
    /// Plan Y of the pile head.
    pub y: f64,
    /// Case with the largest ratio.
    pub governing_case: String,
    /// Signed axial force in the governing case.
    pub axial_force: f64,
    /// Whether the governing force is tension.
    pub is_tension: bool,
    /// Magnitude of the governing force.
    pub load: f64,
    /// Capacity the ratio was computed against.
    pub capacity: f64,
    /// Whether the capacity was substituted with `1.0`.
    pub capacity_substituted: bool,
    /// How the head force was matched to the head station.
    pub station_match: StationMatch,
    /// `load / capacity`.
    pub ratio: f64,
    /// Classification of the ratio.
    pub status: Status,
}

impl PileRecord {
    /// Build a record from a pile and its governing force.
    fn new(pile: &ResolvedPile, governing: GoverningForce, thresholds: &Thresholds) -> Self {
        Self {
            element_id: pile.element_id,
            section_label: pile.section_label.clone(),
            display_label: pile.display_label.clone(),
            x: pile.plan.x,
            y: pile.plan.y,
            governing_case: governing.output_case,
            axial_force: governing.head.axial_force,
            is_tension: governing.head.axial_force > 0.0,
            load: governing.head.magnitude(),
            capacity: governing.capacity.value,
            capacity_substituted: governing.capacity.substituted,
            station_match: governing.head.matched,
            ratio: governing.ratio,
            status: thresholds.classify(governing.ratio),
        }
    }
}

/// Results of one evaluation, with everything that was left out.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Assessment {
    /// One record per rated pile, ordered by element id.
    pub records: Vec<PileRecord>,
    /// Data-quality findings from every stage.
    pub diagnostics: Diagnostics,
}

impl Assessment {
    /// Records ordered by ratio, highest first; equal ratios by element id.
    #[must_use]
    pub fn by_ratio_descending(&self) -> Vec<&PileRecord> {
        let mut records: Vec<&PileRecord> = self.records.iter().collect();
        records.sort_by(|a, b| {
            b.ratio
                .total_cmp(&a.ratio)
                .then_with(|| a.element_id.cmp(&b.element_id))
        });
        records
    }

    /// Number of records per status, including statuses with no records.
    #[must_use]
    pub fn status_counts(&self) -> BTreeMap<Status, usize> {
        let mut counts: BTreeMap<Status, usize> =
            Status::ALL.iter().map(|status| (*status, 0)).collect();
        for record in &self.records {
            *counts.entry(record.status).or_insert(0) += 1;
        }
        counts
    }
}

/// Geometry and head forces resolved once from a model export.
///
/// Building a reconciliation does the joins and station matching; each call
/// to [`evaluate`](Self::evaluate) then only rates and classifies, so the
/// same model can be checked against many configurations.
///
/// # Examples
/// ```
/// use pilecheck::{CheckConfig, ColumnSchema, InputTables, RawTable, Reconciliation, Status};
///
/// let tables = InputTables {
///     sections: RawTable::new(["UniqueName", "Section Property"])
///         .with_row(vec![1.into(), "sec1".into()]),
///     connectivity: RawTable::new(["Unique Name", "UniquePtI", "UniquePtJ", "Length"])
///         .with_row(vec![1.into(), 10.into(), 11.into(), 12.0.into()]),
///     points: RawTable::new(["UniqueName", "X", "Y", "Z"])
///         .with_row(vec![10.into(), 4.0.into(), 2.0.into(), (-12.0).into()])
///         .with_row(vec![11.into(), 4.0.into(), 2.0.into(), 0.0.into()]),
///     forces: RawTable::new(["Unique Name", "Output Case", "Station", "P"])
///         .with_row(vec![1.into(), "DL".into(), 12.0.into(), (-450.0).into()]),
/// };
/// let reconciliation = Reconciliation::from_tables(&tables, &ColumnSchema::default())?;
/// let config = CheckConfig::for_cases(["DL"]).with_capacity("sec1", 50.0, 500.0);
/// let assessment = reconciliation.evaluate(&config)?;
///
/// let record = &assessment.records[0];
/// assert_eq!((record.x, record.y), (4.0, 2.0));
/// assert_eq!(record.status, Status::Warning);
/// # Ok::<(), pilecheck::ReconcileError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Reconciliation {
    /// Piles whose head was located, ordered by element id.
    piles: Vec<ResolvedPile>,
    /// Head force per pile and case.
    forces: HeadForces,
    /// Findings from normalization, coordinate resolution and extraction.
    diagnostics: Diagnostics,
}

impl Reconciliation {
    /// Normalize the tables, locate every pile head and read its forces.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::MissingColumn`] when a sheet lacks a column
    /// the schema requires.
    pub fn from_tables(
        tables: &InputTables,
        schema: &ColumnSchema,
    ) -> Result<Self, ReconcileError> {
        let mut diagnostics = Diagnostics::default();
        let normalized = NormalizedTables::from_raw(tables, schema, &mut diagnostics)?;
        let piles = resolve_coordinates(&normalized, &mut diagnostics);
        let forces = extract_head_forces(&piles, &normalized.forces, &mut diagnostics);
        Ok(Self {
            piles,
            forces,
            diagnostics,
        })
    }

    /// Piles whose head was located.
    #[must_use]
    pub fn piles(&self) -> &[ResolvedPile] {
        &self.piles
    }

    /// Head forces of the located piles.
    #[must_use]
    pub fn head_forces(&self) -> &HeadForces {
        &self.forces
    }

    /// Findings gathered before any configuration was applied.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Distinct section labels of the located piles, for capacity entry.
    #[must_use]
    pub fn sections(&self) -> BTreeSet<&str> {
        self.piles
            .iter()
            .map(|pile| pile.section_label.as_str())
            .collect()
    }

    /// Distinct output cases in the force table, for case selection.
    #[must_use]
    pub fn output_cases(&self) -> Vec<&str> {
        self.forces.cases().collect()
    }

    /// Envelope the selected cases and classify every pile.
    ///
    /// Never mutates the reconciliation; repeated calls with the same
    /// configuration give identical results.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::EmptyCaseSelection`] when no case is
    /// selected and [`ReconcileError::InvalidThreshold`] when a threshold is
    /// not finite.
    pub fn evaluate(&self, config: &CheckConfig) -> Result<Assessment, ReconcileError> {
        let cases = config.case_selection()?;
        let thresholds = config.thresholds()?;

        let mut diagnostics = self.diagnostics.clone();
        let records: Vec<PileRecord> =
            envelope(&self.piles, &self.forces, &cases, config, &mut diagnostics)
                .into_iter()
                .map(|(pile, governing)| PileRecord::new(pile, governing, &thresholds))
                .collect();

        let assessment = Assessment {
            records,
            diagnostics,
        };
        let counts = assessment.status_counts();
        info!(
            "rated {} piles: {} safe, {} warning, {} overloaded",
            assessment.records.len(),
            counts[&Status::Safe],
            counts[&Status::Warning],
            counts[&Status::OverLoad]
        );
        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::RawTable;

    fn tables() -> InputTables {
        InputTables {
            sections: RawTable::new(["UniqueName", "Section Property"])
                .with_row(vec![1.into(), "sec1".into()])
                .with_row(vec![2.into(), "sec1".into()])
                .with_row(vec![3.into(), "sec2".into()]),
            connectivity: RawTable::new(["Unique Name", "UniquePtI", "UniquePtJ", "Length"])
                .with_row(vec![1.into(), 10.into(), 11.into(), 12.0.into()])
                .with_row(vec![2.into(), 20.into(), 21.into(), 12.0.into()])
                .with_row(vec![3.into(), 30.into(), 31.into(), 12.0.into()]),
            points: RawTable::new(["UniqueName", "X", "Y", "Z"])
                .with_row(vec![10.into(), 0.0.into(), 0.0.into(), (-12.0).into()])
                .with_row(vec![11.into(), 0.0.into(), 0.0.into(), 0.0.into()])
                .with_row(vec![20.into(), 3.0.into(), 0.0.into(), (-12.0).into()])
                .with_row(vec![21.into(), 3.0.into(), 0.0.into(), 0.0.into()]),
            forces: RawTable::new(["Unique Name", "Output Case", "Station", "P"])
                .with_row(vec![1.into(), "DL".into(), 12.0.into(), (-450.0).into()])
                .with_row(vec![2.into(), "DL".into(), 12.0.into(), (-100.0).into()])
                .with_row(vec![2.into(), "WL".into(), 12.0.into(), 60.0.into()]),
        }
    }

    #[test]
    fn evaluation_is_repeatable() {
        let reconciliation =
            Reconciliation::from_tables(&tables(), &ColumnSchema::default()).expect("schema");
        let config = CheckConfig::for_cases(["DL", "WL"]).with_capacity("sec1", 50.0, 500.0);
        let first = reconciliation.evaluate(&config).expect("valid config");
        let second = reconciliation.evaluate(&config).expect("valid config");
        assert_eq!(first, second);
        assert_eq!(reconciliation.diagnostics().missing_forces.len(), 0);
    }

    #[test]
    fn thresholds_only_change_labels() {
        let reconciliation =
            Reconciliation::from_tables(&tables(), &ColumnSchema::default()).expect("schema");
        let config = CheckConfig::for_cases(["DL", "WL"]).with_capacity("sec1", 50.0, 500.0);
        let strict = reconciliation
            .evaluate(&config.clone().with_thresholds(0.5, 0.8))
            .expect("valid config");
        let lenient = reconciliation.evaluate(&config).expect("valid config");
        for (a, b) in strict.records.iter().zip(&lenient.records) {
            assert_eq!(a.governing_case, b.governing_case);
            assert_eq!(a.ratio, b.ratio);
        }
        assert_eq!(strict.records[0].status, Status::OverLoad);
        assert_eq!(lenient.records[0].status, Status::Warning);
    }

    #[test]
    fn lists_sections_and_cases() {
        let reconciliation =
            Reconciliation::from_tables(&tables(), &ColumnSchema::default()).expect("schema");
        assert_eq!(reconciliation.sections().into_iter().collect::<Vec<_>>(), ["sec1"]);
        assert_eq!(reconciliation.output_cases(), ["DL", "WL"]);
        assert_eq!(reconciliation.diagnostics().unresolved_geometry, vec![ElementId(3)]);
    }

    #[test]
    fn orders_by_ratio_and_counts_statuses() {
        let reconciliation =
            Reconciliation::from_tables(&tables(), &ColumnSchema::default()).expect("schema");
        let config = CheckConfig::for_cases(["DL", "WL"]).with_capacity("sec1", 50.0, 500.0);
        let assessment = reconciliation.evaluate(&config).expect("valid config");

        let ordered: Vec<_> = assessment
            .by_ratio_descending()
            .iter()
            .map(|r| r.element_id)
            .collect();
        assert_eq!(ordered, [ElementId(2), ElementId(1)]);
        let record = &assessment.records[1];
        assert_eq!(record.governing_case, "WL");
        assert!(record.is_tension);

        let counts = assessment.status_counts();
        assert_eq!(counts[&Status::OverLoad], 1);
        assert_eq!(counts[&Status::Warning], 1);
        assert_eq!(counts[&Status::Safe], 0);
    }

    #[test]
    fn refuses_empty_case_selection() {
        let reconciliation =
            Reconciliation::from_tables(&tables(), &ColumnSchema::default()).expect("schema");
        assert_eq!(
            reconciliation.evaluate(&CheckConfig::default()),
            Err(ReconcileError::EmptyCaseSelection)
        );
    }
}
