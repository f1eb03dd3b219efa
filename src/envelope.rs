//! Envelope selector: the governing case of each pile.
//!
//! Every selected case is rated against the capacity for its own direction,
//! so a modest uplift can govern over a larger compression.

use log::{debug, warn};

use crate::classify::load_ratio;
use crate::config::{CapacityLookup, CaseSelection, CheckConfig};
use crate::coordinates::ResolvedPile;
use crate::diagnostics::{CapacityGap, Diagnostics, MissingForce};
use crate::forces::{HeadForce, HeadForces};

/// The worst selected case of one pile.
#[derive(Clone, Debug, PartialEq)]
pub struct GoverningForce {
    /// Case with the largest ratio.
    pub output_case: String,
    /// Head force in that case.
    pub head: HeadForce,
    /// Capacity the ratio was computed against.
    pub capacity: CapacityLookup,
    /// `|axial force| / capacity`.
    pub ratio: f64,
}

/// Rate one head force against the configured capacity.
fn rate(
    pile: &ResolvedPile,
    output_case: &str,
    head: &HeadForce,
    config: &CheckConfig,
) -> GoverningForce {
    let capacity = config.capacity_for(&pile.section_label, head.direction());
    GoverningForce {
        output_case: output_case.to_string(),
        head: *head,
        capacity,
        ratio: load_ratio(head.axial_force, capacity.value),
    }
}

/// Select the governing case of `pile` among the selected cases.
///
/// The largest ratio wins; on equal ratios the case selected first wins.
/// Returns `None` when the pile has no head force in any selected case.
#[must_use]
pub fn select_governing(
    pile: &ResolvedPile,
    forces: &HeadForces,
    cases: &CaseSelection,
    config: &CheckConfig,
) -> Option<GoverningForce> {
    cases
        .iter()
        .filter_map(|case| {
            forces
                .get(pile.element_id, case)
                .map(|head| rate(pile, case, head, config))
        })
        .fold(None, |best: Option<GoverningForce>, candidate| match best {
            Some(best) if candidate.ratio <= best.ratio => Some(best),
            _ => Some(candidate),
        })
}

/// Select the governing case of every pile.
///
/// Piles with no force in any selected case are left out. Missing pairs,
/// unknown cases and substituted capacities are added to `diagnostics`.
pub fn envelope<'a>(
    piles: &'a [ResolvedPile],
    forces: &HeadForces,
    cases: &CaseSelection,
    config: &CheckConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<(&'a ResolvedPile, GoverningForce)> {
    diagnostics.unknown_cases.extend(
        cases
            .iter()
            .filter(|case| !forces.has_case(case))
            .map(str::to_string),
    );
    if !diagnostics.unknown_cases.is_empty() {
        warn!(
            "selected case(s) not present in the force table: {}",
            diagnostics.unknown_cases.join(", ")
        );
    }

    let mut governing = Vec::with_capacity(piles.len());
    for pile in piles {
        for case in cases.iter() {
            match forces.get(pile.element_id, case) {
                Some(head) => {
                    if config.capacity_for(&pile.section_label, head.direction()).substituted {
                        diagnostics.capacity_gaps.insert(CapacityGap {
                            section_label: pile.section_label.clone(),
                            direction: head.direction(),
                        });
                    }
                }
                None => diagnostics.missing_forces.push(MissingForce {
                    element_id: pile.element_id,
                    output_case: case.to_string(),
                }),
            }
        }
        match select_governing(pile, forces, cases, config) {
            Some(selected) => governing.push((pile, selected)),
            None => diagnostics.unloaded_piles.push(pile.element_id),
        }
    }

    if !diagnostics.unloaded_piles.is_empty() {
        warn!(
            "{} pile(s) excluded: no force in any selected case",
            diagnostics.unloaded_piles.len()
        );
    }
    for gap in &diagnostics.capacity_gaps {
        warn!(
            "no {} capacity for section `{}`, using 1.0",
            gap.direction, gap.section_label
        );
    }
    debug!(
        "enveloped {} piles over {} case(s)",
        governing.len(),
        cases.len()
    );
    governing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forces::{extract_head_forces, ForceDirection};
    use crate::geometry::{Endpoint, PlanPoint};
    use crate::normalize::{ElementId, ForceSample};

    fn pile(id: i64) -> ResolvedPile {
        ResolvedPile {
            element_id: ElementId(id),
            section_label: "sec1".into(),
            display_label: None,
            plan: PlanPoint::new(0.0, 0.0),
            head: Endpoint::I,
            head_elevation: 0.0,
            length: Some(10.0),
        }
    }

    fn head_sample(id: i64, case: &str, force: f64) -> ForceSample {
        ForceSample {
            element_id: ElementId(id),
            output_case: case.into(),
            station: Some(0.0),
            axial_force: Some(force),
        }
    }

    fn forces_for(piles: &[ResolvedPile], samples: &[ForceSample]) -> HeadForces {
        extract_head_forces(piles, samples, &mut Diagnostics::default())
    }

    #[test]
    fn uplift_governs_over_larger_compression() {
        let piles = [pile(1)];
        let forces = forces_for(
            &piles,
            &[head_sample(1, "A", -450.0), head_sample(1, "B", 60.0)],
        );
        let config = CheckConfig::for_cases(["A", "B"]).with_capacity("sec1", 50.0, 500.0);
        let cases = config.case_selection().expect("cases selected");
        let selected = select_governing(&piles[0], &forces, &cases, &config).expect("forces exist");
        assert_eq!(selected.output_case, "B");
        assert_eq!(selected.head.direction(), ForceDirection::Tension);
        assert!((selected.ratio - 1.2).abs() < 1.0e-12);
    }

    #[test]
    fn ties_resolve_to_selection_order() {
        let piles = [pile(1)];
        let forces = forces_for(
            &piles,
            &[head_sample(1, "A", -250.0), head_sample(1, "B", -250.0)],
        );
        let config = CheckConfig::default().with_capacity("sec1", 50.0, 500.0);
        for (order, expected) in [(["A", "B"], "A"), (["B", "A"], "B")] {
            let cases = CaseSelection::new(order).expect("cases selected");
            let selected =
                select_governing(&piles[0], &forces, &cases, &config).expect("forces exist");
            assert_eq!(selected.output_case, expected);
        }
    }

    #[test]
    fn reports_missing_and_unloaded_piles() {
        let piles = [pile(1), pile(2)];
        let forces = forces_for(&piles, &[head_sample(1, "A", -100.0)]);
        let config = CheckConfig::for_cases(["A", "Z"]).with_capacity("sec1", 50.0, 500.0);
        let cases = config.case_selection().expect("cases selected");
        let mut diagnostics = Diagnostics::default();
        let governing = envelope(&piles, &forces, &cases, &config, &mut diagnostics);

        assert_eq!(governing.len(), 1);
        assert_eq!(governing[0].0.element_id, ElementId(1));
        assert_eq!(diagnostics.unknown_cases, vec!["Z".to_string()]);
        assert_eq!(diagnostics.unloaded_piles, vec![ElementId(2)]);
        assert_eq!(diagnostics.missing_forces.len(), 3);
        assert!(diagnostics.capacity_gaps.is_empty());
    }

    #[test]
    fn substituted_capacity_is_flagged() {
        let piles = [pile(1)];
        let forces = forces_for(&piles, &[head_sample(1, "A", 3.0)]);
        let config = CheckConfig::for_cases(["A"]).with_capacity("sec1", 0.0, 500.0);
        let cases = config.case_selection().expect("cases selected");
        let mut diagnostics = Diagnostics::default();
        let governing = envelope(&piles, &forces, &cases, &config, &mut diagnostics);

        assert!(governing[0].1.capacity.substituted);
        assert!((governing[0].1.ratio - 3.0).abs() < 1.0e-12);
        assert!(diagnostics.capacity_gaps.contains(&CapacityGap {
            section_label: "sec1".into(),
            direction: ForceDirection::Tension,
        }));
    }
}
