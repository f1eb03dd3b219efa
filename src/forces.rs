//! Force extractor: the axial force at each pile head, per output case.
//!
//! Samples are grouped by `(element, case)` and each group is reduced on its
//! own to the sample at the head station, or the nearest one when the export
//! grid skipped it. The reduction only depends on the group's contents, never
//! on row order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use log::debug;
use serde::Serialize;

use crate::coordinates::ResolvedPile;
use crate::diagnostics::Diagnostics;
use crate::normalize::{ElementId, ForceSample};

/// Whether an axial force pulls or pushes on the pile.
///
/// Positive axial force is tension, negative is compression. Zero counts as
/// compression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceDirection {
    /// Pile pushed into the ground.
    Compression,
    /// Pile pulled out of the ground (uplift).
    Tension,
}

impl ForceDirection {
    /// Classify a signed axial force.
    ///
    /// # Examples
    /// ```
    /// use pilecheck::ForceDirection;
    ///
    /// assert_eq!(ForceDirection::of(-450.0), ForceDirection::Compression);
    /// assert_eq!(ForceDirection::of(60.0), ForceDirection::Tension);
    /// assert_eq!(ForceDirection::of(0.0), ForceDirection::Compression);
    /// ```
    #[must_use]
    pub fn of(axial_force: f64) -> Self {
        if axial_force > 0.0 {
            ForceDirection::Tension
        } else {
            ForceDirection::Compression
        }
    }
}

impl fmt::Display for ForceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ForceDirection::Compression => "compression",
            ForceDirection::Tension => "tension",
        })
    }
}

/// How the head sample was found.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StationMatch {
    /// A sample sat exactly on the head station.
    Exact,
    /// The closest sample was used.
    Nearest {
        /// Distance between the sample and the head station.
        distance: f64,
    },
}

/// Axial force read at a pile head for one output case.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HeadForce {
    /// Station of the sample used.
    pub station: f64,
    /// Signed axial force of the sample.
    pub axial_force: f64,
    /// Whether the station matched exactly.
    pub matched: StationMatch,
}

impl HeadForce {
    /// Tension or compression.
    #[must_use]
    pub fn direction(&self) -> ForceDirection {
        ForceDirection::of(self.axial_force)
    }

    /// Absolute value of the axial force.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.axial_force.abs()
    }
}

/// Order `(station, force)` samples so the most conservative comes first:
/// larger magnitude, then lower station, then the more compressive force.
fn conservative_order(a: &(f64, f64), b: &(f64, f64)) -> Ordering {
    b.1.abs()
        .total_cmp(&a.1.abs())
        .then_with(|| a.0.total_cmp(&b.0))
        .then_with(|| a.1.total_cmp(&b.1))
}

/// Pick the sample representing the head from `(station, force)` pairs.
///
/// A sample exactly at `target` is always preferred. Otherwise the nearest
/// station wins, and equidistant samples resolve to the larger magnitude.
/// Returns `None` for an empty group.
///
/// # Examples
/// ```
/// use pilecheck::{head_force_at, StationMatch};
///
/// let samples = [(0.0, -480.0), (3.0, -465.0), (6.0, -450.0)];
/// let head = head_force_at(6.01, &samples).expect("group has samples");
/// assert_eq!(head.station, 6.0);
/// assert!(matches!(head.matched, StationMatch::Nearest { .. }));
/// ```
#[must_use]
pub fn head_force_at(target: f64, samples: &[(f64, f64)]) -> Option<HeadForce> {
    let exact = samples
        .iter()
        .filter(|(station, _)| *station == target)
        .min_by(|a, b| conservative_order(a, b));
    if let Some(&(station, axial_force)) = exact {
        return Some(HeadForce {
            station,
            axial_force,
            matched: StationMatch::Exact,
        });
    }

    let distance = |station: f64| (station - target).abs();
    samples
        .iter()
        .min_by(|a, b| {
            distance(a.0)
                .total_cmp(&distance(b.0))
                .then_with(|| conservative_order(a, b))
        })
        .map(|&(station, axial_force)| HeadForce {
            station,
            axial_force,
            matched: StationMatch::Nearest {
                distance: distance(station),
            },
        })
}

/// Head forces of every resolved pile, keyed by element then case.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HeadForces {
    /// Head force per element and case.
    forces: BTreeMap<ElementId, BTreeMap<String, HeadForce>>,
    /// Every case name present in the force table.
    cases: BTreeSet<String>,
}

impl HeadForces {
    /// Head force of `element_id` in `output_case`, if one was found.
    #[must_use]
    pub fn get(&self, element_id: ElementId, output_case: &str) -> Option<&HeadForce> {
        self.forces.get(&element_id)?.get(output_case)
    }

    /// All cases with a head force for `element_id`, in name order.
    pub fn for_element(&self, element_id: ElementId) -> impl Iterator<Item = (&str, &HeadForce)> {
        self.forces
            .get(&element_id)
            .into_iter()
            .flat_map(|cases| cases.iter().map(|(case, force)| (case.as_str(), force)))
    }

    /// Every case name present in the force table, in name order.
    pub fn cases(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(String::as_str)
    }

    /// Whether `output_case` appears anywhere in the force table.
    #[must_use]
    pub fn has_case(&self, output_case: &str) -> bool {
        self.cases.contains(output_case)
    }

    /// Number of `(element, case)` pairs with a head force.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forces.values().map(BTreeMap::len).sum()
    }

    /// Whether no head force was found at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extract the head force of every pile for every case it has samples in.
///
/// When a pile's head is its J end but the length is unknown, the largest
/// recorded station of the group stands in for the J end. Samples without a
/// numeric station or force are skipped and counted in `diagnostics`.
pub fn extract_head_forces(
    piles: &[ResolvedPile],
    samples: &[ForceSample],
    diagnostics: &mut Diagnostics,
) -> HeadForces {
    let piles_by_id: HashMap<ElementId, &ResolvedPile> =
        piles.iter().map(|pile| (pile.element_id, pile)).collect();

    let cases: BTreeSet<String> = samples.iter().map(|s| s.output_case.clone()).collect();

    let mut groups: BTreeMap<(ElementId, &str), Vec<(f64, f64)>> = BTreeMap::new();
    for sample in samples {
        let (Some(station), Some(axial_force)) = (sample.station, sample.axial_force) else {
            diagnostics.invalid_samples += 1;
            continue;
        };
        if piles_by_id.contains_key(&sample.element_id) {
            groups
                .entry((sample.element_id, sample.output_case.as_str()))
                .or_default()
                .push((station, axial_force));
        }
    }

    let mut forces: BTreeMap<ElementId, BTreeMap<String, HeadForce>> = BTreeMap::new();
    for ((element_id, case), group) in groups {
        let Some(pile) = piles_by_id.get(&element_id) else {
            continue;
        };
        let target = pile.head_station().unwrap_or_else(|| {
            group
                .iter()
                .map(|(station, _)| *station)
                .fold(f64::NEG_INFINITY, f64::max)
        });
        if let Some(head) = head_force_at(target, &group) {
            forces
                .entry(element_id)
                .or_default()
                .insert(case.to_string(), head);
        }
    }

    let head_forces = HeadForces { forces, cases };
    debug!(
        "extracted {} head forces across {} output cases",
        head_forces.len(),
        head_forces.cases.len()
    );
    head_forces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Endpoint, PlanPoint};

    fn pile(id: i64, head: Endpoint, length: Option<f64>) -> ResolvedPile {
        ResolvedPile {
            element_id: ElementId(id),
            section_label: "P60".into(),
            display_label: None,
            plan: PlanPoint::new(0.0, 0.0),
            head,
            head_elevation: 0.0,
            length,
        }
    }

    fn sample(id: i64, case: &str, station: f64, force: f64) -> ForceSample {
        ForceSample {
            element_id: ElementId(id),
            output_case: case.into(),
            station: Some(station),
            axial_force: Some(force),
        }
    }

    #[test]
    fn exact_station_beats_nearer_magnitude() {
        let samples = [(5.999, -900.0), (6.0, -450.0), (6.001, -900.0)];
        let head = head_force_at(6.0, &samples).expect("samples present");
        assert_eq!(head.axial_force, -450.0);
        assert_eq!(head.matched, StationMatch::Exact);
    }

    #[test]
    fn nearest_station_is_global_minimum() {
        let samples = [(0.0, -1.0), (3.0, -2.0), (6.0, -3.0), (5.5, -9.0)];
        let head = head_force_at(6.01, &samples).expect("samples present");
        assert_eq!(head.station, 6.0);
        match head.matched {
            StationMatch::Nearest { distance } => assert!((distance - 0.01).abs() < 1.0e-9),
            StationMatch::Exact => panic!("6.01 is not on the grid"),
        }
    }

    #[test]
    fn equidistant_samples_prefer_larger_magnitude() {
        let forward = [(4.0, -100.0), (6.0, 250.0)];
        let reversed = [(6.0, 250.0), (4.0, -100.0)];
        for samples in [forward, reversed] {
            let head = head_force_at(5.0, &samples).expect("samples present");
            assert_eq!(head.axial_force, 250.0);
        }
    }

    #[test]
    fn equal_magnitudes_resolve_independently_of_order() {
        let forward = [(4.0, 300.0), (6.0, -300.0)];
        let reversed = [(6.0, -300.0), (4.0, 300.0)];
        let a = head_force_at(5.0, &forward).expect("samples present");
        let b = head_force_at(5.0, &reversed).expect("samples present");
        assert_eq!(a, b);
        assert_eq!(a.station, 4.0);
    }

    #[test]
    fn empty_group_has_no_force() {
        assert_eq!(head_force_at(0.0, &[]), None);
    }

    #[test]
    fn extracts_per_element_and_case() {
        let piles = [
            pile(1, Endpoint::J, Some(12.0)),
            pile(2, Endpoint::I, Some(12.0)),
            pile(3, Endpoint::J, None),
        ];
        let samples = vec![
            sample(1, "DL", 0.0, -500.0),
            sample(1, "DL", 12.0, -450.0),
            sample(1, "WL", 11.99, 60.0),
            sample(2, "DL", 0.0, -300.0),
            sample(2, "DL", 12.0, -320.0),
            sample(3, "DL", 0.0, -10.0),
            sample(3, "DL", 7.5, -20.0),
            sample(9, "EQ", 0.0, -1.0),
            ForceSample {
                element_id: ElementId(1),
                output_case: "LL".into(),
                station: None,
                axial_force: Some(-5.0),
            },
        ];
        let mut diagnostics = Diagnostics::default();
        let forces = extract_head_forces(&piles, &samples, &mut diagnostics);

        let dl = forces.get(ElementId(1), "DL").expect("exact head sample");
        assert_eq!(dl.axial_force, -450.0);
        assert_eq!(dl.direction(), ForceDirection::Compression);
        let wl = forces.get(ElementId(1), "WL").expect("nearest head sample");
        assert_eq!(wl.direction(), ForceDirection::Tension);
        assert_eq!(forces.get(ElementId(1), "LL"), None);

        assert_eq!(forces.get(ElementId(2), "DL").map(|f| f.axial_force), Some(-300.0));
        assert_eq!(forces.get(ElementId(3), "DL").map(|f| f.station), Some(7.5));
        assert_eq!(forces.len(), 4);
        assert_eq!(forces.for_element(ElementId(1)).count(), 2);

        assert!(forces.has_case("EQ"));
        assert!(forces.has_case("LL"));
        assert_eq!(forces.cases().collect::<Vec<_>>(), ["DL", "EQ", "LL", "WL"]);
        assert_eq!(diagnostics.invalid_samples, 1);
    }
}
