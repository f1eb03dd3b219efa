//! Coordinate resolver: the plan position of every pile head.
//!
//! Each assigned element is joined to its connectivity row and then to the
//! point table once per end. The higher end is the pile head; its plan
//! position is what gets plotted and its station is where the load is read.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::geometry::{Endpoint, PlanPoint, Point};
use crate::normalize::{Connectivity, ElementId, NormalizedTables, PointId};

/// An element whose head position was located.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedPile {
    /// Element identifier.
    pub element_id: ElementId,
    /// Section property label.
    pub section_label: String,
    /// Human-facing label, when the export has one.
    pub display_label: Option<String>,
    /// Plan position of the head.
    pub plan: PlanPoint,
    /// Which end of the element is the head.
    pub head: Endpoint,
    /// Elevation of the head.
    pub head_elevation: f64,
    /// Element length, when the export gave a usable one.
    pub length: Option<f64>,
}

impl ResolvedPile {
    /// Station of the head along the element.
    ///
    /// `None` only when the head is the J end and the length is unknown.
    #[must_use]
    pub fn head_station(&self) -> Option<f64> {
        match (self.head, self.length) {
            (Endpoint::J, None) => None,
            (head, length) => Some(head.station(length.unwrap_or(0.0))),
        }
    }
}

/// Choose the pile head from the two ends of an element.
///
/// The higher end wins; equal elevations resolve to the J end. When only one
/// end resolved it is used as is.
///
/// # Examples
/// ```
/// use pilecheck::{point, select_head, Endpoint};
///
/// let i = point(0.0, 0.0, -15.0);
/// let j = point(0.0, 0.0, 0.0);
/// assert_eq!(select_head(Some(i), Some(j)), Some((Endpoint::J, j)));
/// assert_eq!(select_head(Some(i), None), Some((Endpoint::I, i)));
/// assert_eq!(select_head(None, None), None);
/// ```
#[must_use]
pub fn select_head(i: Option<Point>, j: Option<Point>) -> Option<(Endpoint, Point)> {
    match (i, j) {
        (Some(i), Some(j)) if i.z > j.z => Some((Endpoint::I, i)),
        (_, Some(j)) => Some((Endpoint::J, j)),
        (Some(i), None) => Some((Endpoint::I, i)),
        (None, None) => None,
    }
}

/// Resolve the head of every assigned element, ordered by element id.
///
/// Elements without connectivity, or whose ends both fail to resolve, are
/// left out and listed in `diagnostics`.
pub fn resolve_coordinates(
    tables: &NormalizedTables,
    diagnostics: &mut Diagnostics,
) -> Vec<ResolvedPile> {
    let points: HashMap<PointId, Point> = tables
        .points
        .iter()
        .filter_map(|p| Some((p.point_id, p.position()?)))
        .collect();
    let connectivity: HashMap<ElementId, &Connectivity> = tables
        .connectivity
        .iter()
        .map(|c| (c.element_id, c))
        .collect();
    let sections: BTreeMap<ElementId, _> = tables
        .sections
        .iter()
        .map(|s| (s.element_id, s))
        .collect();

    let lookup = |id: Option<PointId>| id.and_then(|id| points.get(&id).copied());

    let mut piles = Vec::with_capacity(sections.len());
    for (element_id, section) in sections.iter() {
        let Some(conn) = connectivity.get(element_id) else {
            diagnostics.missing_connectivity.push(*element_id);
            diagnostics.unresolved_geometry.push(*element_id);
            continue;
        };
        let Some((head, position)) = select_head(lookup(conn.point_i_id), lookup(conn.point_j_id))
        else {
            diagnostics.unresolved_geometry.push(*element_id);
            continue;
        };
        piles.push(ResolvedPile {
            element_id: *element_id,
            section_label: section.section_label.clone(),
            display_label: section.display_label.clone(),
            plan: position.plan(),
            head,
            head_elevation: position.z,
            length: conn.length,
        });
    }

    let mut unassigned: Vec<ElementId> = connectivity
        .keys()
        .filter(|id| !sections.contains_key(id))
        .copied()
        .collect();
    unassigned.sort_unstable();
    diagnostics.unassigned_elements.extend(unassigned);

    debug!(
        "resolved {} of {} assigned element heads",
        piles.len(),
        sections.len()
    );
    if !diagnostics.unresolved_geometry.is_empty() {
        warn!(
            "{} element(s) excluded: head position could not be resolved",
            diagnostics.unresolved_geometry.len()
        );
    }
    piles
}
