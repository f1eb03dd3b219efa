//! Table normalizer: typed, key-checked copies of the raw sheets.
//!
//! Identifier columns are coerced to integers up front so every later join
//! compares like with like. A row whose own key does not resolve is dropped
//! and counted; references to other tables (the end points of an element)
//! are kept as optional keys and resolved by the coordinate stage.

use std::collections::HashSet;
use std::fmt;

use log::debug;
use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::errors::ReconcileError;
use crate::geometry::Point;
use crate::tables::{Cell, ColumnSchema, InputTables, RawTable, TableKind};

/// Unique identifier of a frame element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ElementId(pub i64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PointId(pub i64);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Section property assigned to an element.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionAssignment {
    /// Element the assignment belongs to.
    pub element_id: ElementId,
    /// Section property label; capacities are keyed by it.
    pub section_label: String,
    /// Human-facing element label, when the sheet has one.
    pub display_label: Option<String>,
}

/// End points and length of an element.
#[derive(Clone, Debug, PartialEq)]
pub struct Connectivity {
    /// Element the row describes.
    pub element_id: ElementId,
    /// Point at the I end, if it resolved.
    pub point_i_id: Option<PointId>,
    /// Point at the J end, if it resolved.
    pub point_j_id: Option<PointId>,
    /// Element length, if numeric and non-negative.
    pub length: Option<f64>,
}

/// Global coordinates of a point.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCoordinate {
    /// Point identifier.
    pub point_id: PointId,
    /// X coordinate, if numeric.
    pub x: Option<f64>,
    /// Y coordinate, if numeric.
    pub y: Option<f64>,
    /// Z coordinate, if numeric.
    pub z: Option<f64>,
}

impl PointCoordinate {
    /// The position, when all three coordinates are present.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        Some(Point::new(self.x?, self.y?, self.z?))
    }
}

/// Axial force recorded at one station of an element for one output case.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceSample {
    /// Element the sample belongs to.
    pub element_id: ElementId,
    /// Load case or combination name.
    pub output_case: String,
    /// Distance from the I end, if numeric.
    pub station: Option<f64>,
    /// Axial force (negative is compression), if numeric.
    pub axial_force: Option<f64>,
}

/// Typed copies of the four input sheets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedTables {
    /// Section assignments, one per element.
    pub sections: Vec<SectionAssignment>,
    /// Connectivity rows, one per element.
    pub connectivity: Vec<Connectivity>,
    /// Point coordinates, one per point.
    pub points: Vec<PointCoordinate>,
    /// Force samples, many per element.
    pub forces: Vec<ForceSample>,
}

impl NormalizedTables {
    /// Normalize all four sheets, recording dropped and duplicate rows.
    ///
    /// The caller's tables are only read.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::MissingColumn`] naming the first sheet and
    /// header that the schema requires but the sheet lacks.
    pub fn from_raw(
        tables: &InputTables,
        schema: &ColumnSchema,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, ReconcileError> {
        let normalized = Self {
            sections: normalize_sections(&tables.sections, schema, diagnostics)?,
            connectivity: normalize_connectivity(&tables.connectivity, schema, diagnostics)?,
            points: normalize_points(&tables.points, schema, diagnostics)?,
            forces: normalize_forces(&tables.forces, schema, diagnostics)?,
        };
        debug!(
            "normalized {} sections, {} connectivity rows, {} points, {} force samples",
            normalized.sections.len(),
            normalized.connectivity.len(),
            normalized.points.len(),
            normalized.forces.len()
        );
        Ok(normalized)
    }
}

/// Locate a required column or report which sheet lacks it.
fn require(table: &RawTable, kind: TableKind, column: &str) -> Result<usize, ReconcileError> {
    table
        .column_index(column)
        .ok_or_else(|| ReconcileError::MissingColumn {
            table: kind,
            column: column.trim().to_string(),
        })
}

/// Read a length, rejecting negative values.
fn length_of(cell: &Cell) -> Option<f64> {
    cell.as_f64().filter(|length| *length >= 0.0)
}

/// Normalize the section assignment sheet.
fn normalize_sections(
    raw: &RawTable,
    schema: &ColumnSchema,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SectionAssignment>, ReconcileError> {
    let kind = TableKind::Sections;
    let columns = &schema.sections;
    let id = require(raw, kind, &columns.element_id)?;
    let label = require(raw, kind, &columns.section_label)?;
    let display = columns
        .display_label
        .as_deref()
        .and_then(|name| raw.column_index(name));

    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let Some(key) = RawTable::cell(row, id).as_key() else {
            diagnostics.record_dropped(kind);
            continue;
        };
        if !seen.insert(key) {
            diagnostics.record_duplicate(kind);
            continue;
        }
        rows.push(SectionAssignment {
            element_id: ElementId(key),
            section_label: RawTable::cell(row, label).as_text().unwrap_or_default(),
            display_label: display.and_then(|column| RawTable::cell(row, column).as_text()),
        });
    }
    Ok(rows)
}

/// Normalize the connectivity sheet.
fn normalize_connectivity(
    raw: &RawTable,
    schema: &ColumnSchema,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Connectivity>, ReconcileError> {
    let kind = TableKind::Connectivity;
    let columns = &schema.connectivity;
    let id = require(raw, kind, &columns.element_id)?;
    let point_i = require(raw, kind, &columns.point_i_id)?;
    let point_j = require(raw, kind, &columns.point_j_id)?;
    let length = require(raw, kind, &columns.length)?;

    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let Some(key) = RawTable::cell(row, id).as_key() else {
            diagnostics.record_dropped(kind);
            continue;
        };
        if !seen.insert(key) {
            diagnostics.record_duplicate(kind);
            continue;
        }
        rows.push(Connectivity {
            element_id: ElementId(key),
            point_i_id: RawTable::cell(row, point_i).as_key().map(PointId),
            point_j_id: RawTable::cell(row, point_j).as_key().map(PointId),
            length: length_of(RawTable::cell(row, length)),
        });
    }
    Ok(rows)
}

/// Normalize the point coordinate sheet.
fn normalize_points(
    raw: &RawTable,
    schema: &ColumnSchema,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<PointCoordinate>, ReconcileError> {
    let kind = TableKind::Points;
    let columns = &schema.points;
    let id = require(raw, kind, &columns.point_id)?;
    let x = require(raw, kind, &columns.x)?;
    let y = require(raw, kind, &columns.y)?;
    let z = require(raw, kind, &columns.z)?;

    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let Some(key) = RawTable::cell(row, id).as_key() else {
            diagnostics.record_dropped(kind);
            continue;
        };
        if !seen.insert(key) {
            diagnostics.record_duplicate(kind);
            continue;
        }
        rows.push(PointCoordinate {
            point_id: PointId(key),
            x: RawTable::cell(row, x).as_f64(),
            y: RawTable::cell(row, y).as_f64(),
            z: RawTable::cell(row, z).as_f64(),
        });
    }
    Ok(rows)
}

/// Normalize the element force sheet.
fn normalize_forces(
    raw: &RawTable,
    schema: &ColumnSchema,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ForceSample>, ReconcileError> {
    let kind = TableKind::Forces;
    let columns = &schema.forces;
    let id = require(raw, kind, &columns.element_id)?;
    let case = require(raw, kind, &columns.output_case)?;
    let station = require(raw, kind, &columns.station)?;
    let force = require(raw, kind, &columns.axial_force)?;

    let mut rows = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let Some(key) = RawTable::cell(row, id).as_key() else {
            diagnostics.record_dropped(kind);
            continue;
        };
        rows.push(ForceSample {
            element_id: ElementId(key),
            output_case: RawTable::cell(row, case).as_text().unwrap_or_default(),
            station: RawTable::cell(row, station).as_f64(),
            axial_force: RawTable::cell(row, force).as_f64(),
        });
    }
    Ok(rows)
}
