//! Raw tabular input as exported from the analysis model.
//!
//! Each exported sheet arrives as a [`RawTable`]: a header row and loosely typed
//! [`Cell`]s. Nothing here interprets the data; the
//! [`normalize`](crate::normalize) stage turns these tables into typed records.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Cell returned for positions past the end of a short row.
static EMPTY_CELL: Cell = Cell::Empty;

/// A single loosely typed spreadsheet value.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// Blank cell.
    Empty,
    /// Numeric cell.
    Number(f64),
    /// Text cell, kept exactly as exported.
    Text(String),
}

impl Cell {
    /// Read the cell as a finite number.
    ///
    /// Text is parsed after trimming surrounding whitespace. Anything that does
    /// not yield a finite number is `None`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(value) if value.is_finite() => Some(*value),
            Cell::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite()),
            _ => None,
        }
    }

    /// Read the cell as an integer identifier.
    ///
    /// Integral numbers and text such as `"12"` or `"12.0"` resolve to the
    /// same key; fractional or non-numeric values do not resolve.
    ///
    /// # Examples
    /// ```
    /// use pilecheck::Cell;
    ///
    /// assert_eq!(Cell::Number(12.0).as_key(), Some(12));
    /// assert_eq!(Cell::Text(" 12 ".into()).as_key(), Some(12));
    /// assert_eq!(Cell::Text("12.0".into()).as_key(), Some(12));
    /// assert_eq!(Cell::Text("m".into()).as_key(), None);
    /// assert_eq!(Cell::Number(12.5).as_key(), None);
    /// ```
    #[must_use]
    pub fn as_key(&self) -> Option<i64> {
        if let Cell::Text(text) = self {
            if let Ok(key) = text.trim().parse::<i64>() {
                return Some(key);
            }
        }
        let value = self.as_f64()?;
        // Beyond 2^53 an f64 no longer identifies a single integer.
        if value.fract() == 0.0 && value.abs() <= 9_007_199_254_740_992.0 {
            Some(value as i64)
        } else {
            None
        }
    }

    /// Read the cell as a label. Numbers are rendered without a trailing `.0`
    /// when integral, so a section named `600` reads as `"600"`.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(text) => Some(text.clone()),
            Cell::Number(value) if value.fract() == 0.0 && value.abs() < 1.0e15 => {
                Some(format!("{}", *value as i64))
            }
            Cell::Number(value) => Some(value.to_string()),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Number(f64::from(value))
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Empty, Into::into)
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Null => Cell::Empty,
            serde_json::Value::Number(number) => number.as_f64().map_or(Cell::Empty, Cell::Number),
            serde_json::Value::String(text) => Cell::Text(text),
            other => Cell::Text(other.to_string()),
        })
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_none(),
            Cell::Number(value) => serializer.serialize_f64(*value),
            Cell::Text(text) => serializer.serialize_str(text),
        }
    }
}

/// A header row plus data rows, as read from one exported sheet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Column headers in sheet order.
    pub columns: Vec<String>,
    /// Data rows. Rows shorter than the header read missing cells as empty.
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Create an empty table with the given headers.
    ///
    /// # Examples
    /// ```
    /// use pilecheck::{Cell, RawTable};
    ///
    /// let table = RawTable::new(["UniqueName", "X", "Y", "Z"])
    ///     .with_row(vec![1.into(), 0.0.into(), 0.0.into(), Cell::Empty]);
    /// assert_eq!(table.rows.len(), 1);
    /// ```
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, builder style.
    #[must_use]
    pub fn with_row(mut self, row: Vec<Cell>) -> Self {
        self.rows.push(row);
        self
    }

    /// Append a row.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Position of the column whose trimmed header equals `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.columns.iter().position(|c| c.trim() == name)
    }

    /// Cell at `column` of `row`, or [`Cell::Empty`] past the end of the row.
    #[must_use]
    pub fn cell<'a>(row: &'a [Cell], column: usize) -> &'a Cell {
        row.get(column).unwrap_or(&EMPTY_CELL)
    }
}

/// The four exported sheets the reconciliation consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Section property assignment per frame element.
    Sections,
    /// Element end points and length.
    Connectivity,
    /// Global point coordinates.
    Points,
    /// Per-station internal forces.
    Forces,
}

impl TableKind {
    /// Sheet name used by the ETABS export.
    #[must_use]
    pub const fn sheet_name(self) -> &'static str {
        match self {
            TableKind::Sections => "Frame Assigns - Sect Prop",
            TableKind::Connectivity => "Column Object Connectivity",
            TableKind::Points => "Point Object Connectivity",
            TableKind::Forces => "Element Forces - Columns",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// All four raw tables of one model export.
///
/// Deserializes from a JSON object keyed by the ETABS sheet names, or by the
/// short aliases `sections`, `connectivity`, `points` and `forces`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputTables {
    /// Section assignment sheet.
    #[serde(rename = "Frame Assigns - Sect Prop", alias = "sections")]
    pub sections: RawTable,
    /// Connectivity sheet.
    #[serde(rename = "Column Object Connectivity", alias = "connectivity")]
    pub connectivity: RawTable,
    /// Point coordinate sheet.
    #[serde(rename = "Point Object Connectivity", alias = "points")]
    pub points: RawTable,
    /// Element force sheet.
    #[serde(rename = "Element Forces - Columns", alias = "forces")]
    pub forces: RawTable,
}

/// Header names of the section assignment sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionColumns {
    /// Element identifier.
    pub element_id: String,
    /// Section property label.
    pub section_label: String,
    /// Optional human-facing element label.
    pub display_label: Option<String>,
}

impl Default for SectionColumns {
    fn default() -> Self {
        Self {
            element_id: "UniqueName".into(),
            section_label: "Section Property".into(),
            display_label: Some("Label".into()),
        }
    }
}

/// Header names of the connectivity sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityColumns {
    /// Element identifier.
    pub element_id: String,
    /// Point at the I end.
    pub point_i_id: String,
    /// Point at the J end.
    pub point_j_id: String,
    /// Element length.
    pub length: String,
}

impl Default for ConnectivityColumns {
    fn default() -> Self {
        Self {
            element_id: "Unique Name".into(),
            point_i_id: "UniquePtI".into(),
            point_j_id: "UniquePtJ".into(),
            length: "Length".into(),
        }
    }
}

/// Header names of the point coordinate sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointColumns {
    /// Point identifier.
    pub point_id: String,
    /// X coordinate.
    pub x: String,
    /// Y coordinate.
    pub y: String,
    /// Z coordinate (elevation).
    pub z: String,
}

impl Default for PointColumns {
    fn default() -> Self {
        Self {
            point_id: "UniqueName".into(),
            x: "X".into(),
            y: "Y".into(),
            z: "Z".into(),
        }
    }
}

/// Header names of the element force sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceColumns {
    /// Element identifier.
    pub element_id: String,
    /// Load case or combination name.
    pub output_case: String,
    /// Distance from the I end.
    pub station: String,
    /// Axial force.
    pub axial_force: String,
}

impl Default for ForceColumns {
    fn default() -> Self {
        Self {
            element_id: "Unique Name".into(),
            output_case: "Output Case".into(),
            station: "Station".into(),
            axial_force: "P".into(),
        }
    }
}

/// Mapping from logical columns to sheet headers, defaulting to ETABS names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    /// Section assignment headers.
    pub sections: SectionColumns,
    /// Connectivity headers.
    pub connectivity: ConnectivityColumns,
    /// Point coordinate headers.
    pub points: PointColumns,
    /// Element force headers.
    pub forces: ForceColumns,
}
