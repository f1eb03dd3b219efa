#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod classify;
pub mod config;
pub mod coordinates;
pub mod diagnostics;
pub mod envelope;
pub mod errors;
pub mod forces;
pub mod geometry;
pub mod normalize;
pub mod pipeline;
pub mod tables;

pub use classify::{load_ratio, Status, Thresholds};
pub use config::{
    Capacity, CapacityLookup, CaseSelection, CheckConfig, DEFAULT_RED_THRESHOLD,
    DEFAULT_YELLOW_THRESHOLD, FALLBACK_CAPACITY,
};
pub use coordinates::{resolve_coordinates, select_head, ResolvedPile};
pub use diagnostics::{CapacityGap, Diagnostics, MissingForce};
pub use envelope::{envelope, select_governing, GoverningForce};
pub use errors::ReconcileError;
pub use forces::{
    extract_head_forces, head_force_at, ForceDirection, HeadForce, HeadForces, StationMatch,
};
pub use geometry::{point, Endpoint, PlanPoint, Point};
pub use normalize::{
    Connectivity, ElementId, ForceSample, NormalizedTables, PointCoordinate, PointId,
    SectionAssignment,
};
pub use pipeline::{Assessment, PileRecord, Reconciliation};
pub use tables::{
    Cell, ColumnSchema, ConnectivityColumns, ForceColumns, InputTables, PointColumns, RawTable,
    SectionColumns, TableKind,
};
