//! Error types produced while reconciling exported tables.

use thiserror::Error;

use crate::tables::TableKind;

/// Error returned when a reconciliation run cannot proceed.
///
/// Only schema and configuration problems are fatal. Data-quality findings on
/// individual elements are collected in [`Diagnostics`](crate::Diagnostics)
/// instead so a single bad row never aborts the batch.
///
/// # Examples
///
/// ```
/// use pilecheck::{CaseSelection, ReconcileError};
///
/// let error = CaseSelection::new(Vec::<String>::new()).expect_err("no cases selected");
/// assert_eq!(error, ReconcileError::EmptyCaseSelection);
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ReconcileError {
    /// Returned when a required column is absent from an input table.
    #[error("table `{table}` is missing required column `{column}`")]
    MissingColumn {
        /// Table that lacks the column.
        table: TableKind,
        /// Header the schema expected to find.
        column: String,
    },
    /// Returned when no output case was selected for the envelope.
    #[error("at least one output case must be selected")]
    EmptyCaseSelection,
    /// Returned when a classification threshold is not a finite number.
    #[error("{name} threshold must be a finite number (received {value})")]
    InvalidThreshold {
        /// Which threshold was rejected.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
}
