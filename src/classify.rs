//! Ratio classifier: load over capacity, and the three-level status.

use std::fmt;

use serde::Serialize;

use crate::errors::ReconcileError;

/// Outcome of comparing a pile's ratio with the thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Status {
    /// Below the warning threshold.
    Safe,
    /// At or above the warning threshold, below the overload threshold.
    Warning,
    /// At or above the overload threshold.
    OverLoad,
}

impl Status {
    /// All statuses in legend order.
    pub const ALL: [Status; 3] = [Status::Safe, Status::Warning, Status::OverLoad];

    /// Legend label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Status::Safe => "Safe (Green)",
            Status::Warning => "Warning (Yellow)",
            Status::OverLoad => "Over Load (Red)",
        }
    }

    /// Marker colour as a hex RGB string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Status::Safe => "#00BFC4",
            Status::Warning => "#FFCC00",
            Status::OverLoad => "#F8766D",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Warning and overload ratio thresholds.
///
/// The pair is not required to be ordered. Classification always tests the
/// red threshold first, then the yellow one, so with `yellow > red` every
/// ratio at or above `red` is an overload and the warning band is empty.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Thresholds {
    /// Ratio at or above which a pile is a warning.
    pub yellow: f64,
    /// Ratio at or above which a pile is overloaded.
    pub red: f64,
}

impl Thresholds {
    /// Create thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::InvalidThreshold`] when either value is not
    /// finite.
    pub fn new(yellow: f64, red: f64) -> Result<Self, ReconcileError> {
        if !yellow.is_finite() {
            return Err(ReconcileError::InvalidThreshold {
                name: "yellow",
                value: yellow,
            });
        }
        if !red.is_finite() {
            return Err(ReconcileError::InvalidThreshold {
                name: "red",
                value: red,
            });
        }
        Ok(Self { yellow, red })
    }

    /// Classify a ratio. Both bounds are inclusive.
    ///
    /// # Examples
    /// ```
    /// use pilecheck::{Status, Thresholds};
    ///
    /// let thresholds = Thresholds::new(0.9, 1.0).expect("finite thresholds");
    /// assert_eq!(thresholds.classify(0.89), Status::Safe);
    /// assert_eq!(thresholds.classify(0.9), Status::Warning);
    /// assert_eq!(thresholds.classify(1.2), Status::OverLoad);
    /// ```
    #[must_use]
    pub fn classify(&self, ratio: f64) -> Status {
        if ratio >= self.red {
            Status::OverLoad
        } else if ratio >= self.yellow {
            Status::Warning
        } else {
            Status::Safe
        }
    }
}

/// Ratio of an axial force's magnitude to a capacity.
#[must_use]
pub fn load_ratio(axial_force: f64, capacity: f64) -> f64 {
    axial_force.abs() / capacity
}
