//! Run-time configuration of a capacity check.
//!
//! Capacities, thresholds and the case selection are supplied per run and
//! never stored in the input tables, so one reconciliation can be evaluated
//! against any number of configurations.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::classify::Thresholds;
use crate::errors::ReconcileError;
use crate::forces::ForceDirection;

/// Default ratio at which a pile is flagged as a warning.
pub const DEFAULT_YELLOW_THRESHOLD: f64 = 0.90;
/// Default ratio at which a pile is flagged as overloaded.
pub const DEFAULT_RED_THRESHOLD: f64 = 1.00;
/// Capacity used in place of a missing or unusable one.
pub const FALLBACK_CAPACITY: f64 = 1.0;

/// Allowable axial load of a section in each direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Capacity {
    /// Allowable uplift (tension) load.
    #[serde(default)]
    pub tension: Option<f64>,
    /// Allowable compression load.
    #[serde(default)]
    pub compression: Option<f64>,
}

impl Capacity {
    /// Create a capacity with both directions set.
    #[must_use]
    pub const fn new(tension: f64, compression: f64) -> Self {
        Self {
            tension: Some(tension),
            compression: Some(compression),
        }
    }

    /// Configured capacity for `direction`, if any.
    #[must_use]
    pub fn for_direction(&self, direction: ForceDirection) -> Option<f64> {
        match direction {
            ForceDirection::Tension => self.tension,
            ForceDirection::Compression => self.compression,
        }
    }
}

/// Capacity used as a ratio denominator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapacityLookup {
    /// Strictly positive capacity.
    pub value: f64,
    /// Whether [`FALLBACK_CAPACITY`] replaced an absent or unusable value.
    pub substituted: bool,
}

/// Ordered, duplicate-free selection of output cases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseSelection {
    /// Case names in the caller's order.
    cases: Vec<String>,
}

impl CaseSelection {
    /// Build a selection, keeping the first occurrence of repeated names.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::EmptyCaseSelection`] when no case is given.
    ///
    /// # Examples
    /// ```
    /// use pilecheck::CaseSelection;
    ///
    /// let selection = CaseSelection::new(["ULS2", "ULS1", "ULS2"]).expect("cases given");
    /// assert_eq!(selection.iter().collect::<Vec<_>>(), ["ULS2", "ULS1"]);
    /// ```
    pub fn new<I, S>(cases: I) -> Result<Self, ReconcileError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let cases: Vec<String> = cases
            .into_iter()
            .map(Into::into)
            .filter(|case| seen.insert(case.clone()))
            .collect();
        if cases.is_empty() {
            return Err(ReconcileError::EmptyCaseSelection);
        }
        Ok(Self { cases })
    }

    /// Selected case names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(String::as_str)
    }

    /// Number of selected cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Always `false`; an empty selection cannot be built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Default for [`CheckConfig::yellow_threshold`].
fn default_yellow() -> f64 {
    DEFAULT_YELLOW_THRESHOLD
}

/// Default for [`CheckConfig::red_threshold`].
fn default_red() -> f64 {
    DEFAULT_RED_THRESHOLD
}

/// Everything a capacity check needs besides the model tables.
///
/// # Examples
/// ```
/// use pilecheck::CheckConfig;
///
/// let config: CheckConfig = serde_json::from_str(
///     r#"{
///         "capacities": {"P60": {"tension": 50, "compression": 500}},
///         "selected_cases": ["DL+LL"]
///     }"#,
/// )
/// .expect("config parses");
/// assert_eq!(config.yellow_threshold, 0.90);
/// assert_eq!(config.red_threshold, 1.00);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Capacities keyed by section label.
    #[serde(default)]
    pub capacities: BTreeMap<String, Capacity>,
    /// Ratio at or above which a pile is a warning.
    #[serde(default = "default_yellow")]
    pub yellow_threshold: f64,
    /// Ratio at or above which a pile is overloaded.
    #[serde(default = "default_red")]
    pub red_threshold: f64,
    /// Cases to envelope, in priority order for ties.
    #[serde(default)]
    pub selected_cases: Vec<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            capacities: BTreeMap::new(),
            yellow_threshold: DEFAULT_YELLOW_THRESHOLD,
            red_threshold: DEFAULT_RED_THRESHOLD,
            selected_cases: Vec::new(),
        }
    }
}

impl CheckConfig {
    /// Create a configuration with default thresholds for the given cases.
    #[must_use]
    pub fn for_cases<I, S>(cases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected_cases: cases.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the capacity of a section, builder style.
    #[must_use]
    pub fn with_capacity(mut self, section: impl Into<String>, tension: f64, compression: f64) -> Self {
        self.capacities
            .insert(section.into(), Capacity::new(tension, compression));
        self
    }

    /// Set both thresholds, builder style.
    #[must_use]
    pub fn with_thresholds(mut self, yellow: f64, red: f64) -> Self {
        self.yellow_threshold = yellow;
        self.red_threshold = red;
        self
    }

    /// Validated thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::InvalidThreshold`] when either threshold is
    /// not finite.
    pub fn thresholds(&self) -> Result<Thresholds, ReconcileError> {
        Thresholds::new(self.yellow_threshold, self.red_threshold)
    }

    /// Validated case selection.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::EmptyCaseSelection`] when no case is selected.
    pub fn case_selection(&self) -> Result<CaseSelection, ReconcileError> {
        CaseSelection::new(self.selected_cases.iter().cloned())
    }

    /// Capacity of `section` for `direction`.
    ///
    /// An absent, zero, negative or non-finite capacity is replaced by
    /// [`FALLBACK_CAPACITY`] and marked as substituted.
    ///
    /// # Examples
    /// ```
    /// use pilecheck::{CheckConfig, ForceDirection};
    ///
    /// let config = CheckConfig::default().with_capacity("P60", 50.0, 500.0);
    /// let lookup = config.capacity_for("P60", ForceDirection::Tension);
    /// assert_eq!(lookup.value, 50.0);
    /// assert!(!lookup.substituted);
    /// assert!(config.capacity_for("P80", ForceDirection::Tension).substituted);
    /// ```
    #[must_use]
    pub fn capacity_for(&self, section: &str, direction: ForceDirection) -> CapacityLookup {
        match self
            .capacities
            .get(section)
            .and_then(|capacity| capacity.for_direction(direction))
            .filter(|value| value.is_finite() && *value > 0.0)
        {
            Some(value) => CapacityLookup {
                value,
                substituted: false,
            },
            None => CapacityLookup {
                value: FALLBACK_CAPACITY,
                substituted: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_is_refused() {
        assert_eq!(
            CheckConfig::default().case_selection(),
            Err(ReconcileError::EmptyCaseSelection)
        );
    }

    #[test]
    fn zero_and_negative_capacities_fall_back() {
        let config = CheckConfig::default()
            .with_capacity("A", 0.0, -10.0)
            .with_capacity("B", f64::NAN, 100.0);
        for (section, direction) in [
            ("A", ForceDirection::Tension),
            ("A", ForceDirection::Compression),
            ("B", ForceDirection::Tension),
        ] {
            let lookup = config.capacity_for(section, direction);
            assert_eq!(lookup.value, FALLBACK_CAPACITY);
            assert!(lookup.substituted);
        }
        assert!(!config.capacity_for("B", ForceDirection::Compression).substituted);
    }

    #[test]
    fn partial_capacity_from_json() {
        let config: CheckConfig =
            serde_json::from_str(r#"{"capacities": {"P60": {"compression": 500}}}"#)
                .expect("config parses");
        assert_eq!(
            config.capacity_for("P60", ForceDirection::Compression).value,
            500.0
        );
        assert!(config.capacity_for("P60", ForceDirection::Tension).substituted);
        assert!(config.selected_cases.is_empty());
    }

    #[test]
    fn non_finite_threshold_is_rejected() {
        let config = CheckConfig::for_cases(["DL"]).with_thresholds(f64::NAN, 1.0);
        assert!(matches!(
            config.thresholds(),
            Err(ReconcileError::InvalidThreshold { name: "yellow", .. })
        ));
    }
}
