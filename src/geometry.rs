//! Fundamental geometric types for locating pile heads.

use serde::Serialize;

/// Position in three dimensional space, in the units of the exported model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    /// Coordinate along the global X axis.
    pub x: f64,
    /// Coordinate along the global Y axis.
    pub y: f64,
    /// Elevation along the global Z axis.
    pub z: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Project the point onto the ground plan by dropping its elevation.
    #[must_use]
    pub const fn plan(self) -> PlanPoint {
        PlanPoint::new(self.x, self.y)
    }
}

/// Ground-plan position of a pile head.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlanPoint {
    /// Coordinate along the global X axis.
    pub x: f64,
    /// Coordinate along the global Y axis.
    pub y: f64,
}

impl PlanPoint {
    /// Create a [`PlanPoint`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One of the two ends of a frame element.
///
/// Stations are measured from the I end, so the I end sits at station `0` and
/// the J end at station `length`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Endpoint {
    /// Start of the element.
    I,
    /// End of the element.
    J,
}

impl Endpoint {
    /// Station of this end along an element of the given length.
    ///
    /// # Examples
    /// ```
    /// use pilecheck::Endpoint;
    ///
    /// assert_eq!(Endpoint::I.station(12.5), 0.0);
    /// assert_eq!(Endpoint::J.station(12.5), 12.5);
    /// ```
    #[must_use]
    pub fn station(self, length: f64) -> f64 {
        match self {
            Endpoint::I => 0.0,
            Endpoint::J => length,
        }
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use pilecheck::point;
///
/// let head = point(10.0, 20.0, 5.0);
/// assert_eq!(head.plan().x, 10.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64, z: f64) -> Point {
    Point::new(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_drops_elevation() {
        let head = Point::new(1.0, 2.0, 3.0);
        assert_eq!(head.plan(), PlanPoint::new(1.0, 2.0));
    }

    #[test]
    fn i_end_is_station_zero() {
        assert_eq!(Endpoint::I.station(7.0), 0.0);
        assert_eq!(Endpoint::J.station(7.0), 7.0);
    }
}
