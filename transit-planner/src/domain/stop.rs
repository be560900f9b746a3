//! Stop and line identifiers.
//!
//! Stop and line names are interned by the `AdjacencyIndex` that owns them.
//! The ids are only meaningful together with that index.

use std::fmt;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Index of a stop inside an `AdjacencyIndex`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StopId(pub(crate) u32);

impl StopId {
    /// Returns the position of the stop in its index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

/// Index of a line inside an `AdjacencyIndex`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId(pub(crate) u32);

impl LineId {
    /// Returns the position of the line in its index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineId({})", self.0)
    }
}

/// Latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in kilometres (haversine formula).
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_planner::domain::Coordinates;
    ///
    /// let a = Coordinates::new(51.1, 17.0);
    /// assert_eq!(a.distance_km(&a), 0.0);
    /// ```
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// A named location in the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub name: String,
    /// Missing when the schedule did not provide a position.
    pub coords: Option<Coordinates>,
}
