//! Remaining-cost estimates for A*.

use crate::domain::StopId;
use crate::network::AdjacencyIndex;

/// Estimate of the remaining cost from a stop to the destination.
///
/// Both modes charge at least the elapsed time, so an estimate that never
/// exceeds the fastest possible travel time is a lower bound on either.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Heuristic {
    /// No guidance; the search is plain Dijkstra.
    None,
    /// Straight-line distance divided by a top speed. The speed is raised
    /// to the fastest trip in the index when that is faster.
    StraightLine { max_speed_kmh: f64 },
}

impl Default for Heuristic {
    fn default() -> Self {
        Heuristic::StraightLine {
            max_speed_kmh: 40.0,
        }
    }
}

impl Heuristic {
    /// Estimated seconds from `from` to `to`.
    ///
    /// Returns 0 when either stop has no coordinates.
    pub fn estimate(&self, index: &AdjacencyIndex, from: StopId, to: StopId) -> u64 {
        match *self {
            Heuristic::None => 0,
            Heuristic::StraightLine { max_speed_kmh } => {
                let speed = max_speed_kmh.max(index.fastest_speed_kmh());
                if from == to || speed <= 0.0 || speed.is_infinite() {
                    return 0;
                }
                let (Some(a), Some(b)) = (index.coords(from), index.coords(to)) else {
                    return 0;
                };
                let secs = a.distance_km(&b) / speed * 3600.0;
                // Floor keeps the estimate a lower bound
                secs.floor() as u64
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, TransitTime};
    use crate::network::AdjacencyIndexBuilder;

    fn index() -> AdjacencyIndex {
        let t = |s| TransitTime::parse_hhmmss(s).unwrap();
        let mut b = AdjacencyIndexBuilder::new();
        b.stop_at("West", Coordinates::new(0.0, 0.0));
        b.stop_at("East", Coordinates::new(0.0, 0.1));
        b.add_trip("1", "West", "East", t("08:00:00"), t("08:30:00"))
            .unwrap();
        b.stop("Unmapped");
        b.build()
    }

    #[test]
    fn straight_line_estimate() {
        let index = index();
        let west = index.stop_id("West").unwrap();
        let east = index.stop_id("East").unwrap();

        // 0.1 degree of longitude at the equator is ~11.12 km; at 40 km/h
        // that is ~1000 s
        let h = Heuristic::default().estimate(&index, west, east);
        assert!((990..=1010).contains(&h), "estimate was {h}");
    }

    #[test]
    fn zero_without_coordinates() {
        let index = index();
        let east = index.stop_id("East").unwrap();
        let unmapped = index.stop_id("Unmapped").unwrap();
        assert_eq!(Heuristic::default().estimate(&index, east, unmapped), 0);
    }

    #[test]
    fn fast_trips_raise_the_speed() {
        let t = |s| TransitTime::parse_hhmmss(s).unwrap();
        let mut b = AdjacencyIndexBuilder::new();
        b.stop_at("West", Coordinates::new(0.0, 0.0));
        b.stop_at("East", Coordinates::new(0.0, 0.1));
        // ~11.12 km in 5 minutes is ~133 km/h
        b.add_trip("R", "West", "East", t("08:00:00"), t("08:05:00"))
            .unwrap();
        let index = b.build();
        let west = index.stop_id("West").unwrap();
        let east = index.stop_id("East").unwrap();

        let h = Heuristic::default().estimate(&index, west, east);
        assert!(h <= 300, "estimate was {h}");
    }

    #[test]
    fn unmapped_trip_disables_estimate() {
        let t = |s| TransitTime::parse_hhmmss(s).unwrap();
        let mut b = AdjacencyIndexBuilder::new();
        b.stop_at("West", Coordinates::new(0.0, 0.0));
        b.stop_at("East", Coordinates::new(0.0, 0.1));
        b.add_trip("1", "West", "Unmapped", t("08:00:00"), t("08:10:00"))
            .unwrap();
        b.add_trip("1", "Unmapped", "East", t("08:10:00"), t("08:20:00"))
            .unwrap();
        let index = b.build();
        let west = index.stop_id("West").unwrap();
        let east = index.stop_id("East").unwrap();
        assert_eq!(Heuristic::default().estimate(&index, west, east), 0);
    }

    #[test]
    fn none_is_always_zero() {
        let index = index();
        let west = index.stop_id("West").unwrap();
        let east = index.stop_id("East").unwrap();
        assert_eq!(Heuristic::None.estimate(&index, west, east), 0);
    }
}
