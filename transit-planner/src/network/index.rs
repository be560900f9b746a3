//! Adjacency index over the schedule.
//!
//! For every stop the index keeps the trips departing it, grouped by
//! `(line, next stop)`. Each group is sorted by departure time, which lets
//! the search engine jump straight to the earliest catchable departure with
//! a binary search: a later departure in the same group never arrives
//! earlier, so it never needs to be looked at.

use std::collections::HashMap;

use crate::domain::{Coordinates, LineId, Stop, StopId, TransitTime};

/// Error returned when a trip cannot be added to the index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TripError {
    /// The trip arrives before it departs
    #[error("trip on line {line} from {from} to {to} arrives before it departs")]
    ArrivalBeforeDeparture {
        line: String,
        from: String,
        to: String,
    },

    /// The trip starts and ends at the same stop
    #[error("trip on line {line} starts and ends at {stop}")]
    SameStop { line: String, stop: String },
}

/// Trips of one line from one stop to one next stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureGroup {
    pub line: LineId,
    pub destination: StopId,
    /// `(departure, arrival)` pairs sorted ascending by departure.
    times: Vec<(TransitTime, TransitTime)>,
}

impl DepartureGroup {
    /// The earliest trip departing at or after `ready`.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_planner::domain::TransitTime;
    /// use transit_planner::network::AdjacencyIndexBuilder;
    ///
    /// let t = |s| TransitTime::parse_hhmmss(s).unwrap();
    /// let mut builder = AdjacencyIndexBuilder::new();
    /// builder.add_trip("L1", "A", "B", t("08:30:00"), t("08:40:00")).unwrap();
    /// builder.add_trip("L1", "A", "B", t("08:00:00"), t("08:10:00")).unwrap();
    /// let index = builder.build();
    ///
    /// let a = index.stop_id("A").unwrap();
    /// let group = &index.departures(a)[0];
    /// assert_eq!(group.earliest_from(t("08:05:00")), Some((t("08:30:00"), t("08:40:00"))));
    /// assert_eq!(group.earliest_from(t("09:00:00")), None);
    /// ```
    pub fn earliest_from(&self, ready: TransitTime) -> Option<(TransitTime, TransitTime)> {
        let idx = self.times.partition_point(|(dep, _)| *dep < ready);
        self.times.get(idx).copied()
    }

    /// All `(departure, arrival)` pairs, sorted by departure.
    pub fn times(&self) -> &[(TransitTime, TransitTime)] {
        &self.times
    }
}

/// Immutable schedule snapshot: stops, lines and grouped departures.
///
/// Built once through [`AdjacencyIndexBuilder`] and shared read-only
/// (usually behind an `Arc`) by every planning session.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    stops: Vec<Stop>,
    stop_ids: HashMap<String, StopId>,
    lines: Vec<String>,
    line_ids: HashMap<String, LineId>,
    /// Departure groups per stop, indexed by `StopId`.
    departures: Vec<Vec<DepartureGroup>>,
    trip_count: usize,
    fastest_speed_kmh: f64,
}

impl AdjacencyIndex {
    /// Look up a stop by its exact name.
    pub fn stop_id(&self, name: &str) -> Option<StopId> {
        self.stop_ids.get(name).copied()
    }

    /// Look up a line by its exact name.
    pub fn line_id(&self, name: &str) -> Option<LineId> {
        self.line_ids.get(name).copied()
    }

    /// Returns true if `stop` belongs to this index.
    pub fn contains(&self, stop: StopId) -> bool {
        stop.index() < self.stops.len()
    }

    pub fn stop(&self, stop: StopId) -> Option<&Stop> {
        self.stops.get(stop.index())
    }

    pub fn stop_name(&self, stop: StopId) -> Option<&str> {
        self.stop(stop).map(|s| s.name.as_str())
    }

    pub fn line_name(&self, line: LineId) -> Option<&str> {
        self.lines.get(line.index()).map(String::as_str)
    }

    /// Coordinates of a stop, if the schedule provided them.
    pub fn coords(&self, stop: StopId) -> Option<Coordinates> {
        self.stop(stop).and_then(|s| s.coords)
    }

    /// Departure groups leaving `stop`. Empty for unknown stops.
    pub fn departures(&self, stop: StopId) -> &[DepartureGroup] {
        self.departures
            .get(stop.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn trip_count(&self) -> usize {
        self.trip_count
    }

    /// Fastest straight-line speed of any trip, in km/h.
    ///
    /// Infinite when a trip touches a stop without coordinates or covers
    /// ground in zero time: nothing then bounds how fast the network moves.
    pub fn fastest_speed_kmh(&self) -> f64 {
        self.fastest_speed_kmh
    }

    /// Search stops whose name contains `query` (case-insensitive).
    ///
    /// Exact matches come first, then prefix matches, then the rest; ties
    /// are alphabetical.
    pub fn search_stops(&self, query: &str, limit: usize) -> Vec<(StopId, &str)> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(u8, StopId, &str)> = self
            .stops
            .iter()
            .enumerate()
            .filter_map(|(idx, stop)| {
                let lower = stop.name.to_lowercase();
                let rank = if lower == needle {
                    0
                } else if lower.starts_with(&needle) {
                    1
                } else if lower.contains(&needle) {
                    2
                } else {
                    return None;
                };
                Some((rank, StopId(idx as u32), stop.name.as_str()))
            })
            .collect();

        matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.2.cmp(b.2)));
        matches.truncate(limit);
        matches.into_iter().map(|(_, id, name)| (id, name)).collect()
    }
}

/// Builder for an [`AdjacencyIndex`].
#[derive(Debug, Default)]
pub struct AdjacencyIndexBuilder {
    stops: Vec<Stop>,
    stop_ids: HashMap<String, StopId>,
    lines: Vec<String>,
    line_ids: HashMap<String, LineId>,
    groups: Vec<HashMap<(LineId, StopId), Vec<(TransitTime, TransitTime)>>>,
    trip_count: usize,
}

impl AdjacencyIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a stop by name, returning its id.
    pub fn stop(&mut self, name: &str) -> StopId {
        if let Some(id) = self.stop_ids.get(name) {
            return *id;
        }
        let id = StopId(self.stops.len() as u32);
        self.stops.push(Stop {
            name: name.to_string(),
            coords: None,
        });
        self.groups.push(HashMap::new());
        self.stop_ids.insert(name.to_string(), id);
        id
    }

    /// Intern a stop and record its coordinates.
    ///
    /// The first coordinates recorded for a stop win.
    pub fn stop_at(&mut self, name: &str, coords: Coordinates) -> StopId {
        let id = self.stop(name);
        let stop = &mut self.stops[id.index()];
        if stop.coords.is_none() {
            stop.coords = Some(coords);
        }
        id
    }

    fn line(&mut self, name: &str) -> LineId {
        if let Some(id) = self.line_ids.get(name) {
            return *id;
        }
        let id = LineId(self.lines.len() as u32);
        self.lines.push(name.to_string());
        self.line_ids.insert(name.to_string(), id);
        id
    }

    /// Add one scheduled trip between two adjacent stops.
    pub fn add_trip(
        &mut self,
        line: &str,
        from: &str,
        to: &str,
        departure: TransitTime,
        arrival: TransitTime,
    ) -> Result<(), TripError> {
        if arrival < departure {
            return Err(TripError::ArrivalBeforeDeparture {
                line: line.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if from == to {
            return Err(TripError::SameStop {
                line: line.to_string(),
                stop: from.to_string(),
            });
        }

        let line = self.line(line);
        let from = self.stop(from);
        let to = self.stop(to);
        self.groups[from.index()]
            .entry((line, to))
            .or_default()
            .push((departure, arrival));
        self.trip_count += 1;
        Ok(())
    }

    fn fastest_speed_kmh(&self) -> f64 {
        let mut fastest: f64 = 0.0;
        for (from, groups) in self.groups.iter().enumerate() {
            for (&(_, to), times) in groups {
                let (Some(a), Some(b)) = (self.stops[from].coords, self.stops[to.index()].coords)
                else {
                    return f64::INFINITY;
                };
                let km = a.distance_km(&b);
                for (departure, arrival) in times {
                    let secs = arrival.seconds_since(*departure);
                    if secs == 0 {
                        if km > 0.0 {
                            return f64::INFINITY;
                        }
                        continue;
                    }
                    fastest = fastest.max(km / f64::from(secs) * 3600.0);
                }
            }
        }
        fastest
    }

    /// Sort every group and freeze the index.
    pub fn build(self) -> AdjacencyIndex {
        let fastest_speed_kmh = self.fastest_speed_kmh();
        let departures = self
            .groups
            .into_iter()
            .map(|groups| {
                let mut groups: Vec<DepartureGroup> = groups
                    .into_iter()
                    .map(|((line, destination), mut times)| {
                        times.sort_unstable();
                        times.dedup();
                        DepartureGroup {
                            line,
                            destination,
                            times,
                        }
                    })
                    .collect();
                groups.sort_by_key(|g| (g.line, g.destination));
                groups
            })
            .collect();

        AdjacencyIndex {
            stops: self.stops,
            stop_ids: self.stop_ids,
            lines: self.lines,
            line_ids: self.line_ids,
            departures,
            trip_count: self.trip_count,
            fastest_speed_kmh,
        }
    }
}
