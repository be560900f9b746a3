//! Hop and ride types.
//!
//! A `Hop` is one scheduled trip between two adjacent stops. A `Ride` is a
//! run of consecutive hops on the same line without getting off, which is
//! what a rider thinks of as "taking line 7 from A to D".

use chrono::Duration;

use super::{LineId, StopId, TransitTime};

/// One scheduled departure-to-arrival run of a line between two stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hop {
    pub line: LineId,
    pub from: StopId,
    pub to: StopId,
    pub departure: TransitTime,
    pub arrival: TransitTime,
}

/// Consecutive hops on one line merged into a single ride.
///
/// # Invariants
///
/// - `board_time <= alight_time`
/// - `hops >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ride {
    pub line: LineId,
    pub board: StopId,
    pub board_time: TransitTime,
    pub alight: StopId,
    pub alight_time: TransitTime,
    pub hops: usize,
}

impl Ride {
    fn start(hop: &Hop) -> Self {
        Self {
            line: hop.line,
            board: hop.from,
            board_time: hop.departure,
            alight: hop.to,
            alight_time: hop.arrival,
            hops: 1,
        }
    }

    fn extend(&mut self, hop: &Hop) {
        self.alight = hop.to;
        self.alight_time = hop.arrival;
        self.hops += 1;
    }

    /// Time spent aboard, from boarding to alighting.
    pub fn ride_time(&self) -> Duration {
        self.alight_time.signed_duration_since(self.board_time)
    }
}

/// Group hops into rides.
///
/// Each item is a hop plus whether reaching it required a transfer. A new
/// ride starts whenever the line changes or the hop was a transfer (which
/// covers reversing onto the same line).
///
/// # Examples
///
/// ```
/// use transit_planner::domain::{group_hops, Hop, TransitTime};
/// # use transit_planner::network::AdjacencyIndexBuilder;
/// # let mut b = AdjacencyIndexBuilder::new();
/// # let t = |s| TransitTime::parse_hhmmss(s).unwrap();
/// # b.add_trip("L1", "A", "B", t("08:00:00"), t("08:05:00")).unwrap();
/// # b.add_trip("L1", "B", "C", t("08:06:00"), t("08:10:00")).unwrap();
/// # let index = b.build();
/// # let (a, bb, c) = (index.stop_id("A").unwrap(), index.stop_id("B").unwrap(), index.stop_id("C").unwrap());
/// # let line = index.line_id("L1").unwrap();
/// let hops = [
///     Hop { line, from: a, to: bb, departure: t("08:00:00"), arrival: t("08:05:00") },
///     Hop { line, from: bb, to: c, departure: t("08:06:00"), arrival: t("08:10:00") },
/// ];
/// let rides = group_hops(hops.iter().map(|h| (h, false)));
/// assert_eq!(rides.len(), 1);
/// assert_eq!(rides[0].hops, 2);
/// ```
pub fn group_hops<'a>(hops: impl IntoIterator<Item = (&'a Hop, bool)>) -> Vec<Ride> {
    let mut rides: Vec<Ride> = Vec::new();

    for (hop, transfer) in hops {
        match rides.last_mut() {
            Some(ride) if ride.line == hop.line && !transfer => ride.extend(hop),
            _ => rides.push(Ride::start(hop)),
        }
    }

    rides
}

/// Waiting time between alighting one ride and boarding the next.
pub fn transfer_waits(rides: &[Ride]) -> Vec<Duration> {
    rides
        .windows(2)
        .map(|pair| pair[1].board_time.signed_duration_since(pair[0].alight_time))
        .collect()
}
