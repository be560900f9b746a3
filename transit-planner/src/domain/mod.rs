//! Domain types for the transit planner.
//!
//! Identifiers, times and itinerary pieces shared by the network index, the
//! search engine and the web layer. Types validate on construction so code
//! receiving them can trust their values.

mod ride;
mod stop;
mod time;

pub use ride::{Hop, Ride, group_hops, transfer_waits};
pub use stop::{Coordinates, LineId, Stop, StopId};
pub use time::{TimeError, TransitTime};
