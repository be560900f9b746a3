//! Schedule network: the immutable adjacency index and its CSV loader.

mod index;
mod loader;

pub use index::{AdjacencyIndex, AdjacencyIndexBuilder, DepartureGroup, TripError};
pub use loader::{LoadError, load_schedule_csv, load_schedule_reader};
