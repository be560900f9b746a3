//! CSV schedule ingestion.
//!
//! Reads the tabular connection export (one row per trip between adjacent
//! stops, with stop coordinates) into an [`AdjacencyIndex`].

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use super::index::{AdjacencyIndex, AdjacencyIndexBuilder, TripError};
use crate::domain::{Coordinates, TimeError, TransitTime};

/// Errors from loading a schedule file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read or a row could not be decoded
    #[error("failed to read schedule: {0}")]
    Csv(#[from] csv::Error),

    /// A departure or arrival time is malformed
    #[error("row {row}: {source}")]
    Time {
        row: usize,
        #[source]
        source: TimeError,
    },

    /// A row describes an impossible trip
    #[error("row {row}: {source}")]
    Trip {
        row: usize,
        #[source]
        source: TripError,
    },
}

/// One row of the connection export.
#[derive(Debug, Deserialize)]
struct ScheduleRecord {
    line: String,
    departure_time: String,
    arrival_time: String,
    start_stop: String,
    end_stop: String,
    start_stop_lat: f64,
    start_stop_lon: f64,
    end_stop_lat: f64,
    end_stop_lon: f64,
}

/// Load a schedule from a CSV file with a header row.
pub fn load_schedule_csv(path: impl AsRef<Path>) -> Result<AdjacencyIndex, LoadError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path.as_ref())?;
    let index = load_records(reader)?;
    info!(
        path = %path.as_ref().display(),
        stops = index.stop_count(),
        lines = index.line_count(),
        trips = index.trip_count(),
        fastest_kmh = index.fastest_speed_kmh(),
        "loaded schedule"
    );
    Ok(index)
}

/// Load a schedule from any CSV source with a header row.
pub fn load_schedule_reader(source: impl Read) -> Result<AdjacencyIndex, LoadError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);
    load_records(reader)
}

fn load_records<R: Read>(mut reader: csv::Reader<R>) -> Result<AdjacencyIndex, LoadError> {
    let mut builder = AdjacencyIndexBuilder::new();

    for (idx, record) in reader.deserialize::<ScheduleRecord>().enumerate() {
        // Header is row 1
        let row = idx + 2;
        let record = record?;

        let departure = TransitTime::parse_hhmmss(&record.departure_time)
            .map_err(|source| LoadError::Time { row, source })?;
        let arrival = TransitTime::parse_hhmmss(&record.arrival_time)
            .map_err(|source| LoadError::Time { row, source })?;

        builder.stop_at(
            &record.start_stop,
            Coordinates::new(record.start_stop_lat, record.start_stop_lon),
        );
        builder.stop_at(
            &record.end_stop,
            Coordinates::new(record.end_stop_lat, record.end_stop_lon),
        );
        match builder.add_trip(
            &record.line,
            &record.start_stop,
            &record.end_stop,
            departure,
            arrival,
        ) {
            Ok(()) => {}
            Err(source @ TripError::SameStop { .. }) => {
                warn!(row, error = %source, "skipping trip");
            }
            Err(source) => return Err(LoadError::Trip { row, source }),
        }
    }

    Ok(builder.build())
}
