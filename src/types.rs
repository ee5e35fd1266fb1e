//! Value records handed between pipeline stages.
//!
//! Every type here is produced by one stage and consumed read-only by the
//! next; nothing is mutated after creation.

use serde::Serialize;

/// One "typical daily boardings" figure for a station, from a single
/// rail table. Multiple of these per station (one per year/file) are later
/// reduced to a multi-year average.
#[derive(Debug, Clone, Serialize)]
pub struct StationUsage {
    pub station_id: String,
    pub avg_daily_boardings: f64,
    pub source_file: String,
}

/// A rail station after name resolution, optionally with coordinates once
/// geocoding reconciliation has succeeded. A station that never matched a
/// bus stop keeps `lat`/`lon` as `None` and is excluded from spatial
/// analysis rather than placed at a guessed location.
#[derive(Debug, Clone, Serialize)]
pub struct RailStation {
    pub station_id: String,
    pub name: String,
    pub avg_boardings: f64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub matched_stop_name: Option<String>,
    pub match_score: Option<f64>,
}

/// One cleaned row of the bus ridership table.
#[derive(Debug, Clone)]
pub struct BusStopObservation {
    pub stop_name: String,
    pub lat: f64,
    pub lon: f64,
    pub boardings: f64,
    pub route: String,
}

/// A grid cell of bus activity: observations grouped by coordinates rounded
/// to a fixed precision, with boardings summed across the cell.
#[derive(Debug, Clone, Serialize)]
pub struct Hotspot {
    /// Rounded cell coordinates.
    pub lat: f64,
    pub lon: f64,
    pub total_boardings: f64,
    /// Most frequent raw stop name in the cell.
    pub representative_stop: String,
    /// Up to five distinct route identifiers, first-seen order.
    pub routes: Vec<String>,
}

/// A hotspot that passed both the boardings and distance thresholds.
/// `nearest_rail`/`distance_miles` are `None` only when no rail station
/// could be geocoded at all.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub bus_boardings: f64,
    pub nearest_rail: Option<String>,
    pub distance_miles: Option<f64>,
    pub routes: Vec<String>,
}
