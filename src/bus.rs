//! Bus ridership table cleaning.

use tracing::{debug, info};

use crate::error::PipelineError;
use crate::table::RawTable;
use crate::types::BusStopObservation;
use crate::util::parse_count;

const STOP_COLUMNS: &[&str] = &["stop", "stop_name", "stoplabel"];
const LAT_COLUMNS: &[&str] = &["lat", "latitude"];
const LON_COLUMNS: &[&str] = &["lon", "lng", "longitude", "long"];
const BOARDING_COLUMNS: &[&str] = &[
    "sum_passengers_on",
    "sum_on",
    "passengers_on",
    "sum_boardings",
    "sum_passengers",
];
const ROUTE_COLUMNS: &[&str] = &["route_name", "route", "route_id"];

/// Cleans the bus table into observations.
///
/// Rows with missing or non-numeric coordinates or boardings are dropped.
/// The route column is optional; observations without one carry an empty
/// route string. Unlike rail tables, a bus table missing a required column
/// is fatal — there is exactly one bus input and nothing to fall back to.
pub fn observations(table: &RawTable) -> Result<Vec<BusStopObservation>, PipelineError> {
    let required = |candidates: &[&str], field: &'static str| {
        table
            .column_index(candidates)
            .ok_or(PipelineError::MissingRequiredColumn {
                path: table.path.clone(),
                field,
            })
    };

    let stop_idx = required(STOP_COLUMNS, "stop")?;
    let lat_idx = required(LAT_COLUMNS, "latitude")?;
    let lon_idx = required(LON_COLUMNS, "longitude")?;
    let board_idx = required(BOARDING_COLUMNS, "boardings")?;
    let route_idx = table.column_index(ROUTE_COLUMNS);

    let mut dropped = 0usize;
    let mut cleaned = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let stop_name = table.field(row, stop_idx).unwrap_or("").to_string();
        let lat = table.field(row, lat_idx).and_then(|v| v.parse::<f64>().ok());
        let lon = table.field(row, lon_idx).and_then(|v| v.parse::<f64>().ok());
        let boardings = table.field(row, board_idx).and_then(parse_count);

        let (Some(lat), Some(lon), Some(boardings)) = (lat, lon, boardings) else {
            dropped += 1;
            continue;
        };
        if !lat.is_finite() || !lon.is_finite() {
            dropped += 1;
            continue;
        }

        let route = route_idx
            .and_then(|i| table.field(row, i))
            .unwrap_or("")
            .to_string();

        cleaned.push(BusStopObservation {
            stop_name,
            lat,
            lon,
            boardings,
            route,
        });
    }

    if dropped > 0 {
        debug!(dropped, "dropped bus rows with unusable coordinates or boardings");
    }
    info!(file = %table.path, rows = cleaned.len(), "loaded bus observations");
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::StringRecord;

    fn bus_table(rows: &[&[&str]]) -> RawTable {
        RawTable {
            path: "bus.csv".to_string(),
            columns: ["STOP", "LAT", "LON", "SUM_PASSENGERS_ON", "ROUTE_NAME"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows: rows.iter().map(|r| StringRecord::from(r.to_vec())).collect(),
        }
    }

    #[test]
    fn test_clean_rows_pass_through() {
        let t = bus_table(&[&["Main St & 1st Ave", "38.9", "-77.03", "250", "42"]]);
        let obs = observations(&t).unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].stop_name, "Main St & 1st Ave");
        assert_eq!(obs[0].boardings, 250.0);
        assert_eq!(obs[0].route, "42");
    }

    #[test]
    fn test_rows_with_bad_coordinates_dropped() {
        let t = bus_table(&[
            &["Good", "38.9", "-77.03", "100", "A"],
            &["No lat", "", "-77.03", "100", "A"],
            &["Text lat", "north", "-77.03", "100", "A"],
        ]);
        let obs = observations(&t).unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].stop_name, "Good");
    }

    #[test]
    fn test_thousands_separator_in_boardings() {
        let t = bus_table(&[&["Busy Stop", "38.9", "-77.03", "1,500", "7"]]);
        let obs = observations(&t).unwrap();
        assert_eq!(obs[0].boardings, 1500.0);
    }

    #[test]
    fn test_missing_required_column_is_error() {
        let t = RawTable {
            path: "bus.csv".to_string(),
            columns: vec!["STOP".to_string(), "SUM_PASSENGERS_ON".to_string()],
            rows: vec![],
        };
        let err = observations(&t).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingRequiredColumn {
                field: "latitude",
                ..
            }
        ));
    }
}
