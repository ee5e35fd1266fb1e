//! Multi-year rail ridership aggregation and station name resolution.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::table::RawTable;
use crate::types::{RailStation, StationUsage};
use crate::util::{mean, parse_count};

/// Candidate headers per semantic field, priority order.
const DATE_COLUMNS: &[&str] = &["svc_date", "svcdate", "date", "service_date", "day"];
const STOP_COLUMNS: &[&str] = &["stop_id", "stopid", "station_id", "stationid", "stop"];
const BOARDING_COLUMNS: &[&str] = &[
    "avg_boardings",
    "avg_boarding",
    "avg_daily_boardings",
    "boardings",
    "daily_boardings",
    "avg_daily",
];

/// Reduces one rail table to per-station "typical daily boardings" figures.
///
/// Rows are grouped by (date, station) and summed into daily totals, then
/// the daily totals for each station are averaged. When the table has no
/// date column every row shares a single synthetic grouping key, so the
/// aggregation degenerates to "per stop, once".
///
/// Returns `None` when the table has no recognizable stop or boardings
/// column; the caller skips it and moves on.
fn table_station_averages(table: &RawTable) -> Option<Vec<StationUsage>> {
    let stop_idx = table.column_index(STOP_COLUMNS);
    let board_idx = table.column_index(BOARDING_COLUMNS);

    let (Some(stop_idx), Some(board_idx)) = (stop_idx, board_idx) else {
        warn!(
            file = %table.path,
            "skipping rail table: no recognizable stop or boardings column"
        );
        return None;
    };

    let date_idx = table.column_index(DATE_COLUMNS);
    if date_idx.is_none() {
        debug!(file = %table.path, "no date column; aggregating per stop once");
    }

    let mut daily: BTreeMap<(String, String), f64> = BTreeMap::new();
    for row in &table.rows {
        let Some(stop) = table.field(row, stop_idx) else {
            continue;
        };
        let Some(boardings) = table.field(row, board_idx).and_then(parse_count) else {
            continue;
        };
        let date = date_idx
            .and_then(|i| table.field(row, i))
            .unwrap_or("")
            .to_string();
        *daily.entry((date, stop.to_string())).or_insert(0.0) += boardings;
    }

    let mut per_stop: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for ((_, stop), total) in daily {
        per_stop.entry(stop).or_default().push(total);
    }

    let usage: Vec<StationUsage> = per_stop
        .into_iter()
        .map(|(station_id, totals)| StationUsage {
            station_id,
            avg_daily_boardings: mean(&totals),
            source_file: table.path.clone(),
        })
        .collect();

    info!(file = %table.path, stations = usage.len(), "processed rail table");
    Some(usage)
}

/// Combines one or more yearly rail tables into a multi-year average daily
/// boardings figure per station id.
///
/// Tables missing required columns are skipped. Fails with
/// [`PipelineError::NoUsableData`] only when every table was skipped.
pub fn aggregate_rail_usage(tables: &[RawTable]) -> Result<BTreeMap<String, f64>, PipelineError> {
    let mut yearly: Vec<StationUsage> = Vec::new();
    let mut usable_tables = 0usize;

    for table in tables {
        if let Some(usage) = table_station_averages(table) {
            usable_tables += 1;
            yearly.extend(usage);
        }
    }

    if usable_tables == 0 {
        return Err(PipelineError::NoUsableData);
    }

    let mut by_station: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for usage in yearly {
        by_station
            .entry(usage.station_id)
            .or_default()
            .push(usage.avg_daily_boardings);
    }

    let combined: BTreeMap<String, f64> = by_station
        .into_iter()
        .map(|(id, figures)| (id, mean(&figures)))
        .collect();

    info!(
        stations = combined.len(),
        tables = usable_tables,
        "combined rail usage across tables"
    );
    Ok(combined)
}

/// Attaches display names to aggregated stations.
///
/// With a mapping, stations absent from it are dropped entirely — a bare
/// numeric id is not a usable name for fuzzy matching. Without a mapping the
/// raw id doubles as the name, best effort.
pub fn resolve_station_names(
    usage: &BTreeMap<String, f64>,
    mapping: Option<&BTreeMap<String, String>>,
) -> Vec<RailStation> {
    let stations: Vec<RailStation> = usage
        .iter()
        .filter_map(|(id, &avg)| {
            let name = match mapping {
                Some(map) => match map.get(id) {
                    Some(name) => name.clone(),
                    None => {
                        debug!(station_id = %id, "station absent from mapping, dropping");
                        return None;
                    }
                },
                None => id.clone(),
            };
            Some(RailStation {
                station_id: id.clone(),
                name,
                avg_boardings: avg,
                lat: None,
                lon: None,
                matched_stop_name: None,
                match_score: None,
            })
        })
        .collect();

    if mapping.is_some() {
        info!(
            mapped = stations.len(),
            total = usage.len(),
            "resolved station names via mapping"
        );
    }
    stations
}
