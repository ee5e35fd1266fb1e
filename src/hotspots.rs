//! Spatial clustering of bus observations by coordinate rounding.

use std::collections::HashMap;

use tracing::info;

use crate::types::{BusStopObservation, Hotspot};

/// Route identifiers kept per hotspot.
const MAX_ROUTES: usize = 5;

#[derive(Default)]
struct Cell {
    total_boardings: f64,
    /// (raw stop name, occurrences), first-seen order.
    name_counts: Vec<(String, usize)>,
    routes: Vec<String>,
}

/// Groups observations into grid cells by rounding latitude and longitude
/// independently to `round_decimals` digits, then drops cells whose summed
/// boardings fall below `min_boardings`.
///
/// The default precision of 4 decimals (~11 m cells) merges near-duplicate
/// records of the same physical stop without merging genuinely distinct
/// stops. Output keeps cell insertion order; ranking happens downstream.
pub fn cluster(
    observations: &[BusStopObservation],
    round_decimals: i32,
    min_boardings: f64,
) -> Vec<Hotspot> {
    let scale = 10f64.powi(round_decimals);

    let mut order: Vec<(i64, i64)> = Vec::new();
    let mut cells: HashMap<(i64, i64), Cell> = HashMap::new();

    for obs in observations {
        let key = (
            (obs.lat * scale).round() as i64,
            (obs.lon * scale).round() as i64,
        );
        let cell = cells.entry(key).or_insert_with(|| {
            order.push(key);
            Cell::default()
        });

        cell.total_boardings += obs.boardings;

        match cell
            .name_counts
            .iter_mut()
            .find(|(name, _)| *name == obs.stop_name)
        {
            Some((_, count)) => *count += 1,
            None => cell.name_counts.push((obs.stop_name.clone(), 1)),
        }

        if !obs.route.is_empty()
            && cell.routes.len() < MAX_ROUTES
            && !cell.routes.contains(&obs.route)
        {
            cell.routes.push(obs.route.clone());
        }
    }

    let total_cells = order.len();
    let hotspots: Vec<Hotspot> = order
        .into_iter()
        .filter_map(|key| {
            let cell = cells.remove(&key)?;
            if cell.total_boardings < min_boardings {
                return None;
            }
            // most frequent name wins; strict > keeps the first seen on ties
            let representative = cell
                .name_counts
                .iter()
                .fold(None::<(&str, usize)>, |best, (name, count)| match best {
                    Some((_, c)) if *count <= c => best,
                    _ => Some((name, *count)),
                })
                .map(|(name, _)| name.to_string())
                .unwrap_or_default();

            Some(Hotspot {
                lat: key.0 as f64 / scale,
                lon: key.1 as f64 / scale,
                total_boardings: cell.total_boardings,
                representative_stop: representative,
                routes: cell.routes,
            })
        })
        .collect();

    info!(
        hotspots = hotspots.len(),
        cells = total_cells,
        min_boardings,
        "clustered bus observations"
    );
    hotspots
}
