//! Nearest-rail gap detection over clustered hotspots.

use std::cmp::Ordering;

use tracing::info;

use crate::types::{Candidate, Hotspot, RailStation};

/// Earth radius in miles for great-circle distance.
pub const EARTH_RADIUS_MILES: f64 = 3956.0;

/// Great-circle distance in miles between two decimal-degree coordinates
/// (haversine formula).
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_MILES * c
}

/// Promotes hotspots to candidates: busy enough, and farther than
/// `min_distance_miles` from every geocoded rail station.
///
/// With no geocoded stations at all, every sufficiently busy hotspot
/// qualifies and carries no nearest-rail information. Result is sorted by
/// bus boardings descending; the sort is stable, so equal-boardings
/// candidates keep input order.
pub fn find_gaps(
    hotspots: &[Hotspot],
    stations: &[RailStation],
    min_boardings: f64,
    min_distance_miles: f64,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for hotspot in hotspots {
        if hotspot.total_boardings < min_boardings {
            continue;
        }

        let mut nearest: Option<(&RailStation, f64)> = None;
        for station in stations {
            let (Some(lat), Some(lon)) = (station.lat, station.lon) else {
                continue;
            };
            let d = haversine_miles(hotspot.lat, hotspot.lon, lat, lon);
            if nearest.is_none_or(|(_, best)| d < best) {
                nearest = Some((station, d));
            }
        }

        if let Some((_, d)) = nearest {
            if d <= min_distance_miles {
                continue;
            }
        }

        candidates.push(Candidate {
            name: hotspot.representative_stop.clone(),
            lat: hotspot.lat,
            lon: hotspot.lon,
            bus_boardings: hotspot.total_boardings,
            nearest_rail: nearest.map(|(s, _)| s.name.clone()),
            distance_miles: nearest.map(|(_, d)| d),
            routes: hotspot.routes.clone(),
        });
    }

    candidates.sort_by(|a, b| {
        b.bus_boardings
            .partial_cmp(&a.bus_boardings)
            .unwrap_or(Ordering::Equal)
    });

    info!(
        candidates = candidates.len(),
        hotspots = hotspots.len(),
        "gap analysis complete"
    );
    candidates
}
