//! Geocoding reconciliation: infer rail station coordinates by fuzzy-matching
//! station names against bus stop names.
//!
//! Rail ridership tables carry no coordinates and the two datasets follow
//! independent naming conventions, so an exact join is hopeless. Instead each
//! station name is compared against every distinct bus stop name with a
//! token-overlap-gated similarity ratio; token overlap keeps short common
//! words ("Center", "Street") from producing high-scoring matches between
//! unrelated names.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::Thresholds;
use crate::types::{BusStopObservation, RailStation};

/// One distinct bus stop name with averaged coordinates and summed
/// boardings, the candidate pool for matching.
#[derive(Debug, Clone)]
pub struct StopSite {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub boardings: f64,
}

/// Groups observations by exact stop name into the matching candidate pool.
/// Built once and reused for every rail station.
pub fn aggregate_stop_sites(observations: &[BusStopObservation]) -> Vec<StopSite> {
    struct Acc {
        lat_sum: f64,
        lon_sum: f64,
        count: usize,
        boardings: f64,
    }

    let mut order: Vec<String> = Vec::new();
    let mut acc: HashMap<String, Acc> = HashMap::new();

    for obs in observations {
        if obs.stop_name.is_empty() {
            continue;
        }
        let entry = acc.entry(obs.stop_name.clone()).or_insert_with(|| {
            order.push(obs.stop_name.clone());
            Acc {
                lat_sum: 0.0,
                lon_sum: 0.0,
                count: 0,
                boardings: 0.0,
            }
        });
        entry.lat_sum += obs.lat;
        entry.lon_sum += obs.lon;
        entry.count += 1;
        entry.boardings += obs.boardings;
    }

    order
        .into_iter()
        .map(|name| {
            let a = &acc[&name];
            StopSite {
                lat: a.lat_sum / a.count as f64,
                lon: a.lon_sum / a.count as f64,
                boardings: a.boardings,
                name,
            }
        })
        .collect()
}

/// Splits a name on non-alphanumeric characters, lowercased, discarding
/// tokens of length <= 1.
fn tokens(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(str::to_lowercase)
        .collect()
}

/// Case-insensitive similarity ratio in [0, 1], symmetric on case-folded
/// strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(&a.to_lowercase(), &b.to_lowercase())
}

/// Assigns coordinates to rail stations by fuzzy-matching their names
/// against the bus stop pool.
///
/// A stop is accepted as a candidate match when it shares a token with the
/// station name and scores above `match_similarity`, or scores above
/// `match_similarity_no_token` regardless of tokens. The highest-scoring
/// accepted stop wins, first encountered on ties. Stations with no accepted
/// match are dropped — a wrong placement is worse than an absent one.
pub fn locate(
    stations: &[RailStation],
    observations: &[BusStopObservation],
    thresholds: &Thresholds,
) -> Vec<RailStation> {
    let sites = aggregate_stop_sites(observations);
    let site_tokens: Vec<Vec<String>> = sites.iter().map(|s| tokens(&s.name)).collect();

    let mut located = Vec::with_capacity(stations.len());
    for station in stations {
        let station_tokens = tokens(&station.name);

        let mut best: Option<(usize, f64)> = None;
        for (i, site) in sites.iter().enumerate() {
            let ratio = similarity(&station.name, &site.name);
            let overlap = station_tokens
                .iter()
                .any(|t| site_tokens[i].contains(t));

            let accepted = (overlap && ratio > thresholds.match_similarity)
                || ratio > thresholds.match_similarity_no_token;
            // strict > keeps the first-encountered site on score ties
            if accepted && best.is_none_or(|(_, b)| ratio > b) {
                best = Some((i, ratio));
            }
        }

        match best {
            Some((i, score)) => {
                let site = &sites[i];
                located.push(RailStation {
                    lat: Some(site.lat),
                    lon: Some(site.lon),
                    matched_stop_name: Some(site.name.clone()),
                    match_score: Some(score),
                    ..station.clone()
                });
            }
            None => {
                debug!(
                    station = %station.name,
                    "no acceptable bus stop match; excluded from spatial analysis"
                );
            }
        }
    }

    info!(
        located = located.len(),
        total = stations.len(),
        "inferred rail station coordinates via bus stop matching"
    );
    located
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(name: &str, lat: f64, lon: f64, boardings: f64) -> BusStopObservation {
        BusStopObservation {
            stop_name: name.to_string(),
            lat,
            lon,
            boardings,
            route: String::new(),
        }
    }

    fn station(name: &str) -> RailStation {
        RailStation {
            station_id: name.to_string(),
            name: name.to_string(),
            avg_boardings: 1000.0,
            lat: None,
            lon: None,
            matched_stop_name: None,
            match_score: None,
        }
    }

    #[test]
    fn test_stop_sites_average_coordinates_and_sum_boardings() {
        let sites = aggregate_stop_sites(&[
            obs("Main St", 38.0, -77.0, 100.0),
            obs("Main St", 40.0, -75.0, 50.0),
            obs("Oak Ave", 39.0, -76.0, 10.0),
        ]);
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].name, "Main St");
        assert_eq!(sites[0].lat, 39.0);
        assert_eq!(sites[0].lon, -76.0);
        assert_eq!(sites[0].boardings, 150.0);
    }

    #[test]
    fn test_tokens_drop_short_and_split_on_punctuation() {
        assert_eq!(tokens("King St-Old Town"), vec!["king", "st", "old", "town"]);
        assert_eq!(tokens("L'Enfant Plaza"), vec!["enfant", "plaza"]);
    }

    #[test]
    fn test_similarity_symmetric_and_bounded() {
        let a = similarity("Union Station", "union sta plaza");
        let b = similarity("union sta plaza", "Union Station");
        assert_eq!(a, b);
        assert!((0.0..=1.0).contains(&a));
        assert_eq!(similarity("Rosslyn", "ROSSLYN"), 1.0);
    }

    #[test]
    fn test_token_overlap_with_decent_similarity_matches() {
        let stations = [station("Union Station")];
        let observations = [obs("Union Sta Plaza", 38.8977, -77.0064, 900.0)];

        let located = locate(&stations, &observations, &Thresholds::default());
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].matched_stop_name.as_deref(), Some("Union Sta Plaza"));
        assert_eq!(located[0].lat, Some(38.8977));
        assert!(located[0].match_score.unwrap() > 0.6);
    }

    #[test]
    fn test_shared_common_word_alone_does_not_match() {
        let stations = [station("Court House")];
        let observations = [obs("House of Pizza", 38.9, -77.1, 400.0)];

        let located = locate(&stations, &observations, &Thresholds::default());
        assert!(located.is_empty());
    }

    #[test]
    fn test_unmatched_station_never_gets_a_coordinate() {
        let stations = [station("Glenmont"), station("Wheaton")];
        let observations = [obs("Glenmont Station & Bus Bay", 39.0617, -77.0535, 500.0)];

        let located = locate(&stations, &observations, &Thresholds::default());
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].station_id, "Glenmont");
        // Wheaton is absent entirely rather than carrying a guessed position.
        assert!(!located.iter().any(|s| s.station_id == "Wheaton"));
    }

    #[test]
    fn test_best_of_multiple_candidates_wins() {
        let stations = [station("Fort Totten")];
        let observations = [
            obs("Totten Rd & Main", 38.95, -77.00, 10.0),
            obs("Fort Totten Station", 38.9518, -77.0022, 800.0),
        ];

        let located = locate(&stations, &observations, &Thresholds::default());
        assert_eq!(located.len(), 1);
        assert_eq!(
            located[0].matched_stop_name.as_deref(),
            Some("Fort Totten Station")
        );
    }
}
