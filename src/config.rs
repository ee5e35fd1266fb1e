//! Run configuration: analysis thresholds and the optional station mapping.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Tuned analysis thresholds. The similarity cutoffs and rounding precision
/// are heuristics without a formal justification; they are carried here
/// rather than as literals so they can be retuned per dataset.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Minimum summed boardings for a grid cell to be kept as a hotspot.
    pub hotspot_min_boardings: f64,
    /// Minimum boardings for a hotspot to be promoted to candidate.
    pub candidate_min_boardings: f64,
    /// Minimum distance from any rail station to qualify as a gap.
    pub min_distance_miles: f64,
    /// Coordinate rounding precision for clustering; 4 decimals is roughly
    /// an 11 m grid cell.
    pub hotspot_round_decimals: i32,
    /// Similarity floor when station and stop share at least one token.
    pub match_similarity: f64,
    /// Similarity floor when they share no token at all.
    pub match_similarity_no_token: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            hotspot_min_boardings: 100.0,
            candidate_min_boardings: 500.0,
            min_distance_miles: 1.0,
            hotspot_round_decimals: 4,
            match_similarity: 0.6,
            match_similarity_no_token: 0.78,
        }
    }
}

/// Loads the optional station-id-to-display-name mapping from a JSON object
/// (`{"A01": "Metro Center", ...}`). Absence of the file is handled by the
/// caller simply not calling this; a present-but-broken file is an error.
pub fn load_station_mapping(path: &Path) -> Result<BTreeMap<String, String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read station mapping {}", path.display()))?;
    let mapping: BTreeMap<String, String> = serde_json::from_str(&raw)
        .with_context(|| format!("station mapping {} is not a JSON object", path.display()))?;

    info!(path = %path.display(), entries = mapping.len(), "loaded station mapping");
    Ok(mapping)
}
