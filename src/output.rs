//! Result export: candidate CSV, run summary JSON, and the console report.

use std::fs::File;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info};

use crate::types::{Candidate, Hotspot, RailStation};

/// Flat CSV row for a candidate; routes are joined since CSV has no nesting.
#[derive(Serialize)]
struct CandidateRow<'a> {
    name: &'a str,
    lat: f64,
    lon: f64,
    bus_boardings: f64,
    nearest_rail: Option<&'a str>,
    distance_miles: Option<f64>,
    routes: String,
}

impl<'a> CandidateRow<'a> {
    fn from_candidate(c: &'a Candidate) -> Self {
        CandidateRow {
            name: &c.name,
            lat: c.lat,
            lon: c.lon,
            bus_boardings: c.bus_boardings,
            nearest_rail: c.nearest_rail.as_deref(),
            distance_miles: c.distance_miles,
            routes: c.routes.iter().join(", "),
        }
    }
}

/// Writes the ranked candidate list as a CSV file.
pub fn write_candidates_csv(path: &Path, candidates: &[Candidate]) -> Result<()> {
    debug!(path = %path.display(), rows = candidates.len(), "writing candidate CSV");

    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for candidate in candidates {
        writer.serialize(CandidateRow::from_candidate(candidate))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the geocoding audit trail: which bus stop each rail station
/// matched and at what score.
pub fn write_matches_csv(path: &Path, stations: &[RailStation]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for station in stations {
        writer.serialize(station)?;
    }
    writer.flush()?;
    Ok(())
}

/// Counts carried through the run, exported alongside the results so a
/// skipped file or an unmatched station is auditable after the fact.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub rail_tables_read: usize,
    pub rail_tables_skipped: usize,
    pub stations_aggregated: usize,
    pub stations_named: usize,
    pub stations_located: usize,
    pub bus_rows: usize,
    pub hotspots: usize,
    pub candidates: usize,
}

/// Writes the run summary as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(summary)?)?;
    Ok(())
}

/// Logs the top candidates in ranked order. Zero candidates is a valid
/// outcome and is reported as such, distinct from a pipeline failure.
pub fn report_candidates(candidates: &[Candidate], top: usize) {
    if candidates.is_empty() {
        info!("no candidates found with current thresholds");
        return;
    }

    for (rank, c) in candidates.iter().take(top).enumerate() {
        info!(
            rank = rank + 1,
            name = %c.name,
            bus_boardings = c.bus_boardings,
            nearest_rail = c.nearest_rail.as_deref().unwrap_or("none"),
            distance_miles = c.distance_miles,
            routes = %c.routes.iter().join(", "),
            "candidate"
        );
    }
}

/// Writes the hotspot list as CSV, used by the cluster-only subcommand.
pub fn write_hotspots_csv(path: &Path, hotspots: &[Hotspot]) -> Result<()> {
    #[derive(Serialize)]
    struct HotspotRow<'a> {
        lat: f64,
        lon: f64,
        total_boardings: f64,
        representative_stop: &'a str,
        routes: String,
    }

    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for h in hotspots {
        writer.serialize(HotspotRow {
            lat: h.lat,
            lon: h.lon,
            total_boardings: h.total_boardings,
            representative_stop: &h.representative_stop,
            routes: h.routes.iter().join(", "),
        })?;
    }
    writer.flush()?;
    Ok(())
}
