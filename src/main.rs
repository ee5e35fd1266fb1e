//! CLI entry point for the rail gap analyzer.
//!
//! Provides subcommands for running the full bus-vs-rail gap analysis,
//! clustering bus hotspots on their own, and auditing the fuzzy
//! station-to-stop matching.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use railgap::config::{Thresholds, load_station_mapping};
use railgap::output::{
    RunSummary, report_candidates, write_candidates_csv, write_hotspots_csv, write_matches_csv,
    write_summary_json,
};
use railgap::table::RawTable;
use railgap::types::RailStation;
use railgap::{bus, gaps, geocode, hotspots, rail, render};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "railgap")]
#[command(about = "Suggest new rail station sites from bus ridership hotspots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ThresholdArgs {
    /// Minimum aggregated boardings for a hotspot to be retained
    #[arg(long, default_value_t = 100.0)]
    hotspot_min_boardings: f64,

    /// Minimum boardings for a hotspot to be promoted to candidate
    #[arg(long, default_value_t = 500.0)]
    candidate_min_boardings: f64,

    /// Minimum distance from any rail station to qualify as a gap
    #[arg(long, default_value_t = 1.0)]
    min_distance_miles: f64,

    /// Coordinate rounding precision for hotspot clustering
    #[arg(long, default_value_t = 4)]
    round_decimals: i32,
}

impl ThresholdArgs {
    fn to_thresholds(&self) -> Thresholds {
        Thresholds {
            hotspot_min_boardings: self.hotspot_min_boardings,
            candidate_min_boardings: self.candidate_min_boardings,
            min_distance_miles: self.min_distance_miles,
            hotspot_round_decimals: self.round_decimals,
            ..Thresholds::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full gap analysis and write the map, candidate CSV, and summary
    Analyze {
        /// Rail ridership CSV files, one per year
        #[arg(long = "rail", value_name = "FILE", required = true, num_args = 1..)]
        rail: Vec<PathBuf>,

        /// Bus stop/route ridership CSV
        #[arg(long, value_name = "FILE")]
        bus: PathBuf,

        /// Optional JSON file mapping station ids to display names
        #[arg(long, value_name = "FILE")]
        stations: Option<PathBuf>,

        /// Directory for the map, candidate CSV, and run summary
        #[arg(short, long, default_value = "out")]
        output_dir: PathBuf,

        /// Maximum number of candidates to keep
        #[arg(long, default_value_t = 50)]
        top: usize,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },
    /// Cluster the bus table into hotspots and write them as CSV
    Hotspots {
        /// Bus stop/route ridership CSV
        #[arg(long, value_name = "FILE")]
        bus: PathBuf,

        /// Output CSV path
        #[arg(short, long, default_value = "hotspots.csv")]
        output: PathBuf,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },
    /// Audit the fuzzy station-to-stop matching without running gap analysis
    MatchStations {
        /// Rail ridership CSV files, one per year
        #[arg(long = "rail", value_name = "FILE", required = true, num_args = 1..)]
        rail: Vec<PathBuf>,

        /// Bus stop/route ridership CSV
        #[arg(long, value_name = "FILE")]
        bus: PathBuf,

        /// Optional JSON file mapping station ids to display names
        #[arg(long, value_name = "FILE")]
        stations: Option<PathBuf>,

        /// Output CSV path for the match audit
        #[arg(short, long, default_value = "matches.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/railgap.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("railgap.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            rail,
            bus,
            stations,
            output_dir,
            top,
            thresholds,
        } => run_analyze(
            &rail,
            &bus,
            stations.as_deref(),
            &output_dir,
            top,
            &thresholds.to_thresholds(),
        ),
        Commands::Hotspots {
            bus,
            output,
            thresholds,
        } => run_hotspots(&bus, &output, &thresholds.to_thresholds()),
        Commands::MatchStations {
            rail,
            bus,
            stations,
            output,
        } => run_match_stations(&rail, &bus, stations.as_deref(), &output),
    }
}

/// Reads the rail tables, skipping (and counting) unreadable files.
fn read_rail_tables(paths: &[PathBuf]) -> (Vec<RawTable>, usize) {
    let mut tables = Vec::with_capacity(paths.len());
    let mut skipped = 0usize;

    for path in paths {
        match RawTable::read(path) {
            Ok(table) => tables.push(table),
            Err(e) => {
                warn!(error = %e, "skipping rail file");
                skipped += 1;
            }
        }
    }
    (tables, skipped)
}

/// Runs aggregation, naming, and geocoding; shared by `analyze` and
/// `match-stations`.
fn locate_rail_stations(
    rail_paths: &[PathBuf],
    mapping_path: Option<&Path>,
    observations: &[railgap::types::BusStopObservation],
    thresholds: &Thresholds,
) -> Result<(Vec<RailStation>, RailStats)> {
    let (tables, skipped) = read_rail_tables(rail_paths);
    let usage = rail::aggregate_rail_usage(&tables)?;

    let mapping = mapping_path.map(load_station_mapping).transpose()?;
    let named = rail::resolve_station_names(&usage, mapping.as_ref());
    let located = geocode::locate(&named, observations, thresholds);

    let stats = RailStats {
        tables_read: tables.len(),
        tables_skipped: skipped,
        stations_aggregated: usage.len(),
        stations_named: named.len(),
    };
    Ok((located, stats))
}

struct RailStats {
    tables_read: usize,
    tables_skipped: usize,
    stations_aggregated: usize,
    stations_named: usize,
}

fn run_analyze(
    rail_paths: &[PathBuf],
    bus_path: &Path,
    mapping_path: Option<&Path>,
    output_dir: &Path,
    top: usize,
    thresholds: &Thresholds,
) -> Result<()> {
    let bus_table = RawTable::read(bus_path)?;
    let observations = bus::observations(&bus_table)?;

    let (located, rail_stats) =
        locate_rail_stations(rail_paths, mapping_path, &observations, thresholds)
            .inspect_err(|e| error!(error = %e, "aborting"))?;

    let spots = hotspots::cluster(
        &observations,
        thresholds.hotspot_round_decimals,
        thresholds.hotspot_min_boardings,
    );

    let mut candidates = gaps::find_gaps(
        &spots,
        &located,
        thresholds.candidate_min_boardings,
        thresholds.min_distance_miles,
    );
    candidates.truncate(top);

    // All analysis done; only now touch the output directory so a failed run
    // leaves no partial artifacts.
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output dir {}", output_dir.display()))?;

    let summary = RunSummary {
        generated_at: Utc::now(),
        rail_tables_read: rail_stats.tables_read,
        rail_tables_skipped: rail_stats.tables_skipped,
        stations_aggregated: rail_stats.stations_aggregated,
        stations_named: rail_stats.stations_named,
        stations_located: located.len(),
        bus_rows: observations.len(),
        hotspots: spots.len(),
        candidates: candidates.len(),
    };

    write_candidates_csv(&output_dir.join("candidates.csv"), &candidates)?;
    write_matches_csv(&output_dir.join("station_matches.csv"), &located)?;
    write_summary_json(&output_dir.join("summary.json"), &summary)?;
    render::render_map(
        &output_dir.join("proposal_map.html"),
        &located,
        &spots,
        &candidates,
    )?;

    report_candidates(&candidates, top);
    info!(output_dir = %output_dir.display(), "analysis complete");
    Ok(())
}

fn run_hotspots(bus_path: &Path, output: &Path, thresholds: &Thresholds) -> Result<()> {
    let bus_table = RawTable::read(bus_path)?;
    let observations = bus::observations(&bus_table)?;

    let spots = hotspots::cluster(
        &observations,
        thresholds.hotspot_round_decimals,
        thresholds.hotspot_min_boardings,
    );

    write_hotspots_csv(output, &spots)?;
    info!(hotspots = spots.len(), output = %output.display(), "hotspots written");
    Ok(())
}

fn run_match_stations(
    rail_paths: &[PathBuf],
    bus_path: &Path,
    mapping_path: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let bus_table = RawTable::read(bus_path)?;
    let observations = bus::observations(&bus_table)?;

    let thresholds = Thresholds::default();
    let (located, stats) =
        locate_rail_stations(rail_paths, mapping_path, &observations, &thresholds)?;

    write_matches_csv(output, &located)?;
    info!(
        located = located.len(),
        named = stats.stations_named,
        output = %output.display(),
        "station match audit written"
    );
    Ok(())
}
