//! End-to-end run of the gap analysis pipeline over small fixture tables.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use railgap::config::Thresholds;
use railgap::table::RawTable;
use railgap::{bus, gaps, geocode, hotspots, rail};

fn write_fixture(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_full_pipeline_two_years_one_candidate() {
    let dir = env::temp_dir().join("railgap_e2e");
    fs::create_dir_all(&dir).unwrap();

    // Two rail years for station A01: daily boardings 500 and 700, so the
    // multi-year average must come out at 600.
    let rail_2023 = write_fixture(
        &dir,
        "rail_2023.csv",
        "Date,Stop_ID,Boardings\n2023-06-01,A01,500\n",
    );
    let rail_2024 = write_fixture(
        &dir,
        "rail_2024.csv",
        "Date,Stop_ID,Boardings\n2024-06-01,A01,700\n",
    );

    // Bus table: one stop named like A01's mapped name (geocodes the
    // station), plus a busy stop several miles away (the expected gap).
    let bus_csv = write_fixture(
        &dir,
        "bus.csv",
        "STOP,LAT,LON,SUM_PASSENGERS_ON,ROUTE_NAME\n\
         Metro Center Station,38.8983,-77.0281,800,52\n\
         Far Corner Plaza,38.9500,-77.1200,1000,97\n",
    );

    let mapping: BTreeMap<String, String> =
        [("A01".to_string(), "Metro Center".to_string())].into();

    let thresholds = Thresholds::default();

    let tables = vec![
        RawTable::read(&rail_2023).unwrap(),
        RawTable::read(&rail_2024).unwrap(),
    ];
    let usage = rail::aggregate_rail_usage(&tables).unwrap();
    assert_eq!(usage["A01"], 600.0);

    let named = rail::resolve_station_names(&usage, Some(&mapping));
    assert_eq!(named.len(), 1);
    assert_eq!(named[0].name, "Metro Center");
    assert_eq!(named[0].avg_boardings, 600.0);

    let bus_table = RawTable::read(&bus_csv).unwrap();
    let observations = bus::observations(&bus_table).unwrap();
    assert_eq!(observations.len(), 2);

    let located = geocode::locate(&named, &observations, &thresholds);
    assert_eq!(located.len(), 1);
    assert_eq!(
        located[0].matched_stop_name.as_deref(),
        Some("Metro Center Station")
    );
    assert_eq!(located[0].lat, Some(38.8983));

    let spots = hotspots::cluster(
        &observations,
        thresholds.hotspot_round_decimals,
        thresholds.hotspot_min_boardings,
    );
    assert_eq!(spots.len(), 2);

    let candidates = gaps::find_gaps(
        &spots,
        &located,
        thresholds.candidate_min_boardings,
        thresholds.min_distance_miles,
    );

    // The stop that geocoded the station sits at distance zero from it; only
    // the far busy stop qualifies.
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].name, "Far Corner Plaza");
    assert_eq!(candidates[0].bus_boardings, 1000.0);
    assert_eq!(candidates[0].nearest_rail.as_deref(), Some("Metro Center"));
    assert!(candidates[0].distance_miles.unwrap() > 1.0);
    assert_eq!(candidates[0].routes, vec!["97"]);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_pipeline_without_mapping_uses_ids_as_names() {
    let dir = env::temp_dir().join("railgap_e2e_nomap");
    fs::create_dir_all(&dir).unwrap();

    // Station ids are already human names, as in feeds without a separate
    // id-to-name table.
    let rail_csv = write_fixture(
        &dir,
        "rail.csv",
        "Stop_ID,Boardings\nAnacostia,900\n",
    );
    let bus_csv = write_fixture(
        &dir,
        "bus.csv",
        "STOP,LAT,LON,SUM_PASSENGERS_ON\nAnacostia Station Bay A,38.8629,-76.9954,300\n",
    );

    let tables = vec![RawTable::read(&rail_csv).unwrap()];
    let usage = rail::aggregate_rail_usage(&tables).unwrap();
    let named = rail::resolve_station_names(&usage, None);

    let bus_table = RawTable::read(&bus_csv).unwrap();
    let observations = bus::observations(&bus_table).unwrap();

    let located = geocode::locate(&named, &observations, &Thresholds::default());
    assert_eq!(located.len(), 1);
    assert_eq!(located[0].name, "Anacostia");
    assert_eq!(located[0].lat, Some(38.8629));

    fs::remove_dir_all(&dir).ok();
}
