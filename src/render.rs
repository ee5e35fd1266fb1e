//! Leaflet map rendering.
//!
//! Produces a single self-contained HTML file with three toggleable layers:
//! existing rail stations, bus hotspots, and proposed station candidates.
//! The renderer only consumes finished pipeline output; it runs last so a
//! failed run never leaves a partial artifact behind.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::types::{Candidate, Hotspot, RailStation};
use crate::util::mean;

/// Fallback map center when there are no hotspots to center on.
const DEFAULT_CENTER: (f64, f64) = (38.8951, -77.0364);

#[derive(Serialize)]
struct RailMarker<'a> {
    name: &'a str,
    lat: f64,
    lon: f64,
    boardings: f64,
}

#[derive(Serialize)]
struct HotspotMarker<'a> {
    name: &'a str,
    lat: f64,
    lon: f64,
    boardings: f64,
}

#[derive(Serialize)]
struct CandidateMarker<'a> {
    name: &'a str,
    lat: f64,
    lon: f64,
    boardings: f64,
    nearest_rail: Option<&'a str>,
    distance_miles: Option<f64>,
    routes: &'a [String],
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<title>Rail gap candidates</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map { height: 100%; margin: 0; }</style>
</head>
<body>
<div id="map"></div>
<script>
var rail = __RAIL__;
var hotspots = __HOTSPOTS__;
var candidates = __CANDIDATES__;

var map = L.map('map').setView([__CENTER_LAT__, __CENTER_LON__], 12);
L.tileLayer('https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png', {
  attribution: '&copy; OpenStreetMap contributors &copy; CARTO'
}).addTo(map);

var railLayer = L.layerGroup(rail.map(function (r) {
  return L.circleMarker([r.lat, r.lon], {radius: 4, color: 'blue', fillColor: '#3186cc', fillOpacity: 0.8})
    .bindPopup('<b>' + r.name + '</b><br>Avg daily boardings: ' + Math.round(r.boardings).toLocaleString());
})).addTo(map);

var hotspotLayer = L.layerGroup(hotspots.map(function (h) {
  return L.circleMarker([h.lat, h.lon], {radius: 3, color: 'orange', fillOpacity: 0.8})
    .bindPopup(h.name + '<br>Boardings: ' + Math.round(h.boardings).toLocaleString());
}));

var candidateLayer = L.layerGroup(candidates.flatMap(function (c) {
  var nearest = c.nearest_rail
    ? c.nearest_rail + ' (' + c.distance_miles.toFixed(2) + ' mi)'
    : 'none';
  var marker = L.circleMarker([c.lat, c.lon], {radius: 7, color: 'red', fillColor: 'red', fillOpacity: 0.9})
    .bindPopup('<b>PROPOSED: ' + c.name + '</b><br>Bus boardings: ' + Math.round(c.boardings).toLocaleString()
      + '<br>Nearest rail: ' + nearest + '<br>Routes: ' + c.routes.join(', '));
  var radius = L.circle([c.lat, c.lon], {radius: 800, color: 'red', weight: 1, fillOpacity: 0.08});
  return [marker, radius];
})).addTo(map);

L.control.layers(null, {
  'Existing rail': railLayer,
  'Bus hotspots': hotspotLayer,
  'Proposed stations': candidateLayer
}, {collapsed: false}).addTo(map);
</script>
</body>
</html>
"#;

/// Renders the final station, hotspot and candidate lists as an HTML map.
pub fn render_map(
    path: &Path,
    stations: &[RailStation],
    hotspots: &[Hotspot],
    candidates: &[Candidate],
) -> Result<()> {
    let rail: Vec<RailMarker> = stations
        .iter()
        .filter_map(|s| {
            Some(RailMarker {
                name: &s.name,
                lat: s.lat?,
                lon: s.lon?,
                boardings: s.avg_boardings,
            })
        })
        .collect();

    let spots: Vec<HotspotMarker> = hotspots
        .iter()
        .map(|h| HotspotMarker {
            name: &h.representative_stop,
            lat: h.lat,
            lon: h.lon,
            boardings: h.total_boardings,
        })
        .collect();

    let proposed: Vec<CandidateMarker> = candidates
        .iter()
        .map(|c| CandidateMarker {
            name: &c.name,
            lat: c.lat,
            lon: c.lon,
            boardings: c.bus_boardings,
            nearest_rail: c.nearest_rail.as_deref(),
            distance_miles: c.distance_miles,
            routes: &c.routes,
        })
        .collect();

    let (center_lat, center_lon) = if hotspots.is_empty() {
        DEFAULT_CENTER
    } else {
        let lats: Vec<f64> = hotspots.iter().map(|h| h.lat).collect();
        let lons: Vec<f64> = hotspots.iter().map(|h| h.lon).collect();
        (mean(&lats), mean(&lons))
    };

    let html = TEMPLATE
        .replace("__RAIL__", &serde_json::to_string(&rail)?)
        .replace("__HOTSPOTS__", &serde_json::to_string(&spots)?)
        .replace("__CANDIDATES__", &serde_json::to_string(&proposed)?)
        .replace("__CENTER_LAT__", &center_lat.to_string())
        .replace("__CENTER_LON__", &center_lon.to_string());

    std::fs::write(path, html)?;
    info!(path = %path.display(), "map written");
    Ok(())
}
