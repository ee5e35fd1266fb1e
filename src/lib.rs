pub mod bus;
pub mod config;
pub mod error;
pub mod gaps;
pub mod geocode;
pub mod hotspots;
pub mod output;
pub mod rail;
pub mod render;
pub mod schema;
pub mod table;
pub mod types;
pub mod util;
