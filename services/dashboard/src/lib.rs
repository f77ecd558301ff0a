//! Graduation leaderboard dashboard: loads the dataset once, then serves
//! filtered/sorted views and chart groups over HTTP.

pub mod http;
pub mod loader;

pub use http::router;
pub use loader::{load_raw_table, load_region_table, load_snapshot, LoadError};
