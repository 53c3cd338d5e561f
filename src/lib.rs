pub mod analysis;
pub mod charts;
pub mod config;
pub mod db;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod pipelines;
