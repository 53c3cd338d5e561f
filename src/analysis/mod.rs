//! Data analysis for the accident pipeline.
//!
//! Submodules:
//! - `bands`     — fixed-boundary time-of-day and vehicle-age lookups.
//! - `accidents` — group/filter/reshape operations feeding each chart.
//! - `tables`    — the result shapes those operations return.

pub mod accidents;
pub mod bands;
pub mod tables;
