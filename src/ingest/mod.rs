//! Getting the source datasets onto disk and into memory.

pub mod datasets;
pub mod kaggle;
