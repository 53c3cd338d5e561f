//! Command entry points. Each submodule owns its clap arguments and a
//! `run` function; `main` only dispatches.

pub mod db_check;
pub mod extract;
pub mod load;
pub mod merge;
pub mod run;
pub mod transform;
pub mod visualize;
