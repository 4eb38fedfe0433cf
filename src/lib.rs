//! habitviz - habit heat-map library
//!
//! Turns task-history exports (a local archive and the Habitica "history"
//! CSV) into a calendar heat-map of completed tasks per day.
//!
//! # Core Concepts
//!
//! - **History rows**: `task name, id, type, date, value` CSV lines; a
//!   positive value change marks a completion
//! - **Aggregate**: completed task names per calendar day
//! - **Grid**: one cell per day, columns are weeks back from today,
//!   rows are weekdays starting Monday
//! - **Week mode**: how columns and the "current week" are computed
//!
//! # Module Organization
//!
//! - `calendar`: ISO week numbers, date keys, grid rows and week modes
//! - `history`: CSV row parsing and completion aggregation
//! - `grid`: cells, color tiers, geometry and hit testing
//! - `source`: archive file and remote export retrieval
//! - `session`: one fetch, ingest and grid pass
//! - `config`: Configuration loading from `.habitviz.toml`
//! - `error`: Error types and result aliases
//! - `output`: Human and JSON command output
//! - `cli`: Command-line interface using clap
//! - `ui`: Interactive terminal heat-map

pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod grid;
pub mod history;
pub mod output;
pub mod session;
pub mod source;
pub mod ui;

pub use error::{Error, Result};
