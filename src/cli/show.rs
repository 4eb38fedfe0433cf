//! habitviz show command implementation
//!
//! Opens the interactive heat-map. There is no JSON form; use `grid --json`.

use crate::error::Result;
use crate::session::SessionOptions;

pub fn run(options: SessionOptions) -> Result<()> {
    crate::ui::heatmap::run(options)
}
