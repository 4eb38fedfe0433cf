//! habitviz grid command implementation
//!
//! Prints the heat-map as text, one line per weekday, oldest week on the
//! left. With `--json` the full cell list is emitted instead.

use std::collections::HashMap;

use crate::calendar;
use crate::error::Result;
use crate::grid::Cell;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::session::{self, SessionOptions, Snapshot};

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const TIER_GLYPHS: [char; 5] = ['·', '░', '▒', '▓', '█'];

pub fn run(options: SessionOptions, output: OutputOptions) -> Result<()> {
    let snapshot = session::load(&options)?;

    let mut human = HumanOutput::new(format!(
        "habitviz grid: {} weeks ending {}",
        snapshot.weeks, snapshot.today
    ));
    for line in text_rows(&snapshot.cells) {
        human.push_body(line);
    }
    push_summary(&mut human, &snapshot);
    for warning in &snapshot.warnings {
        human.push_warning(warning.clone());
    }

    emit_success(output, "grid", &snapshot, Some(&human))
}

fn push_summary(human: &mut HumanOutput, snapshot: &Snapshot) {
    human.push_summary("week mode", snapshot.week_mode.to_string());
    human.push_summary(
        "active days",
        format!("{}/{}", snapshot.summary.active_days, snapshot.summary.days),
    );
    human.push_summary("tasks completed", snapshot.summary.occurrences.to_string());
    if let Some(busiest) = snapshot.summary.busiest {
        human.push_summary("busiest day", calendar::date_key(busiest));
    }
}

/// One text line per weekday; columns run from the oldest week to the
/// current one. Days after today are blank.
pub(crate) fn text_rows(cells: &[Cell]) -> Vec<String> {
    let (Some(min), Some(max)) = (
        cells.iter().map(|cell| cell.column).min(),
        cells.iter().map(|cell| cell.column).max(),
    ) else {
        return Vec::new();
    };

    let by_position: HashMap<(i64, u8), &Cell> = cells
        .iter()
        .map(|cell| ((cell.column, cell.row), cell))
        .collect();

    WEEKDAY_LABELS
        .iter()
        .enumerate()
        .map(|(row, label)| {
            let mut line = format!("{label} ");
            for column in (min..=max).rev() {
                let glyph = by_position
                    .get(&(column, row as u8))
                    .map(|cell| TIER_GLYPHS[cell.tier.level() as usize])
                    .unwrap_or(' ');
                line.push(glyph);
            }
            line.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekMode;
    use crate::grid::build_grid;
    use crate::history::{Aggregate, HistoryAggregator, IngestScope};
    use chrono::NaiveDate;

    #[test]
    fn text_rows_place_today_in_last_column() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let mut aggregate = Aggregate::new();
        HistoryAggregator::new(today).ingest(
            &mut aggregate,
            "h\nRead,a,daily,2024-06-12,1\nRun,b,daily,2024-06-12,1\nRead,a,daily,2024-06-03,2\n",
            IngestScope::All,
        );
        let cells = build_grid(&aggregate, today, 2, WeekMode::Continuous);
        let rows = text_rows(&cells);

        assert_eq!(rows.len(), 7);
        // Three columns: partial oldest week, last week, this week.
        assert_eq!(rows[0], "Mon  ░·");
        assert_eq!(rows[2], "Wed  ·▒");
        assert_eq!(rows[3], "Thu ··");
        assert_eq!(rows[6], "Sun ··");
    }

    #[test]
    fn text_rows_empty_without_cells() {
        assert!(text_rows(&[]).is_empty());
    }
}
