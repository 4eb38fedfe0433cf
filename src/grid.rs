//! Grid building: aggregate -> week x weekday cells
//!
//! A grid covers the `weeks * 7` days ending today. Column 0 is the current
//! week and columns grow into the past; row 0 is Monday. Cells are rebuilt
//! from scratch on every pass and carry no identity between passes.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::calendar::{self, WeekMode};
use crate::history::Aggregate;

/// Tasks beyond this count make the tooltip truncate its list.
const TOOLTIP_MAX_TASKS: usize = 5;
const TOOLTIP_SHOWN_WHEN_TRUNCATED: usize = 4;

/// Display bucket for a day's task count: 0, 1, 2, 3, or 4-and-more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ColorTier(u8);

impl ColorTier {
    pub const MAX: ColorTier = ColorTier(4);

    pub fn from_count(count: usize) -> Self {
        ColorTier(count.min(Self::MAX.0 as usize) as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Grey ramp shared by every renderer; brightness increases with tier.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self.0 {
            0 => (72, 72, 72),
            1 => (99, 99, 99),
            2 => (144, 144, 144),
            3 => (180, 180, 180),
            _ => (212, 212, 212),
        }
    }
}

/// One resolved grid position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub column: i64,
    pub row: u8,
    pub tier: ColorTier,
    pub date: NaiveDate,
    pub tasks: Vec<String>,
}

impl Cell {
    /// Tooltip text, one entry per line.
    pub fn tooltip_lines(&self) -> Vec<String> {
        let mut lines = vec![
            "Date".to_string(),
            format!("  {}", calendar::date_key(self.date)),
            format!("{} tasks", self.tasks.len()),
        ];
        if self.tasks.len() > TOOLTIP_MAX_TASKS {
            lines.extend(
                self.tasks
                    .iter()
                    .take(TOOLTIP_SHOWN_WHEN_TRUNCATED)
                    .map(|task| format!("  {task}")),
            );
            lines.push("  ...".to_string());
        } else {
            lines.extend(self.tasks.iter().map(|task| format!("  {task}")));
        }
        lines
    }
}

/// Build the cells for the `weeks * 7` days ending at `today`, newest first.
pub fn build_grid(
    aggregate: &Aggregate,
    today: NaiveDate,
    weeks: u32,
    mode: WeekMode,
) -> Vec<Cell> {
    let days = i64::from(weeks) * 7;
    (0..days)
        .map(|offset| {
            let date = today - Duration::days(offset);
            let tasks = aggregate.tasks_on(date);
            Cell {
                column: mode.weeks_between(today, date),
                row: calendar::weekday_row(date),
                tier: ColorTier::from_count(tasks.len()),
                date,
                tasks,
            }
        })
        .collect()
}

/// Axis-aligned rectangle in renderer units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Strict containment: points on an edge are outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x < x && x < self.x + self.width && self.y < y && y < self.y + self.height
    }
}

/// Maps grid coordinates to renderer units.
///
/// Columns are laid out right to left from `right_edge`, so the current
/// week is the rightmost column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub cell_width: f64,
    pub cell_height: f64,
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub right_edge: f64,
    pub top: f64,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::square(20.0, 22.0, 500.0, 20.0)
    }
}

impl GridGeometry {
    pub fn square(cell_size: f64, spacing: f64, right_edge: f64, top: f64) -> Self {
        Self {
            cell_width: cell_size,
            cell_height: cell_size,
            spacing_x: spacing,
            spacing_y: spacing,
            right_edge,
            top,
        }
    }

    pub fn bounds(&self, column: i64, row: u8) -> Bounds {
        Bounds {
            x: self.right_edge - (column as f64 + 1.0) * self.spacing_x,
            y: self.top + f64::from(row) * self.spacing_y,
            width: self.cell_width,
            height: self.cell_height,
        }
    }

    pub fn cell_bounds(&self, cell: &Cell) -> Bounds {
        self.bounds(cell.column, cell.row)
    }

    /// The cell under a pointer position, if any.
    pub fn hit_test<'a>(&self, cells: &'a [Cell], x: f64, y: f64) -> Option<&'a Cell> {
        cells
            .iter()
            .find(|cell| self.cell_bounds(cell).contains(x, y))
    }
}

/// Headline numbers for a built grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GridSummary {
    pub days: usize,
    pub active_days: usize,
    pub occurrences: usize,
    pub busiest: Option<NaiveDate>,
}

pub fn summarize(cells: &[Cell]) -> GridSummary {
    let mut summary = GridSummary {
        days: cells.len(),
        ..GridSummary::default()
    };
    let mut busiest_count = 0;
    for cell in cells {
        if cell.tasks.is_empty() {
            continue;
        }
        summary.active_days += 1;
        summary.occurrences += cell.tasks.len();
        if cell.tasks.len() > busiest_count {
            busiest_count = cell.tasks.len();
            summary.busiest = Some(cell.date);
        }
    }
    summary
}
