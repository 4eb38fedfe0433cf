//! One rendering pass: fetch, ingest, build the grid.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::WeekMode;
use crate::config::{Config, Credentials};
use crate::error::Result;
use crate::grid::{self, Cell, GridSummary};
use crate::history::{Aggregate, HistoryAggregator, SessionReport};
use crate::source::{self, Payloads, Sources};

/// Inputs of a rendering pass.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub config: Config,
    pub credentials: Credentials,
    pub offline: bool,
    pub today: NaiveDate,
    pub weeks: u32,
}

/// Everything a renderer needs for one pass.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub today: NaiveDate,
    pub weeks: u32,
    pub week_mode: WeekMode,
    pub summary: GridSummary,
    pub report: SessionReport,
    #[serde(skip)]
    pub aggregate: Aggregate,
    pub cells: Vec<Cell>,
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Fetch both sources, then ingest archive before remote.
pub fn load(options: &SessionOptions) -> Result<Snapshot> {
    let sources = Sources::from_config(&options.config, options.credentials.clone(), options.offline);
    let payloads = source::fetch_payloads_blocking(&sources)?;
    Ok(from_payloads(options, payloads))
}

/// Build a snapshot from already fetched payloads.
pub fn from_payloads(options: &SessionOptions, payloads: Payloads) -> Snapshot {
    let week_mode = options.config.grid.week_mode;
    let mut aggregator = HistoryAggregator::new(options.today)
        .with_excluded(options.config.aggregate.excluded_tasks.iter().cloned());
    let (aggregate, report) =
        aggregator.ingest_sources(payloads.archive.as_deref(), payloads.remote.as_deref());

    let cells = grid::build_grid(&aggregate, options.today, options.weeks, week_mode);
    let summary = grid::summarize(&cells);
    Snapshot {
        today: options.today,
        weeks: options.weeks,
        week_mode,
        summary,
        report,
        aggregate,
        cells,
        warnings: payloads.warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(today: NaiveDate) -> SessionOptions {
        let mut config = Config::default();
        config.aggregate.excluded_tasks = vec!["Smoke".to_string()];
        SessionOptions {
            config,
            credentials: Credentials::default(),
            offline: true,
            today,
            weeks: 2,
        }
    }

    #[test]
    fn snapshot_applies_config() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let payloads = Payloads {
            archive: Some(
                "h\nRead,a,daily,2024-06-11,1\nSmoke,b,habit,2024-06-11,1\nRun,c,daily,2024-06-11,1\n"
                    .to_string(),
            ),
            remote: None,
            warnings: vec!["remote export skipped".to_string()],
        };
        let snapshot = from_payloads(&options(today), payloads);

        assert_eq!(snapshot.cells.len(), 14);
        assert_eq!(snapshot.summary.occurrences, 2);
        assert_eq!(snapshot.report.archive.as_ref().unwrap().excluded, 1);
        assert!(snapshot.report.remote.is_none());
        assert_eq!(snapshot.warnings.len(), 1);
    }

    #[test]
    fn remote_week_filter_ignores_grid_week_mode() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let remote = "h\nRead,a,daily,2023-06-14,1\nRun,b,daily,2024-06-05,1\n";

        for mode in [WeekMode::Continuous, WeekMode::IsoWeekDelta] {
            let mut options = options(today);
            options.config.grid.week_mode = mode;
            let payloads = Payloads {
                remote: Some(remote.to_string()),
                ..Payloads::default()
            };
            let snapshot = from_payloads(&options, payloads);

            // Both dates are ISO week 24; the year is not compared.
            let report = snapshot.report.remote.as_ref().unwrap();
            assert_eq!(report.occurrences, 1, "{mode}");
            assert_eq!(report.outside_week, 1, "{mode}");
            assert_eq!(
                snapshot.aggregate.tasks_on(NaiveDate::from_ymd_opt(2023, 6, 14).unwrap()),
                vec!["Read".to_string()]
            );
        }
    }

    #[test]
    fn load_tolerates_missing_archive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let mut options = options(today);
        options.config.sources.archive = dir.path().join("missing.csv");

        let snapshot = load(&options).expect("load");
        assert!(snapshot.aggregate.is_empty());
        assert_eq!(snapshot.cells.len(), 14);
        assert_eq!(snapshot.warnings.len(), 1);
    }
}
