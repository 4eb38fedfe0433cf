//! History ingestion: raw export payloads -> per-day task records
//!
//! Payloads are Habitica `history.csv` exports (or a local archive in the
//! same format): a header row, then one row per task update, oldest first.
//! Ingestion is best effort. Malformed rows are counted and skipped, never
//! reported as errors.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar;

const FIELD_TASK: usize = 0;
const FIELD_DATE: usize = 3;
const FIELD_VALUE: usize = 4;
const MIN_FIELDS: usize = 5;

/// One parsed history row.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub task_name: String,
    pub date: NaiveDate,
    pub value: f64,
}

impl HistoryRow {
    /// Parse a comma-delimited row. Returns `None` for rows with too few
    /// fields, an unparsable date, or a value with no leading number.
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < MIN_FIELDS {
            return None;
        }
        let date = calendar::parse_day(fields[FIELD_DATE])?;
        let value = leading_number(fields[FIELD_VALUE])?;
        Some(Self {
            task_name: fields[FIELD_TASK].to_string(),
            date,
            value,
        })
    }
}

/// Longest numeric prefix of `raw` after leading whitespace, so `1.5x`
/// reads as 1.5 and `-Infinity` as negative infinity. NaN is never produced.
fn leading_number(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let unsigned = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    if unsigned.starts_with("Infinity") {
        let sign = if text.starts_with('-') { -1.0 } else { 1.0 };
        return Some(sign * f64::INFINITY);
    }

    let end = text
        .bytes()
        .take_while(|&b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        .count();
    (1..=end)
        .rev()
        .find_map(|len| text[..len].parse::<f64>().ok())
}

/// Data lines of a payload: everything but the header and the final
/// (empty or partial) line.
pub fn data_lines(payload: &str) -> impl Iterator<Item = &str> {
    let lines: Vec<&str> = payload.split('\n').collect();
    let end = lines.len().saturating_sub(1);
    lines.into_iter().take(end).skip(1)
}

/// Tasks completed on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub tasks: Vec<String>,
}

/// Date-indexed task records, newest first after every ingestion pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregate {
    records: Vec<DayRecord>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of occurrences across all days.
    pub fn occurrences(&self) -> usize {
        self.records.iter().map(|record| record.tasks.len()).sum()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.records.iter().find(|record| record.date == date)
    }

    /// Every task recorded on `date`, matched by date key.
    pub fn tasks_on(&self, date: NaiveDate) -> Vec<String> {
        let key = calendar::date_key(date);
        self.records
            .iter()
            .filter(|record| calendar::date_key(record.date) == key)
            .flat_map(|record| record.tasks.iter().cloned())
            .collect()
    }

    fn record(&mut self, date: NaiveDate, task: &str) {
        match self.records.iter_mut().find(|record| record.date == date) {
            Some(record) => record.tasks.push(task.to_string()),
            None => self.records.push(DayRecord {
                date,
                tasks: vec![task.to_string()],
            }),
        }
    }

    fn sort_newest_first(&mut self) {
        self.records.sort_by(|left, right| right.date.cmp(&left.date));
    }
}

/// Which occurrences of a payload are merged into the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestScope {
    /// Every occurrence (local archive).
    All,
    /// Only occurrences whose ISO week number matches today's (remote
    /// export, whose older weeks are already in the archive). The year is
    /// not compared.
    CurrentWeek,
}

/// Counters for one ingested payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub rows: usize,
    pub malformed: usize,
    pub excluded: usize,
    pub deduplicated: usize,
    pub outside_week: usize,
    pub occurrences: usize,
}

/// One aggregation session.
///
/// Holds the per-task dedup map across payloads, so the remote export is
/// compared against the values the archive left behind. Payloads must be
/// ingested oldest source first (archive, then remote).
#[derive(Debug, Clone)]
pub struct HistoryAggregator {
    today: NaiveDate,
    excluded: HashSet<String>,
    last_values: HashMap<String, f64>,
}

impl HistoryAggregator {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            excluded: HashSet::new(),
            last_values: HashMap::new(),
        }
    }

    pub fn with_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    /// Last value seen for a task in this session.
    pub fn last_value(&self, task: &str) -> Option<f64> {
        self.last_values.get(task).copied()
    }

    /// Fold one payload into `aggregate`.
    ///
    /// Ingesting the same payload twice records its occurrences twice.
    pub fn ingest(
        &mut self,
        aggregate: &mut Aggregate,
        payload: &str,
        scope: IngestScope,
    ) -> IngestReport {
        let mut report = IngestReport::default();

        for line in data_lines(payload) {
            report.rows += 1;
            let Some(row) = HistoryRow::parse(line) else {
                report.malformed += 1;
                tracing::trace!(line, "skipping malformed history row");
                continue;
            };

            if self.excluded.contains(&row.task_name) {
                report.excluded += 1;
                continue;
            }

            // Dedup runs before the week filter so the map stays consistent
            // for rows the filter discards.
            let previous = self.last_values.insert(row.task_name.clone(), row.value);
            if previous.is_some_and(|last| row.value <= last) {
                report.deduplicated += 1;
                continue;
            }

            if scope == IngestScope::CurrentWeek
                && !calendar::same_iso_week(self.today, row.date)
            {
                report.outside_week += 1;
                continue;
            }

            aggregate.record(row.date, &row.task_name);
            report.occurrences += 1;
        }

        aggregate.sort_newest_first();
        tracing::debug!(?scope, ?report, days = aggregate.len(), "ingested history payload");
        report
    }

    /// Ingest the local archive in full, then the current week of the remote
    /// export. A missing payload counts as zero rows.
    pub fn ingest_sources(
        &mut self,
        archive: Option<&str>,
        remote: Option<&str>,
    ) -> (Aggregate, SessionReport) {
        let mut aggregate = Aggregate::new();
        let archive = archive.map(|payload| self.ingest(&mut aggregate, payload, IngestScope::All));
        let remote =
            remote.map(|payload| self.ingest(&mut aggregate, payload, IngestScope::CurrentWeek));
        (aggregate, SessionReport { archive, remote })
    }
}

/// Reports for the two payloads of a session; `None` when a source was
/// unavailable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionReport {
    pub archive: Option<IngestReport>,
    pub remote: Option<IngestReport>,
}
