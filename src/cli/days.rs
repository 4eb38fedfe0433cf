//! habitviz days command implementation

use crate::error::Result;
use crate::history::{DayRecord, SessionReport};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::session::{self, SessionOptions};

#[derive(serde::Serialize)]
struct DaysReport<'a> {
    total_days: usize,
    total_tasks: usize,
    days: &'a [DayRecord],
    report: &'a SessionReport,
}

pub fn run(options: SessionOptions, limit: usize, output: OutputOptions) -> Result<()> {
    let snapshot = session::load(&options)?;
    let records = snapshot.aggregate.records();
    let shown = &records[..limit.min(records.len())];

    let data = DaysReport {
        total_days: records.len(),
        total_tasks: snapshot.aggregate.occurrences(),
        days: shown,
        report: &snapshot.report,
    };

    let header = if records.is_empty() {
        "habitviz days: no completed tasks".to_string()
    } else {
        format!("habitviz days: {} of {} days", shown.len(), records.len())
    };
    let mut human = HumanOutput::new(header);
    for record in shown {
        human.push_body(format!(
            "{}  {:>2}  {}",
            record.date,
            record.tasks.len(),
            record.tasks.join(", ")
        ));
    }
    if let Some(archive) = snapshot.report.archive.as_ref() {
        human.push_detail(format!(
            "archive: {} rows, {} recorded, {} unchanged, {} malformed",
            archive.rows, archive.occurrences, archive.deduplicated, archive.malformed
        ));
    }
    if let Some(remote) = snapshot.report.remote.as_ref() {
        human.push_detail(format!(
            "remote: {} rows, {} recorded this week, {} unchanged, {} malformed",
            remote.rows, remote.occurrences, remote.deduplicated, remote.malformed
        ));
    }
    for warning in &snapshot.warnings {
        human.push_warning(warning.clone());
    }

    emit_success(output, "days", &data, Some(&human))
}
