//! habitviz week command implementation

use chrono::NaiveDate;

use crate::calendar;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(serde::Serialize)]
struct WeekReport {
    date: NaiveDate,
    date_key: String,
    iso_week: u32,
    week_index: i64,
    weekday_row: u8,
}

pub fn run(date: NaiveDate, output: OutputOptions) -> Result<()> {
    let report = WeekReport {
        date,
        date_key: calendar::date_key(date),
        iso_week: calendar::iso_week_number(date),
        week_index: calendar::week_index(date),
        weekday_row: calendar::weekday_row(date),
    };

    let mut human = HumanOutput::new(format!("{date}: ISO week {}", report.iso_week));
    human.push_summary("date key", report.date_key.clone());
    human.push_summary("week index", report.week_index.to_string());
    human.push_summary("grid row", report.weekday_row.to_string());

    emit_success(output, "week", &report, Some(&human))
}
