//! Calendar arithmetic for the heat-map
//!
//! Every date in habitviz is a `chrono::NaiveDate`: history rows carry no
//! usable time-of-day or timezone, so two timestamps name the same day iff
//! their `YYYYMMDD` keys match.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Compute the ISO-8601 week number (weeks start on Monday, week 1 holds the
/// year's first Thursday).
pub fn iso_week_number(date: NaiveDate) -> u32 {
    // Sunday counts as day 7.
    let weekday = i64::from(date.weekday().number_from_monday());
    let thursday = date + Duration::days(4 - weekday);
    let year_start = NaiveDate::from_ymd_opt(thursday.year(), 1, 1).unwrap_or(thursday);
    let days = (thursday - year_start).num_days();
    ((days + 1) as f64 / 7.0).ceil() as u32
}

/// Canonical `YYYYMMDD` key, used for equality only.
pub fn date_key(date: NaiveDate) -> String {
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

/// Grid row for a date: Monday is row 0, Sunday row 6.
pub fn weekday_row(date: NaiveDate) -> u8 {
    let from_sunday = date.weekday().num_days_from_sunday();
    ((from_sunday + 6) % 7) as u8
}

/// Whether two dates carry the same ISO week number. The year is not
/// compared, so week 24 of 2023 matches week 24 of 2024.
pub fn same_iso_week(left: NaiveDate, right: NaiveDate) -> bool {
    iso_week_number(left) == iso_week_number(right)
}

/// Continuous week counter: whole weeks elapsed since Monday 1970-01-05.
///
/// Unlike ISO week numbers this never wraps at a year boundary, so the
/// difference between two indices is the number of Monday-started weeks
/// between the dates.
pub fn week_index(date: NaiveDate) -> i64 {
    let epoch_monday = NaiveDate::from_ymd_opt(1970, 1, 5).unwrap_or(NaiveDate::MIN);
    (date - epoch_monday).num_days().div_euclid(7)
}

/// Parse a calendar day from the leading `YYYY-MM-DD` of a timestamp.
///
/// Anything after the tenth character (time, offset) is ignored.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Week arithmetic used for grid columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeekMode {
    /// Subtract raw ISO week numbers. Wraps at year boundaries: in early
    /// January last December's cells get negative columns.
    IsoWeekDelta,
    /// Subtract continuous week indices; correct across year boundaries.
    #[default]
    Continuous,
}

impl WeekMode {
    /// Number of weeks `date` lies before `today`'s week.
    pub fn weeks_between(self, today: NaiveDate, date: NaiveDate) -> i64 {
        match self {
            WeekMode::IsoWeekDelta => {
                i64::from(iso_week_number(today)) - i64::from(iso_week_number(date))
            }
            WeekMode::Continuous => week_index(today) - week_index(date),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeekMode::IsoWeekDelta => "iso-week-delta",
            WeekMode::Continuous => "continuous",
        }
    }
}

impl std::str::FromStr for WeekMode {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "iso-week-delta" | "iso" => Ok(WeekMode::IsoWeekDelta),
            "continuous" => Ok(WeekMode::Continuous),
            _ => Err(crate::error::Error::InvalidArgument(format!(
                "invalid week mode '{}': must be continuous or iso-week-delta",
                s
            ))),
        }
    }
}

impl std::fmt::Display for WeekMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
