//! Business-week calendar
//!
//! Weeks run Friday through Thursday, not the calendar week: a delivery round
//! closes Thursday night and the next batch starts Friday. Every weekly
//! grouping in the engine keys off the `week_id` produced here.
//!
//! The week id encodes the start and end dates as `YYYYMMDD_YYYYMMDD`, so
//! two timestamps in the same business week always map to an identical id
//! and plain lexicographic order over ids equals chronological order.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;

const WEEK_ID_SEPARATOR: char = '_';
const WEEK_ID_DATE_FORMAT: &str = "%Y%m%d";
const LABEL_DATE_FORMAT: &str = "%d/%m/%Y";

/// A resolved business week: stable id plus display label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekRange {
    pub week_id: String,
    pub label: String,
}

/// Maps timestamps to business weeks in a fixed business timezone
///
/// The timezone is the business's, not the host's, so day boundaries stay
/// stable wherever the process runs.
#[derive(Debug, Clone, Copy)]
pub struct WeekCalendar {
    tz: Tz,
}

impl WeekCalendar {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Business week containing the current instant
    pub fn current_week_range(&self) -> WeekRange {
        self.week_range_for(Utc::now().timestamp_millis())
    }

    /// Business week containing the given instant (epoch millis)
    pub fn week_range_for(&self, ts_millis: i64) -> WeekRange {
        let local_day = DateTime::from_timestamp_millis(ts_millis)
            .unwrap_or(DateTime::UNIX_EPOCH)
            .with_timezone(&self.tz)
            .date_naive();
        let start = start_of_business_week(local_day);
        let end = start + Duration::days(6);
        WeekRange {
            week_id: format!(
                "{}{}{}",
                start.format(WEEK_ID_DATE_FORMAT),
                WEEK_ID_SEPARATOR,
                end.format(WEEK_ID_DATE_FORMAT)
            ),
            label: format_label(start, end),
        }
    }

    /// Re-derive the display label from a week id
    ///
    /// If the id does not split into exactly two valid date tokens the id is
    /// returned unchanged. That is the fallback for malformed ids, not an
    /// error.
    pub fn label_from_week_id(week_id: &str) -> String {
        let parts: Vec<&str> = week_id.split(WEEK_ID_SEPARATOR).collect();
        let [start_token, end_token] = parts.as_slice() else {
            return week_id.to_string();
        };
        let (Ok(start), Ok(end)) = (
            NaiveDate::parse_from_str(start_token, WEEK_ID_DATE_FORMAT),
            NaiveDate::parse_from_str(end_token, WEEK_ID_DATE_FORMAT),
        ) else {
            return week_id.to_string();
        };
        format_label(start, end)
    }
}

/// Walk back from the calendar day-of-week to the most recent Friday
fn start_of_business_week(day: NaiveDate) -> NaiveDate {
    let offset = match day.weekday() {
        Weekday::Fri => 0,
        Weekday::Sat => 1,
        Weekday::Sun => 2,
        Weekday::Mon => 3,
        Weekday::Tue => 4,
        Weekday::Wed => 5,
        Weekday::Thu => 6,
    };
    day - Duration::days(offset)
}

fn format_label(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{} - {}",
        start.format(LABEL_DATE_FORMAT),
        end.format(LABEL_DATE_FORMAT)
    )
}
