//! Parsing campaign dates and computing the date range to request from EN.

use std::fmt::Display;

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

/// Date formats accepted in the "Campaign Date" column, tried in order.
///
/// Month-first formats are preferred over day-first, matching EN's US exports.
const CAMPAIGN_DATE_FORMATS: [&[BorrowedFormatItem<'static>]; 4] = [
    format_description!("[year]-[month padding:none]-[day padding:none]"),
    format_description!("[year]/[month padding:none]/[day padding:none]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!("[month padding:none]-[day padding:none]-[year]"),
];

/// The date format for the EN export service's `startDate` and `endDate` parameters.
const EXPORT_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[month][day][year]");

/// Parse a campaign date, ignoring any time of day.
///
/// Returns `None` if `value` is empty or not in a recognised format.
pub fn parse_campaign_date(value: &str) -> Option<Date> {
    let date_part = value.trim().split([' ', 'T']).next().unwrap_or_default();

    if date_part.is_empty() {
        return None;
    }

    CAMPAIGN_DATE_FORMATS
        .iter()
        .find_map(|format| Date::parse(date_part, *format).ok())
}

/// The inclusive span of campaign dates in an uploaded CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// The smallest range containing every date in `dates`, or `None` if there are no dates.
    pub fn spanning(dates: impl IntoIterator<Item = Date>) -> Option<Self> {
        dates.into_iter().fold(None, |range, date| match range {
            None => Some(Self {
                start: date,
                end: date,
            }),
            Some(Self { start, end }) => Some(Self {
                start: start.min(date),
                end: end.max(date),
            }),
        })
    }

    /// The start date as an 8-digit `MMDDYYYY` string.
    pub fn start_param(&self) -> Result<String, Error> {
        format_export_date(self.start)
    }

    /// The end date as an 8-digit `MMDDYYYY` string.
    pub fn end_param(&self) -> Result<String, Error> {
        format_export_date(self.end)
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

fn format_export_date(date: Date) -> Result<String, Error> {
    date.format(EXPORT_DATE_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), date.to_string()))
}
