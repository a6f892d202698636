//! # Display Formatting
//!
//! Date renderings shared by report tables, exports and date inputs.
//!
//! | Value          | Format               | Example             |
//! |----------------|----------------------|---------------------|
//! | Date           | `dd-mm-yyyy`         | `05-03-2024`        |
//! | Date + time    | `dd-mm-yyyy HH:MM`   | `05-03-2024 14:07`  |
//! | File-name date | `ddmmyyyy`           | `05032024`          |

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ValidationError;

pub const DATE_FORMAT: &str = "%d-%m-%Y";
pub const DATETIME_FORMAT: &str = "%d-%m-%Y %H:%M";
pub const FILE_DATE_FORMAT: &str = "%d%m%Y";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(at: DateTime<Utc>) -> String {
    at.format(DATETIME_FORMAT).to_string()
}

pub fn format_file_date(date: NaiveDate) -> String {
    date.format(FILE_DATE_FORMAT).to_string()
}

/// Parses a date typed as `dd-mm-yyyy` (or ISO `yyyy-mm-dd`).
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .map_err(|_| ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: format!("expected dd-mm-yyyy, got '{}'", input),
        })
}
