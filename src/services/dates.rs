// src/services/dates.rs

//! Publication date layouts.
//!
//! Sites describe their date format with a reference-date template: the
//! fixed moment `Mon Jan 2 15:04:05 MST 2006` written the way the site
//! writes dates, e.g. `2006年01月02日` or `Jan 2, 2006`. A layout is
//! translated once, at config load, into a chrono format string.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{AppError, ExtractError};

/// Reference tokens, longest first where they share a prefix.
const TOKENS: &[(&str, &str, Field)] = &[
    ("January", "%B", Field::Date),
    ("Jan", "%b", Field::Date),
    ("Monday", "%A", Field::Date),
    ("Mon", "%a", Field::Date),
    ("MST", "%Z", Field::Time),
    ("2006", "%Y", Field::Date),
    ("Z07:00", "%#z", Field::Offset),
    ("-07:00", "%:z", Field::Offset),
    ("-0700", "%z", Field::Offset),
    (".000000000", "%.9f", Field::Time),
    (".000000", "%.6f", Field::Time),
    (".000", "%.3f", Field::Time),
    (".999999999", "%.f", Field::Time),
    (".999999", "%.f", Field::Time),
    (".999", "%.f", Field::Time),
    ("_2", "%e", Field::Date),
    ("01", "%m", Field::Date),
    ("02", "%d", Field::Date),
    ("03", "%I", Field::Time),
    ("04", "%M", Field::Time),
    ("05", "%S", Field::Time),
    ("06", "%y", Field::Date),
    ("15", "%H", Field::Time),
    ("PM", "%p", Field::Time),
    ("pm", "%p", Field::Time),
    ("1", "%m", Field::Date),
    ("2", "%d", Field::Date),
    ("3", "%I", Field::Time),
    ("4", "%M", Field::Time),
    ("5", "%S", Field::Time),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Date,
    Time,
    Offset,
}

/// A date layout, kept alongside its chrono translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLayout {
    layout: String,
    format: String,
    has_time: bool,
    has_offset: bool,
}

impl DateLayout {
    /// The translated chrono format string.
    pub fn chrono_format(&self) -> &str {
        &self.format
    }

    /// Parse `raw` with this layout.
    ///
    /// Date-only layouts yield midnight. Layouts with a numeric offset are
    /// normalised to UTC.
    pub fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        if self.has_offset {
            DateTime::parse_from_str(raw, &self.format)
                .ok()
                .map(|dt| dt.naive_utc())
        } else if self.has_time {
            NaiveDateTime::parse_from_str(raw, &self.format).ok()
        } else {
            NaiveDate::parse_from_str(raw, &self.format)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        }
    }
}

impl FromStr for DateLayout {
    type Err = AppError;

    fn from_str(layout: &str) -> Result<Self, Self::Err> {
        let mut format = String::with_capacity(layout.len() * 2);
        let mut has_date = false;
        let mut has_time = false;
        let mut has_offset = false;
        let mut rest = layout;

        'scan: while let Some(c) = rest.chars().next() {
            for (token, spec, field) in TOKENS {
                if let Some(tail) = rest.strip_prefix(token) {
                    format.push_str(spec);
                    match field {
                        Field::Date => has_date = true,
                        Field::Time => has_time = true,
                        Field::Offset => has_offset = true,
                    }
                    rest = tail;
                    continue 'scan;
                }
            }
            if c == '%' {
                format.push_str("%%");
            } else {
                format.push(c);
            }
            rest = &rest[c.len_utf8()..];
        }

        if !has_date {
            return Err(AppError::validation(format!(
                "date format '{layout}' contains no reference date (e.g. 2006-01-02)"
            )));
        }

        Ok(Self {
            layout: layout.to_string(),
            format,
            has_time: has_time || has_offset,
            has_offset,
        })
    }
}

impl fmt::Display for DateLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.layout)
    }
}

/// Try each layout in order and return the first successful parse.
pub fn parse_date(raw: &str, layouts: &[DateLayout]) -> Result<NaiveDateTime, ExtractError> {
    layouts
        .iter()
        .find_map(|layout| layout.parse(raw))
        .ok_or_else(|| ExtractError::DateUnparseable {
            raw: raw.to_string(),
            formats: layouts.iter().map(|l| l.layout.clone()).collect(),
        })
}
