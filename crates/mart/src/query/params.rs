// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use chrono::{Month, NaiveDate};
use duckdb::types::Value;
use serde::Serialize;

use crate::error::{Error, Result};

/// Half-open date interval: `start <= date < end`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Rejects empty and inverted ranges
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end <= start {
            return Err(Error::InvalidParameter(format!(
                "date range end {end} must be after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse two ISO `YYYY-MM-DD` dates
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| Error::InvalidParameter(format!("bad date {s:?}: {e}")))
        };
        Self::new(parse(start)?, parse(end)?)
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// `start`, `end` as bind values for `CAST(? AS DATE)` placeholders
    #[must_use]
    pub fn bind_values(&self) -> [Value; 2] {
        [
            Value::Text(self.start.to_string()),
            Value::Text(self.end.to_string()),
        ]
    }
}

impl Default for DateRange {
    /// The first quarter of 2024
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
            end: NaiveDate::from_ymd_opt(2024, 4, 1).expect("valid date"),
        }
    }
}

/// A calendar month of a given year, matched on `dm_date.year` / `month_name`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: Month,
}

impl YearMonth {
    #[must_use]
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// Parse a year and an English month name or number
    pub fn parse(year: i32, month: &str) -> Result<Self> {
        let month = match month.trim().parse::<u8>() {
            Ok(n) => Month::try_from(n).map_err(|_| {
                Error::InvalidParameter(format!("month number {n} out of range"))
            })?,
            Err(_) => Month::from_str(month.trim())
                .map_err(|_| Error::InvalidParameter(format!("unknown month {month:?}")))?,
        };
        Ok(Self { year, month })
    }

    /// The mart stores lower-case month names
    #[must_use]
    pub fn month_name(&self) -> String {
        self.month.name().to_lowercase()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month.name(), self.year)
    }
}

/// Which end of a trip a zone or date join uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Pickup,
    Dropoff,
}

impl Side {
    #[must_use]
    pub fn zone_key(self) -> &'static str {
        match self {
            Side::Pickup => "key_zone_pickup",
            Side::Dropoff => "key_zone_dropoff",
        }
    }

    #[must_use]
    pub fn date_key(self) -> &'static str {
        match self {
            Side::Pickup => "key_date_pickup",
            Side::Dropoff => "key_date_dropoff",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Side::Pickup => "pickup",
            Side::Dropoff => "dropoff",
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pickup" | "pu" => Ok(Side::Pickup),
            "dropoff" | "do" => Ok(Side::Dropoff),
            other => Err(Error::InvalidParameter(format!(
                "side must be pickup or dropoff, got {other:?}"
            ))),
        }
    }
}

/// Render an optional row limit
pub(crate) fn limit_clause(limit: Option<u32>) -> String {
    match limit {
        Some(n) => format!("\nLIMIT {n}"),
        None => String::new(),
    }
}
