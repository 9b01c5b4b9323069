//! Core data types for climate measurements and query results

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{QueryError, QueryResult};

/// Length of the trailing window used by the last-year queries
pub const TRAILING_WINDOW_DAYS: u64 = 365;

/// Calendar date format accepted from callers and used on the wire
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// One daily reading from a station
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Measurement {
    pub station_id: String,
    pub date: NaiveDate,
    /// Missing precipitation readings stay null
    pub precipitation: Option<f64>,
    pub temperature: f64,
}

impl Measurement {
    pub fn new(
        station_id: impl Into<String>,
        date: NaiveDate,
        precipitation: Option<f64>,
        temperature: f64,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            date,
            precipitation,
            temperature,
        }
    }
}

/// Station metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub station_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl Station {
    pub fn new(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            name: None,
            latitude: None,
            longitude: None,
            elevation: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Precipitation per date. Later rows for the same date replace earlier ones.
pub type PrecipitationSeries = BTreeMap<NaiveDate, Option<f64>>;

/// A single temperature reading of the most active station
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemperatureObservation {
    pub date: NaiveDate,
    pub temperature: f64,
}

/// Trailing-year temperature readings for one station
#[derive(Debug, Clone, PartialEq)]
pub struct StationObservations {
    pub station_id: String,
    /// Number of measurements the station has over the whole dataset
    pub measurement_count: usize,
    pub observations: Vec<TemperatureObservation>,
}

/// Minimum, mean and maximum temperature over a set of rows.
///
/// Serialized as a flat `[min, avg, max]` array. All three are `None` when
/// no rows matched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(into = "[Option<f64>; 3]", from = "[Option<f64>; 3]")]
pub struct TemperatureStats {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

impl TemperatureStats {
    pub const EMPTY: TemperatureStats = TemperatureStats {
        min: None,
        avg: None,
        max: None,
    };

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.avg.is_none() && self.max.is_none()
    }
}

impl From<TemperatureStats> for [Option<f64>; 3] {
    fn from(stats: TemperatureStats) -> Self {
        [stats.min, stats.avg, stats.max]
    }
}

impl From<[Option<f64>; 3]> for TemperatureStats {
    fn from([min, avg, max]: [Option<f64>; 3]) -> Self {
        Self { min, avg, max }
    }
}

/// Parse a caller-supplied `YYYY-MM-DD` date.
///
/// Only the zero-padded four-digit-year form is accepted; chrono alone would
/// also take `2017-8-1`, `+2017-08-01` or leading whitespace.
pub fn parse_iso_date(input: &str) -> QueryResult<NaiveDate> {
    let invalid = |source| QueryError::InvalidDate {
        input: input.to_string(),
        source,
    };

    if !is_iso_date_shape(input) {
        return Err(invalid(None));
    }
    NaiveDate::parse_from_str(input, ISO_DATE_FORMAT).map_err(|e| invalid(Some(e)))
}

fn is_iso_date_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// First day of the trailing year ending at `end`.
///
/// Subtracts exactly 365 calendar days, so a window crossing Feb 29 starts
/// one calendar date later than the same window in a common year.
pub fn trailing_year_start(end: NaiveDate) -> NaiveDate {
    end.checked_sub_days(Days::new(TRAILING_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN)
}
