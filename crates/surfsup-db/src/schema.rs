//! Row types matching the `hawaii.sqlite` layout
//!
//! Dates are stored as `YYYY-MM-DD` text and converted to calendar dates
//! on load.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use surfsup_core::{Measurement, Station, ISO_DATE_FORMAT};

use crate::DbError;

/// Measurement table record (one daily reading per station)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub id: i64,
    pub station: String,
    pub date: String,
    /// Precipitation, NULL when not reported
    pub prcp: Option<f64>,
    /// Temperature observation
    pub tobs: f64,
}

/// Station table record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StationRow {
    pub id: i64,
    pub station: String,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

impl TryFrom<MeasurementRow> for Measurement {
    type Error = DbError;

    fn try_from(row: MeasurementRow) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(row.date.trim(), ISO_DATE_FORMAT).map_err(|e| {
            DbError::InvalidRow {
                table: tables::MEASUREMENT,
                id: row.id,
                reason: format!("bad date '{}': {}", row.date, e),
            }
        })?;

        Ok(Measurement {
            station_id: row.station,
            date,
            precipitation: row.prcp,
            temperature: row.tobs,
        })
    }
}

impl From<StationRow> for Station {
    fn from(row: StationRow) -> Self {
        Station {
            station_id: row.station,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            elevation: row.elevation,
        }
    }
}

/// Table names in the dataset
pub mod tables {
    pub const MEASUREMENT: &str = "measurement";
}
