//! Read-only access to the measurement and station collections

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::types::{Measurement, Station};
use crate::{QueryError, QueryResult};

/// Predicate over measurements. All set conditions must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementFilter {
    station_id: Option<String>,
    from: Option<NaiveDate>,
    until: Option<NaiveDate>,
}

impl MeasurementFilter {
    /// Filter matching every measurement
    pub fn all() -> Self {
        Self::default()
    }

    pub fn station(mut self, station_id: impl Into<String>) -> Self {
        self.station_id = Some(station_id.into());
        self
    }

    /// Inclusive lower date bound
    pub fn on_or_after(mut self, date: NaiveDate) -> Self {
        self.from = Some(date);
        self
    }

    /// Inclusive upper date bound
    pub fn on_or_before(mut self, date: NaiveDate) -> Self {
        self.until = Some(date);
        self
    }

    pub fn matches(&self, measurement: &Measurement) -> bool {
        if let Some(station_id) = &self.station_id {
            if measurement.station_id != *station_id {
                return false;
            }
        }
        if let Some(from) = self.from {
            if measurement.date < from {
                return false;
            }
        }
        if let Some(until) = self.until {
            if measurement.date > until {
                return false;
            }
        }
        true
    }
}

/// Measurement count per station, in the order stations were first seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationCounts {
    counts: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl StationCounts {
    pub fn record(&mut self, station_id: &str) {
        match self.index.get(station_id) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.index.insert(station_id.to_string(), self.counts.len());
                self.counts.push((station_id.to_string(), 1));
            }
        }
    }

    pub fn get(&self, station_id: &str) -> usize {
        self.index
            .get(station_id)
            .map(|&slot| self.counts[slot].1)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(id, count)| (id.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Station with the highest count. Ties go to the station seen first.
    pub fn most_active(&self) -> Option<(&str, usize)> {
        let mut best: Option<(&str, usize)> = None;
        for (id, count) in self.iter() {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((id, count)),
            }
        }
        best
    }
}

impl<'a> FromIterator<&'a Measurement> for StationCounts {
    fn from_iter<I: IntoIterator<Item = &'a Measurement>>(iter: I) -> Self {
        let mut counts = StationCounts::default();
        for measurement in iter {
            counts.record(&measurement.station_id);
        }
        counts
    }
}

/// Read-side primitives the query engine is built on
pub trait Dataset: Send + Sync {
    /// Latest date over all measurements
    fn max_date(&self) -> QueryResult<NaiveDate> {
        self.max_date_matching(&MeasurementFilter::all())
            .ok_or(QueryError::EmptyDataset)
    }

    /// Latest date over the measurements matching `filter`
    fn max_date_matching(&self, filter: &MeasurementFilter) -> Option<NaiveDate>;

    /// Matching measurements in scan order
    fn scan(&self, filter: &MeasurementFilter) -> Vec<&Measurement>;

    fn station_counts(&self) -> StationCounts;

    /// Station ids from the station collection, in load order
    fn list_stations(&self) -> Vec<String>;

    fn measurement_count(&self) -> usize;
}

/// Dataset held entirely in memory, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    measurements: Vec<Measurement>,
    stations: Vec<Station>,
}

impl MemoryDataset {
    pub fn new(measurements: Vec<Measurement>, stations: Vec<Station>) -> Self {
        Self {
            measurements,
            stations,
        }
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }
}

impl Dataset for MemoryDataset {
    fn max_date_matching(&self, filter: &MeasurementFilter) -> Option<NaiveDate> {
        self.measurements
            .iter()
            .filter(|m| filter.matches(m))
            .map(|m| m.date)
            .max()
    }

    fn scan(&self, filter: &MeasurementFilter) -> Vec<&Measurement> {
        self.measurements
            .iter()
            .filter(|m| filter.matches(m))
            .collect()
    }

    fn station_counts(&self) -> StationCounts {
        self.measurements.iter().collect()
    }

    fn list_stations(&self) -> Vec<String> {
        self.stations.iter().map(|s| s.station_id.clone()).collect()
    }

    fn measurement_count(&self) -> usize {
        self.measurements.len()
    }
}
