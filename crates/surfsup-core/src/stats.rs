//! Min/avg/max aggregation over temperature readings

use crate::types::TemperatureStats;

/// Running min, max and mean over a stream of readings
#[derive(Debug, Clone, Default)]
pub struct TemperatureAccumulator {
    min: Option<f64>,
    max: Option<f64>,
    sum: f64,
    count: usize,
}

impl TemperatureAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Aggregates so far. Zero readings give all-null stats, not zeros.
    pub fn result(&self) -> TemperatureStats {
        if self.count == 0 {
            return TemperatureStats::EMPTY;
        }

        TemperatureStats {
            min: self.min,
            avg: Some(self.sum / self.count as f64),
            max: self.max,
        }
    }
}

impl Extend<f64> for TemperatureAccumulator {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl FromIterator<f64> for TemperatureAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}
