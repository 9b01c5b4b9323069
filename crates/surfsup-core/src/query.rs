//! Climate queries over a read-only dataset

use tracing::{debug, instrument};

use crate::dataset::{Dataset, MeasurementFilter};
use crate::stats::TemperatureAccumulator;
use crate::types::{
    parse_iso_date, trailing_year_start, PrecipitationSeries, StationObservations,
    TemperatureObservation, TemperatureStats,
};
use crate::{QueryError, QueryResult};

/// Runs the analytical queries. Holds no state besides the dataset.
#[derive(Debug, Clone)]
pub struct QueryEngine<D> {
    dataset: D,
}

impl<D: Dataset> QueryEngine<D> {
    pub fn new(dataset: D) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    /// Precipitation for the trailing year ending at the latest measurement.
    ///
    /// One entry per date: when several stations report on the same date the
    /// value scanned last is kept. Values are not combined.
    #[instrument(skip(self))]
    pub fn precipitation_last_year(&self) -> QueryResult<PrecipitationSeries> {
        let end = self.dataset.max_date()?;
        let start = trailing_year_start(end);

        let rows = self
            .dataset
            .scan(&MeasurementFilter::all().on_or_after(start));
        let row_count = rows.len();

        let series: PrecipitationSeries = rows
            .into_iter()
            .map(|m| (m.date, m.precipitation))
            .collect();

        debug!(%start, %end, row_count, dates = series.len(), "precipitation window");
        Ok(series)
    }

    pub fn list_stations(&self) -> Vec<String> {
        self.dataset.list_stations()
    }

    /// Temperature readings of the station with the most measurements, over
    /// that station's own trailing year, in scan order.
    #[instrument(skip(self))]
    pub fn most_active_station_observations(&self) -> QueryResult<StationObservations> {
        let counts = self.dataset.station_counts();
        let (station_id, measurement_count) =
            counts.most_active().ok_or(QueryError::EmptyDataset)?;

        let by_station = MeasurementFilter::all().station(station_id);
        let end = self
            .dataset
            .max_date_matching(&by_station)
            .ok_or_else(|| QueryError::NoDataForStation {
                station_id: station_id.to_string(),
            })?;
        let start = trailing_year_start(end);

        let observations: Vec<TemperatureObservation> = self
            .dataset
            .scan(&by_station.on_or_after(start))
            .into_iter()
            .map(|m| TemperatureObservation {
                date: m.date,
                temperature: m.temperature,
            })
            .collect();

        debug!(
            station = station_id,
            measurement_count,
            %start,
            %end,
            observations = observations.len(),
            "most active station window"
        );

        Ok(StationObservations {
            station_id: station_id.to_string(),
            measurement_count,
            observations,
        })
    }

    /// Min/avg/max temperature from `start`, up to `end` when given.
    ///
    /// Both bounds are inclusive. No matching rows (including `start > end`)
    /// yields null stats rather than an error.
    #[instrument(skip(self))]
    pub fn temperature_stats(&self, start: &str, end: Option<&str>) -> QueryResult<TemperatureStats> {
        let mut filter = MeasurementFilter::all().on_or_after(parse_iso_date(start)?);
        if let Some(end) = end {
            filter = filter.on_or_before(parse_iso_date(end)?);
        }

        let acc: TemperatureAccumulator = self
            .dataset
            .scan(&filter)
            .into_iter()
            .map(|m| m.temperature)
            .collect();

        debug!(rows = acc.count(), "temperature stats");
        Ok(acc.result())
    }
}
