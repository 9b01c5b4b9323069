//! Read queries over the measurement and station tables

use crate::schema::{MeasurementRow, StationRow};
use crate::{DbClient, DbResult};
use sqlx::sqlite::SqliteConnection;
use sqlx::Row;
use surfsup_core::{MemoryDataset, Measurement, Station};
use tracing::{debug, instrument};

// Rows come back in primary key order; that order is the dataset's scan order.
const SELECT_MEASUREMENTS: &str = r#"
    SELECT id, station, date,
           CAST(prcp AS REAL) AS prcp,
           CAST(tobs AS REAL) AS tobs
    FROM measurement
    ORDER BY id ASC
"#;

const SELECT_STATIONS: &str = r#"
    SELECT id, station, name,
           CAST(latitude AS REAL) AS latitude,
           CAST(longitude AS REAL) AS longitude,
           CAST(elevation AS REAL) AS elevation
    FROM station
    ORDER BY id ASC
"#;

async fn measurements_on(conn: &mut SqliteConnection) -> DbResult<Vec<Measurement>> {
    let rows = sqlx::query_as::<_, MeasurementRow>(SELECT_MEASUREMENTS)
        .fetch_all(&mut *conn)
        .await?;

    rows.into_iter().map(Measurement::try_from).collect()
}

async fn stations_on(conn: &mut SqliteConnection) -> DbResult<Vec<Station>> {
    let rows = sqlx::query_as::<_, StationRow>(SELECT_STATIONS)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.into_iter().map(Station::from).collect())
}

impl DbClient {
    /// Get all measurements in load order
    #[instrument(skip(self))]
    pub async fn fetch_measurements(&self) -> DbResult<Vec<Measurement>> {
        let mut conn = self.pool().acquire().await?;
        let measurements = measurements_on(&mut conn).await?;

        debug!("Retrieved {} measurements", measurements.len());
        Ok(measurements)
    }

    /// Get all stations in load order
    #[instrument(skip(self))]
    pub async fn fetch_stations(&self) -> DbResult<Vec<Station>> {
        let mut conn = self.pool().acquire().await?;
        let stations = stations_on(&mut conn).await?;

        debug!("Retrieved {} stations", stations.len());
        Ok(stations)
    }

    /// Get count of measurement records
    #[instrument(skip(self))]
    pub async fn count_measurements(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM measurement")
            .fetch_one(self.pool())
            .await?;

        Ok(row.get("count"))
    }

    /// Load both collections over a single connection.
    ///
    /// The connection goes back to the pool when this returns, on success
    /// or on error.
    #[instrument(skip(self))]
    pub async fn load_dataset(&self) -> DbResult<MemoryDataset> {
        let mut conn = self.pool().acquire().await?;
        let measurements = measurements_on(&mut conn).await?;
        let stations = stations_on(&mut conn).await?;

        debug!(
            "Loaded dataset with {} measurements and {} stations",
            measurements.len(),
            stations.len()
        );
        Ok(MemoryDataset::new(measurements, stations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DbConnectionBuilder, DbError};
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
    use sqlx::Executor;
    use std::str::FromStr;
    use surfsup_core::Dataset;

    const SCHEMA: &str = r#"
        CREATE TABLE measurement (
            id INTEGER PRIMARY KEY,
            station TEXT,
            date TEXT,
            prcp FLOAT,
            tobs FLOAT
        );
        CREATE TABLE station (
            id INTEGER PRIMARY KEY,
            station TEXT,
            name TEXT,
            latitude FLOAT,
            longitude FLOAT,
            elevation FLOAT
        );
    "#;

    const FIXTURE: &str = r#"
        INSERT INTO station (id, station, name, latitude, longitude, elevation) VALUES
            (1, 'USC00519397', 'WAIKIKI 717.2, HI US', 21.2716, -157.8168, 3.0),
            (2, 'USC00513117', 'KANEOHE 838.1, HI US', 21.4234, -157.8015, 14.6);
        INSERT INTO measurement (id, station, date, prcp, tobs) VALUES
            (1, 'USC00519397', '2017-08-20', 4.0, 81),
            (2, 'USC00519397', '2017-08-23', NULL, 79.0),
            (3, 'USC00513117', '2017-08-23', 2.0, 76.0);
    "#;

    async fn memory_client() -> DbClient {
        // A single connection so every query sees the same in-memory database
        let opts = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
        let client = DbClient::with_options(opts, 1).await.unwrap();
        client.pool().execute(SCHEMA).await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_load_dataset() {
        let client = memory_client().await;
        client.pool().execute(FIXTURE).await.unwrap();

        let dataset = client.load_dataset().await.unwrap();
        assert_eq!(dataset.measurement_count(), 3);
        assert_eq!(dataset.list_stations(), vec!["USC00519397", "USC00513117"]);

        let first = &dataset.measurements()[0];
        assert_eq!(first.station_id, "USC00519397");
        assert_eq!(first.temperature, 81.0);
        assert_eq!(dataset.measurements()[1].precipitation, None);
        assert_eq!(dataset.stations()[0].elevation, Some(3.0));

        assert_eq!(client.count_measurements().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_fetch_preserves_primary_key_order() {
        let client = memory_client().await;
        client
            .pool()
            .execute(
                "INSERT INTO measurement (id, station, date, prcp, tobs) VALUES
                    (20, 'B', '2017-01-02', 0.5, 70.0),
                    (10, 'A', '2017-01-01', 0.1, 71.0);",
            )
            .await
            .unwrap();

        let measurements = client.fetch_measurements().await.unwrap();
        let ids: Vec<_> = measurements.iter().map(|m| m.station_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(client.fetch_stations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_date_fails_load() {
        let client = memory_client().await;
        client
            .pool()
            .execute("INSERT INTO measurement (id, station, date, prcp, tobs) VALUES (5, 'A', 'yesterday', NULL, 70.0);")
            .await
            .unwrap();

        let err = client.load_dataset().await.unwrap_err();
        assert!(matches!(err, DbError::InvalidRow { id: 5, .. }));
    }

    #[tokio::test]
    async fn test_load_from_read_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hawaii.sqlite");

        let writable = DbConnectionBuilder::new(&path)
            .read_only(false)
            .build()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete);
        let setup = DbClient::with_options(writable, 1).await.unwrap();
        setup.pool().execute(SCHEMA).await.unwrap();
        setup.pool().execute(FIXTURE).await.unwrap();
        setup.close().await;

        let client = DbClient::with_options(DbConnectionBuilder::new(&path).build(), 2)
            .await
            .unwrap();
        let dataset = client.load_dataset().await.unwrap();
        assert_eq!(dataset.measurement_count(), 3);

        let write = sqlx::query("DELETE FROM measurement")
            .execute(client.pool())
            .await;
        assert!(write.is_err());
        client.close().await;
    }
}
