//! Core data model, dataset access and climate queries for SurfsUp
//!
//! The dataset is static: it is loaded once and every query is a pure
//! function of it plus the caller's arguments.

pub mod dataset;
pub mod query;
pub mod stats;
pub mod types;

pub use dataset::*;
pub use query::*;
pub use stats::*;
pub use types::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Dataset contains no measurements")]
    EmptyDataset,

    #[error("No measurements found for station {station_id}")]
    NoDataForStation { station_id: String },

    #[error("Invalid date '{input}', expected YYYY-MM-DD")]
    InvalidDate {
        input: String,
        #[source]
        source: Option<chrono::ParseError>,
    },
}

impl QueryError {
    /// True when the caller supplied bad input rather than the dataset being at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, QueryError::InvalidDate { .. })
    }
}

pub type QueryResult<T> = Result<T, QueryError>;
