//! SQLite access for the SurfsUp climate dataset
//!
//! Reads the existing `measurement` and `station` tables - NO migrations.
//! The dataset is loaded once into memory; nothing here writes to it.

pub mod client;
pub mod queries;
pub mod schema;

pub use client::*;
pub use schema::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Invalid {table} row {id}: {reason}")]
    InvalidRow {
        table: &'static str,
        id: i64,
        reason: String,
    },
}

pub type DbResult<T> = Result<T, DbError>;
