// src/error.rs

use chrono::NaiveDate;
use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, DashboardError>;

/// Everything that can stop a dashboard run.
///
/// Field-level parse failures are not here: those are substituted with null
/// while loading and only show up in the load log.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Failed to load data from {location}: HTTP {status}")]
    SourceUnavailable { location: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Fetch {
        url: String,
        source: reqwest::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column '{0}' is missing")]
    MissingColumn(&'static str),

    #[error("Dataset has no record with a purchase timestamp")]
    EmptyDataset,

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Expected a date range as 'YYYY-MM-DD YYYY-MM-DD', got '{0}'")]
    MalformedRange(String),

    #[error("Date {date} is outside the selectable window {min} to {max}")]
    OutOfBounds {
        date: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },

    #[error("Invalid currency code '{0}'")]
    InvalidCurrency(String),

    #[error("Failed to write chart {}: {source}", .path.display())]
    Render {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
