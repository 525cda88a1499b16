//! Retrieval of raw sales records from the POS export service
//!
//! The export service hands out data asynchronously: a job is submitted,
//! polled until it reports success, and the result is downloaded as a zip
//! archive holding exactly one CSV file. This module wraps that flow behind
//! [`SalesDataSource`] so the cleaning engine's callers never deal with the
//! service directly.

pub mod archive;
pub mod client;
pub mod retry;

pub use archive::*;
pub use client::*;
pub use retry::*;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::{CleanError, RawSaleRecord};

/// Source of raw sales records for a date range.
///
/// Implemented by [`ExportApiClient`] against the live export service;
/// tests substitute in-memory fixtures.
#[async_trait]
pub trait SalesDataSource: Send + Sync {
    /// Fetch the raw record set for one outlet over an inclusive date range
    async fn fetch_sales(
        &self,
        outlet: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawSaleRecord>, RetrievalError>;
}

/// Errors that can occur while retrieving sales data
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Outlet '{outlet}' is not present in the credentials configuration; available outlets: {available:?}")]
    UnknownOutlet {
        outlet: String,
        available: Vec<String>,
    },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Export job {job_id} was not ready after {attempts} polling attempts")]
    ExportNotReady { job_id: u64, attempts: u32 },
    #[error("Export job reported success without a download link")]
    MissingFileUrl,
    #[error("Downloaded archive contains no files")]
    EmptyArchive,
    #[error("Downloaded archive contains {count} files, expected exactly one")]
    MultipleArchiveEntries { count: usize },
    #[error("Archive entry '{name}' is not a .csv file")]
    UnexpectedFileType { name: String },
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Record parse error: {0}")]
    Parse(#[from] CleanError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
