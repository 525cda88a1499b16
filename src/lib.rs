//! # POS Sales Reconciliation
//!
//! A library for turning raw point-of-sale exports into a clean,
//! deduplicated sales record set ready for accounting import.
//!
//! ## Features
//!
//! - **Schema normalization**: typed records, day-first date parsing, and
//!   strict schema errors for malformed exports
//! - **Line-item deduplication**: merges duplicate rows per
//!   `(receipt, item, variant)` key with explicit aggregation rules
//! - **Refund reconciliation**: nets refund events against their original
//!   sale lines, recomputes price-derived fields, and drops fully-refunded
//!   lines
//! - **Retrieval**: async client for the POS export service with bounded
//!   polling and strict archive validation
//! - **Accounting export**: maps the cleaned record set into the external
//!   accounting system's upload schema per outlet
//!
//! ## Quick Start
//!
//! ```rust
//! use pos_recon::{clean_sales_data, read_raw_records};
//!
//! let csv_data = std::fs::read("sales.csv").ok();
//! if let Some(bytes) = csv_data {
//!     let raw = read_raw_records(bytes.as_slice()).unwrap();
//!     let cleaned = clean_sales_data(raw).unwrap();
//!     println!("{} cleaned line items", cleaned.len());
//! }
//! ```

pub mod cleaning;
pub mod config;
pub mod export;
pub mod retrieval;
pub mod types;
pub mod utils;

// Re-export commonly used types and operations
pub use cleaning::*;
pub use config::*;
pub use export::*;
pub use retrieval::{
    unpack_single_csv, ExportApiClient, RetrievalError, RetryPolicy, SalesDataSource,
};
pub use types::*;
pub use utils::*;
