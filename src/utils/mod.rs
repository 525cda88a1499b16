//! Utility modules

pub mod csv_io;

pub use csv_io::*;
