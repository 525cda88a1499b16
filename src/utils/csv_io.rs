//! CSV ingestion and emission helpers
//!
//! The engine itself does no I/O; these helpers sit at its boundary and are
//! shared by the retrieval collaborator and by callers writing results out.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use crate::export::UploadRow;
use crate::types::{CleanError, CleanResult, RawSaleRecord, SaleLineItem};

/// Read raw POS export records from a CSV reader.
///
/// A missing or misnamed column surfaces as a schema error; the record set
/// is materialized fully in memory.
pub fn read_raw_records<R: Read>(reader: R) -> CleanResult<Vec<RawSaleRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize()
        .map(|record| record.map_err(|e| CleanError::Schema(e.to_string())))
        .collect()
}

/// Read raw POS export records from a CSV file
pub fn read_raw_records_from_path(path: impl AsRef<Path>) -> CleanResult<Vec<RawSaleRecord>> {
    let file = File::open(path)?;
    read_raw_records(BufReader::new(file))
}

/// Write cleaned line items as CSV
pub fn write_line_items<W: Write>(writer: W, lines: &[SaleLineItem]) -> CleanResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for line in lines {
        csv_writer
            .serialize(line)
            .map_err(|e| CleanError::Schema(e.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write accounting upload rows as CSV
pub fn write_upload_rows<W: Write>(writer: W, rows: &[UploadRow]) -> CleanResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|e| CleanError::Schema(e.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}
