//! Export archive extraction

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::retrieval::RetrievalError;
use crate::types::RawSaleRecord;
use crate::utils::csv_io::read_raw_records;

/// Unpack the downloaded export archive and parse its contents.
///
/// The service always wraps the export in a zip archive holding exactly one
/// CSV file. Anything else — an empty archive, multiple entries, or a
/// non-CSV entry — means the export is not what was asked for and fails
/// distinguishably.
pub fn unpack_single_csv(bytes: &[u8]) -> Result<Vec<RawSaleRecord>, RetrievalError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    match archive.len() {
        0 => return Err(RetrievalError::EmptyArchive),
        1 => {}
        count => return Err(RetrievalError::MultipleArchiveEntries { count }),
    }

    let mut entry = archive.by_index(0)?;
    let name = entry.name().to_string();
    let extension = name.rsplit('.').next().unwrap_or("");
    if extension != "csv" {
        return Err(RetrievalError::UnexpectedFileType { name });
    }

    let mut contents = String::new();
    entry.read_to_string(&mut contents)?;
    Ok(read_raw_records(contents.as_bytes())?)
}
