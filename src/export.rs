//! Bulk export of stored submissions as a zip archive

use crate::error::StoreError;
use crate::storage::RawRecord;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name offered for the archive download
pub const ARCHIVE_FILE_NAME: &str = "submissions.zip";

/// Pack every record into one archive, one `<key>.csv` member each
pub fn build_archive(records: &[RawRecord]) -> Result<Vec<u8>, StoreError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for record in records {
        writer.start_file(format!("{}.csv", record.key), options)?;
        writer.write_all(&record.bytes)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
