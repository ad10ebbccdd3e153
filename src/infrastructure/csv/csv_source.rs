// ============================================================
// CSV SOURCE
// ============================================================
// Decode a CSV file and hand out its header and data records

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::domain::error::ImportError;

/// A fully decoded CSV source. The header is the first record; everything
/// after it is data.
pub struct CsvSource {
    /// Decoded text, byte-order mark removed
    content: String,
}

impl CsvSource {
    /// Open a file on disk. A missing path is `SourceNotFound`.
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        if !path.is_file() {
            return Err(ImportError::SourceNotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|e| {
            ImportError::SourceUnreadable(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    /// Read everything from `reader` and decode it as UTF-8
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, ImportError> {
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .map_err(|e| ImportError::SourceUnreadable(format!("Failed to read file: {}", e)))?;
        Ok(Self::from_bytes(&buffer))
    }

    /// Decode raw bytes. A leading BOM is dropped and invalid sequences are
    /// replaced instead of rejected.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let (content, _had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
        Self {
            content: content.into_owned(),
        }
    }

    /// The first record. A source without any record has no header.
    pub fn header(&self) -> Result<Vec<String>, ImportError> {
        match self.records().next() {
            Some(Ok(header)) if !header.is_empty() => Ok(header),
            Some(Err(err)) => Err(err),
            _ => Err(ImportError::EmptyHeader),
        }
    }

    /// Iterate over all records, header included, in file order
    pub fn records(&self) -> CsvRecords<'_> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .trim(Trim::None)
            .flexible(true) // Allow rows with different lengths
            .from_reader(self.content.as_bytes());

        CsvRecords {
            inner: reader.into_records(),
            line: 0,
        }
    }
}

/// Record iterator yielding owned fields
pub struct CsvRecords<'a> {
    inner: csv::StringRecordsIntoIter<&'a [u8]>,
    line: usize,
}

impl Iterator for CsvRecords<'_> {
    type Item = Result<Vec<String>, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.inner.next()?;
        self.line += 1;
        Some(
            record
                .map(|r| record_fields(&r))
                .map_err(|e| {
                    ImportError::SourceUnreadable(format!(
                        "Failed to parse CSV record {}: {}",
                        self.line, e
                    ))
                }),
        )
    }
}

fn record_fields(record: &StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}
