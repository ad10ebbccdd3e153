use std::path::Path;

use tracing::{debug, info};

use crate::domain::error::ImportError;
use crate::domain::identifier::{sanitize, sanitize_opt, unique_identifiers, Identifier};
use crate::infrastructure::csv::CsvSource;
use crate::infrastructure::db::sqlite::SqliteTableWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub table: Identifier,
    pub columns: Vec<Identifier>,
    pub rows_inserted: u64,
}

/// Loads CSV sources into TEXT-only tables, replacing any previous table of
/// the same name.
pub struct TableImporter {
    writer: SqliteTableWriter,
}

impl TableImporter {
    pub fn new(writer: SqliteTableWriter) -> Self {
        Self { writer }
    }

    pub fn into_writer(self) -> SqliteTableWriter {
        self.writer
    }

    /// Imports a file into the table named after its base name.
    pub async fn import_file(&self, csv_path: &Path) -> Result<ImportSummary, ImportError> {
        let source = CsvSource::open(csv_path)?;
        self.import_as(&source, table_name_for_path(csv_path)).await
    }

    /// Imports `source` into the table derived from `destination_name`.
    pub async fn import(
        &self,
        source: &CsvSource,
        destination_name: &str,
    ) -> Result<ImportSummary, ImportError> {
        self.import_as(source, sanitize(destination_name)).await
    }

    /// Drops and recreates `table` from `source` in one transaction.
    pub async fn import_as(
        &self,
        source: &CsvSource,
        table: Identifier,
    ) -> Result<ImportSummary, ImportError> {
        let raw_header = source.header()?;
        let records = source.records().skip(1);

        let columns = unique_identifiers(&raw_header);
        debug!(table = %table, header = ?raw_header, columns = ?columns, "Resolved header");

        let mut replace = self.writer.begin_replace(&table, &columns).await?;
        for record in records {
            let values = fit_to_width(record?, replace.width());
            replace.insert(&values).await?;
        }
        let rows_inserted = replace.commit().await?;

        info!(table = %table, rows = rows_inserted, "Imported CSV");

        Ok(ImportSummary {
            table,
            columns,
            rows_inserted,
        })
    }
}

/// The table a CSV file lands in: its base name without extension, sanitized.
pub fn table_name_for_path(csv_path: &Path) -> Identifier {
    let stem = csv_path.file_stem().map(|s| s.to_string_lossy());
    sanitize_opt(stem.as_deref())
}

/// Pads short records with NULLs and drops trailing extra fields.
fn fit_to_width(record: Vec<String>, width: usize) -> Vec<Option<String>> {
    let mut values: Vec<Option<String>> = record.into_iter().take(width).map(Some).collect();
    values.resize(width, None);
    values
}
