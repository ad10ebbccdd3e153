use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::domain::error::ImportError;
use crate::domain::identifier::Identifier;

/// Options for the import side: the file is created when missing.
pub fn writable_options(db_path: &Path, busy_timeout: Duration) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .busy_timeout(busy_timeout)
}

/// Options for request-scoped reads. Never creates the file.
pub fn read_only_options(db_path: &Path, busy_timeout: Duration) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(false)
        .read_only(true)
        .busy_timeout(busy_timeout)
}

/// Writes imported tables into a SQLite file.
pub struct SqliteTableWriter {
    pool: SqlitePool,
}

impl SqliteTableWriter {
    pub async fn init(db_path: &Path, busy_timeout: Duration) -> Result<Self, ImportError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(busy_timeout)
            .connect_with(writable_options(db_path, busy_timeout))
            .await
            .map_err(|e| {
                ImportError::StorageFailure(format!(
                    "Could not open SQLite DB '{}': {}",
                    db_path.display(),
                    e
                ))
            })?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Opens a transaction that drops `table` and recreates it with TEXT
    /// columns. Nothing is visible to other connections until
    /// [`TableReplace::commit`]; dropping the handle rolls everything back.
    pub async fn begin_replace(
        &self,
        table: &Identifier,
        columns: &[Identifier],
    ) -> Result<TableReplace, ImportError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table.quoted()))
            .execute(&mut *tx)
            .await?;

        let cols_sql = columns
            .iter()
            .map(|c| format!("{} TEXT", c.quoted()))
            .collect::<Vec<_>>()
            .join(", ");
        sqlx::query(&format!("CREATE TABLE {} ({})", table.quoted(), cols_sql))
            .execute(&mut *tx)
            .await?;

        debug!(table = %table, columns = columns.len(), "Recreated table");

        let col_list = columns
            .iter()
            .map(Identifier::quoted)
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; columns.len()].join(", ");
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.quoted(),
            col_list,
            placeholders
        );

        Ok(TableReplace {
            tx,
            insert_sql,
            width: columns.len(),
            inserted: 0,
        })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// An in-flight destructive replace of one table.
pub struct TableReplace {
    tx: Transaction<'static, Sqlite>,
    insert_sql: String,
    width: usize,
    inserted: u64,
}

impl TableReplace {
    pub fn width(&self) -> usize {
        self.width
    }

    /// Inserts one row. `values` must already be exactly [`TableReplace::width`] long.
    pub async fn insert(&mut self, values: &[Option<String>]) -> Result<(), ImportError> {
        if values.len() != self.width {
            return Err(ImportError::StorageFailure(format!(
                "row has {} values for {} columns",
                values.len(),
                self.width
            )));
        }
        let mut query = sqlx::query(&self.insert_sql);
        for value in values {
            query = query.bind(value.as_deref());
        }
        query.execute(&mut *self.tx).await?;
        self.inserted += 1;
        Ok(())
    }

    /// Commits schema and data together and returns the inserted row count.
    pub async fn commit(self) -> Result<u64, ImportError> {
        self.tx.commit().await?;
        Ok(self.inserted)
    }
}
