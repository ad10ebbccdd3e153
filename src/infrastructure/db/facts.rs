use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Connection, Row};
use tracing::warn;

use super::sqlite::read_only_options;
use crate::domain::error::LookupError;
use crate::domain::lookup::FactRow;
use crate::domain::measure::Measure;

/// Zip codes resolve to distinct (county, state) pairs first; the fact rows
/// for those counties are then filtered by measure. Ordering is part of the
/// response contract.
const FACTS_BY_ZIP_SQL: &str = r#"
WITH z AS (
    SELECT county, state_abbreviation AS state
    FROM zip_county
    WHERE zip = ?
    GROUP BY county, state
)
SELECT
    chr.state AS state,
    chr.county AS county,
    chr.state_code AS state_code,
    chr.county_code AS county_code,
    chr.year_span AS year_span,
    chr.measure_name AS measure_name,
    chr.measure_id AS measure_id,
    chr.numerator AS numerator,
    chr.denominator AS denominator,
    chr.raw_value AS raw_value,
    chr.confidence_interval_lower_bound AS confidence_interval_lower_bound,
    chr.confidence_interval_upper_bound AS confidence_interval_upper_bound,
    chr.data_release_year AS data_release_year,
    chr.fipscode AS fipscode
FROM county_health_rankings chr
JOIN z ON z.county = chr.county AND z.state = chr.state
WHERE chr.measure_name = ?
ORDER BY chr.data_release_year, chr.year_span, chr.measure_id
"#;

#[async_trait]
pub trait FactRepository {
    /// All fact rows for the counties `zip` maps to, for one measure.
    /// An empty result is not an error at this layer.
    async fn facts_for_zip(&self, zip: &str, measure: Measure)
        -> Result<Vec<FactRow>, LookupError>;
}

/// Reads facts from a SQLite file, one connection per call.
pub struct SqliteFactRepository {
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteFactRepository {
    pub fn new(db_path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout,
        }
    }

    async fn open(&self) -> Result<SqliteConnection, LookupError> {
        let exists = tokio::fs::try_exists(&self.db_path).await.unwrap_or(false);
        if !exists {
            return Err(LookupError::StorageUnavailable);
        }
        let options = read_only_options(&self.db_path, self.busy_timeout);
        Ok(SqliteConnection::connect_with(&options).await?)
    }
}

#[async_trait]
impl FactRepository for SqliteFactRepository {
    async fn facts_for_zip(
        &self,
        zip: &str,
        measure: Measure,
    ) -> Result<Vec<FactRow>, LookupError> {
        let mut conn = self.open().await?;

        let fetched = sqlx::query(FACTS_BY_ZIP_SQL)
            .bind(zip)
            .bind(measure.as_str())
            .fetch_all(&mut conn)
            .await;

        // Close before looking at the result so every path releases the handle.
        if let Err(err) = conn.close().await {
            warn!(error = %err, "Failed to close lookup connection");
        }

        Ok(fetched?.iter().map(fact_row_from).collect())
    }
}

fn fact_row_from(row: &SqliteRow) -> FactRow {
    FactRow::from_values((0..FactRow::COLUMNS.len()).map(|idx| column_text(row, idx)))
}

/// Renders one column as text. `None` only for SQL NULL.
fn column_text(row: &SqliteRow, index: usize) -> Option<String> {
    // Try different types in order of likelihood
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v;
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map(|n| n.to_string());
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map(real_text);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v.map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
    }
    Some(String::new())
}

/// Shortest round-trip form of a REAL. Integral values keep a `.0`; very large
/// or very small magnitudes use a signed two-digit exponent (`1e+16`, `1e-05`).
fn real_text(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let scientific = format!("{:e}", value);
        if let Some((mantissa, exponent)) = scientific.split_once('e') {
            if let Ok(exponent) = exponent.parse::<i32>() {
                let sign = if exponent < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
            }
        }
        return scientific;
    }

    let plain = value.to_string();
    if plain.contains('.') {
        plain
    } else {
        format!("{}.0", plain)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sqlx::sqlite::SqliteConnectOptions;
    use std::path::Path;

    /// Builds a small rankings database: 94110 maps to San Francisco (twice,
    /// to exercise the dedup), 94501 maps to Alameda.
    pub(crate) async fn seed_fixture(db_path: &Path) {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let mut conn = SqliteConnection::connect_with(&options).await.unwrap();

        for stmt in [
            "CREATE TABLE zip_county (zip TEXT, county TEXT, state_abbreviation TEXT)",
            "INSERT INTO zip_county VALUES ('94110', 'San Francisco County', 'CA')",
            "INSERT INTO zip_county VALUES ('94110', 'San Francisco County', 'CA')",
            "INSERT INTO zip_county VALUES ('94501', 'Alameda County', 'CA')",
            "CREATE TABLE county_health_rankings (
                state TEXT, county TEXT, state_code TEXT, county_code TEXT,
                year_span TEXT, measure_name TEXT, measure_id TEXT,
                numerator TEXT, denominator TEXT, raw_value TEXT,
                confidence_interval_lower_bound TEXT, confidence_interval_upper_bound TEXT,
                data_release_year TEXT, fipscode TEXT
            )",
            "INSERT INTO county_health_rankings VALUES
                ('CA', 'San Francisco County', '06', '075', '2011', 'Adult obesity', '11',
                 NULL, NULL, '0.17', '0.15', '0.19', '2014', '06075')",
            "INSERT INTO county_health_rankings VALUES
                ('CA', 'San Francisco County', '06', '075', '2009', 'Adult obesity', '11',
                 NULL, NULL, '0.16', '0.14', '0.18', '2012', '06075')",
            "INSERT INTO county_health_rankings VALUES
                ('CA', 'San Francisco County', '06', '075', '2012', 'Uninsured', '85',
                 '90000', '700000', '0.12', '0.11', '0.13', '2014', '06075')",
            "INSERT INTO county_health_rankings VALUES
                ('CA', 'Alameda County', '06', '001', '2011', 'Adult obesity', '11',
                 '200000', '1200000', '0.21', '0.2', '0.22', '2014', '06001')",
        ] {
            sqlx::query(stmt).execute(&mut conn).await.unwrap();
        }
        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_rows_ordered_and_nulls_blank() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data.db");
        seed_fixture(&db_path).await;

        let repo = SqliteFactRepository::new(&db_path, Duration::from_secs(5));
        let rows = repo
            .facts_for_zip("94110", Measure::AdultObesity)
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].data_release_year, "2012");
        assert_eq!(rows[1].data_release_year, "2014");
        assert!(rows.iter().all(|r| r.county == "San Francisco County"));
        assert_eq!(rows[0].numerator, "");
        assert_eq!(rows[0].raw_value, "0.16");
    }

    #[tokio::test]
    async fn test_no_mapping_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data.db");
        seed_fixture(&db_path).await;

        let repo = SqliteFactRepository::new(&db_path, Duration::from_secs(5));
        let rows = repo
            .facts_for_zip("10001", Measure::AdultObesity)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteFactRepository::new(dir.path().join("data.db"), Duration::from_secs(1));
        let err = repo
            .facts_for_zip("94110", Measure::AdultObesity)
            .await
            .unwrap_err();
        assert_eq!(err, LookupError::StorageUnavailable);
        assert!(!dir.path().join("data.db").exists());
    }

    #[tokio::test]
    async fn test_missing_tables_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data.db");
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        SqliteConnection::connect_with(&options)
            .await
            .unwrap()
            .close()
            .await
            .unwrap();

        let repo = SqliteFactRepository::new(&db_path, Duration::from_secs(1));
        let err = repo
            .facts_for_zip("94110", Measure::AdultObesity)
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Storage(_)));
    }

    #[tokio::test]
    async fn test_numeric_columns_are_stringified() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data.db");
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
        let row = sqlx::query("SELECT 42, 2.5, NULL, 'x', x'6869', 3.0")
            .fetch_one(&mut conn)
            .await
            .unwrap();
        assert_eq!(column_text(&row, 0).as_deref(), Some("42"));
        assert_eq!(column_text(&row, 1).as_deref(), Some("2.5"));
        assert_eq!(column_text(&row, 5).as_deref(), Some("3.0"));
        assert_eq!(column_text(&row, 2), None);
        assert_eq!(column_text(&row, 3).as_deref(), Some("x"));
        assert_eq!(column_text(&row, 4).as_deref(), Some("hi"));
        conn.close().await.unwrap();
    }

    #[test]
    fn test_real_text() {
        assert_eq!(real_text(3.0), "3.0");
        assert_eq!(real_text(-0.0), "-0.0");
        assert_eq!(real_text(0.0), "0.0");
        assert_eq!(real_text(0.21), "0.21");
        assert_eq!(real_text(123456.789), "123456.789");
        assert_eq!(real_text(1e16), "1e+16");
        assert_eq!(real_text(2.5e20), "2.5e+20");
        assert_eq!(real_text(0.00001), "1e-05");
        assert_eq!(real_text(0.0001), "0.0001");
        assert_eq!(real_text(-1.5e-7), "-1.5e-07");
        assert_eq!(real_text(f64::INFINITY), "inf");
    }
}
