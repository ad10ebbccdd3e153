use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use county_health_lib::app::init_tracing;
use county_health_lib::application::{ImportSummary, TableImporter};
use county_health_lib::domain::error::ImportError;
use county_health_lib::infrastructure::config::AppConfig;
use county_health_lib::infrastructure::csv::CsvSource;
use county_health_lib::infrastructure::db::sqlite::SqliteTableWriter;

const EXIT_FAILURE: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Import a CSV into a SQLite database as a table named after the CSV file."
)]
struct Args {
    /// Path to SQLite database, e.g. data.db
    db_path: PathBuf,
    /// Path to CSV file to import
    csv_path: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Usage errors exit with status 2.
    let args = Args::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    init_tracing(&config.log_filter);

    let busy_timeout = Duration::from_secs(config.busy_timeout_secs);
    match import(&args.db_path, &args.csv_path, busy_timeout).await {
        Ok(summary) => {
            println!("{}", success_line(&summary));
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn success_line(summary: &ImportSummary) -> String {
    format!(
        "Successfully created/updated table '{}' with {} rows",
        summary.table, summary.rows_inserted
    )
}

/// The source and its header are checked before the database is opened, so
/// a bad source never creates an empty database file.
async fn import(
    db_path: &Path,
    csv_path: &Path,
    busy_timeout: Duration,
) -> Result<ImportSummary, ImportError> {
    CsvSource::open(csv_path)?.header()?;

    let writer = SqliteTableWriter::init(db_path, busy_timeout).await?;
    let importer = TableImporter::new(writer);
    let result = importer.import_file(csv_path).await;
    importer.into_writer().close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_args_positional() {
        let args = Args::try_parse_from(["csv_to_sqlite", "data.db", "zip_county.csv"]).unwrap();
        assert_eq!(args.db_path, PathBuf::from("data.db"));
        assert_eq!(args.csv_path, PathBuf::from("zip_county.csv"));
    }

    #[test]
    fn test_wrong_arg_count_is_usage_error() {
        for argv in [
            vec!["csv_to_sqlite"],
            vec!["csv_to_sqlite", "data.db"],
            vec!["csv_to_sqlite", "data.db", "a.csv", "extra"],
        ] {
            let err = Args::try_parse_from(argv.iter().copied()).unwrap_err();
            assert_ne!(err.kind(), ErrorKind::DisplayHelp);
            assert_eq!(err.exit_code(), 2, "{argv:?}");
        }
    }

    #[tokio::test]
    async fn test_import_success_line() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data.db");
        let csv_path = dir.path().join("Zip County.csv");
        std::fs::write(&csv_path, "ZIP,County\n94110,San Francisco\n94501,Alameda\n").unwrap();

        let summary = import(&db_path, &csv_path, TIMEOUT).await.unwrap();
        assert_eq!(
            success_line(&summary),
            "Successfully created/updated table 'zip_county' with 2 rows"
        );
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_missing_source_leaves_no_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data.db");
        let csv_path = dir.path().join("missing.csv");

        let err = import(&db_path, &csv_path, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ImportError::SourceNotFound(_)));
        assert!(err.to_string().starts_with("CSV not found: "));
        assert!(!db_path.exists());
    }

    #[tokio::test]
    async fn test_empty_header_leaves_no_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data.db");
        let csv_path = dir.path().join("empty.csv");
        std::fs::write(&csv_path, "").unwrap();

        let err = import(&db_path, &csv_path, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ImportError::EmptyHeader));
        assert_eq!(err.to_string(), "CSV has no header row.");
        assert!(!db_path.exists());
    }

    #[tokio::test]
    async fn test_unopenable_database_is_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("t.csv");
        std::fs::write(&csv_path, "a\n1\n").unwrap();
        // A directory cannot be opened as a database file.
        let db_path = dir.path().to_path_buf();

        let err = import(&db_path, &csv_path, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ImportError::StorageFailure(_)));
    }
}
