use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::application::{CollectionService, CountyLookupUseCase};
use crate::domain::collection::Collection;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::facts::{FactRepository, SqliteFactRepository};
use crate::interfaces::http::HttpState;

/// Wires the request handlers from configuration. Missing data files are
/// reported but not fatal: the service answers 404 for them until they appear.
pub fn build_http_state(config: &AppConfig) -> HttpState {
    report_data_files(config);

    let repository: Arc<dyn FactRepository + Send + Sync> = Arc::new(SqliteFactRepository::new(
        config.database_path.clone(),
        Duration::from_secs(config.busy_timeout_secs),
    ));

    HttpState {
        lookup: CountyLookupUseCase::new(repository),
        collections: CollectionService::new(config.data_dir.clone()),
    }
}

fn report_data_files(config: &AppConfig) {
    if config.database_path.exists() {
        info!(database = %config.database_path.display(), "Using lookup database");
    } else {
        warn!(
            database = %config.database_path.display(),
            "Lookup database not found; county_data will answer 404"
        );
    }

    for collection in Collection::ALL {
        let path = config.data_dir.join(collection.file_name());
        if !path.exists() {
            warn!(
                collection = collection.name(),
                path = %path.display(),
                "Collection file not found"
            );
        }
    }
}
