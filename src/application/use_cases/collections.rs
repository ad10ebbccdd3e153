use std::io::ErrorKind;
use std::path::PathBuf;

use serde_json::Value;
use tracing::warn;

use crate::domain::collection::Collection;

/// Serves the pre-generated collection files. Shape problems never become
/// errors: anything that is not an array reads as `[]`.
pub struct CollectionService {
    data_dir: PathBuf,
}

impl CollectionService {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// `None` only when the backing file does not exist.
    pub async fn load(&self, collection: Collection) -> Option<Vec<Value>> {
        let path = self.data_dir.join(collection.file_name());
        match tokio::fs::read(&path).await {
            Ok(bytes) => Some(array_from_bytes(&bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!(
                    collection = collection.name(),
                    path = %path.display(),
                    error = %err,
                    "Failed to read collection, serving empty array"
                );
                Some(Vec::new())
            }
        }
    }
}

/// Accepts a top-level array, or an object wrapping one under `data`.
fn array_from_bytes(bytes: &[u8]) -> Vec<Value> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Object(mut map)) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        Ok(_) => Vec::new(),
        Err(err) => {
            warn!(error = %err, "Collection file is not valid JSON, serving empty array");
            Vec::new()
        }
    }
}
