use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::error::LookupError;
use crate::domain::lookup::{FactRow, LookupRequest};
use crate::infrastructure::db::facts::FactRepository;

pub struct CountyLookupUseCase {
    repository: Arc<dyn FactRepository + Send + Sync>,
}

impl CountyLookupUseCase {
    pub fn new(repository: Arc<dyn FactRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Validates the decoded body and returns the matching fact rows.
    pub async fn execute_json(&self, body: &Value) -> Result<Vec<FactRow>, LookupError> {
        let request = LookupRequest::from_json(body)?;
        self.execute(&request).await
    }

    /// Validation happens before any storage access. An empty join is
    /// `NotFound`, never an empty list.
    pub async fn execute(&self, request: &LookupRequest) -> Result<Vec<FactRow>, LookupError> {
        let valid = request.validate()?;

        let rows = self
            .repository
            .facts_for_zip(&valid.zip, valid.measure)
            .await?;

        if rows.is_empty() {
            debug!(zip = %valid.zip, measure = %valid.measure, "No fact rows for lookup");
            return Err(LookupError::NotFound);
        }

        info!(
            zip = %valid.zip,
            measure = %valid.measure,
            rows = rows.len(),
            "County lookup served"
        );
        Ok(rows)
    }
}
