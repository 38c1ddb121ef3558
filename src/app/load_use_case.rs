use anyhow::{Context, Result};
use tracing::info;

use crate::app::ports::PayloadSourcePort;
use crate::pipeline::processing::normalize::DefaultNormalizer;
use crate::pipeline::processing::validate::Validator;
use crate::pipeline::session::Session;

/// Use case for turning a payload source into a loaded session
pub struct LoadDatasetUseCase {
    source: Box<dyn PayloadSourcePort>,
    normalizer: DefaultNormalizer,
    validator: Validator,
}

impl LoadDatasetUseCase {
    pub fn new(
        source: Box<dyn PayloadSourcePort>,
        normalizer: DefaultNormalizer,
        validator: Validator,
    ) -> Self {
        Self {
            source,
            normalizer,
            validator,
        }
    }

    /// Fetch, normalize and validate
    pub async fn execute(self) -> Result<Session> {
        let origin = self.source.describe();
        let payload = self
            .source
            .fetch()
            .await
            .with_context(|| format!("fetching payload from {}", origin))?;

        let session = Session::load(self.normalizer, self.validator, &payload)
            .with_context(|| format!("loading payload from {}", origin))?;

        info!(
            "loaded {} records ({} warnings) from {}",
            session.records().len(),
            session.warnings().len(),
            origin
        );
        Ok(session)
    }
}
