use std::sync::Arc;
use bl_core::{RewriteModel, Result};
use tracing::info;
use crate::Config;

pub mod openai;
pub mod passthrough;

pub use openai::OpenAiModel;
pub use passthrough::PassthroughModel;

/// Picks the completion-backed model when a credential is configured and the
/// pass-through model otherwise.
pub fn create_model(config: Config) -> Result<Arc<dyn RewriteModel>> {
    if config.api_key.is_none() {
        info!("No completion API key configured, rewriting is disabled");
        return Ok(Arc::new(PassthroughModel::new()));
    }
    Ok(Arc::new(OpenAiModel::new(config)?))
}
