//! Foundation model discovery.

use snippet_core::models::resource::FoundationModelSummary;
use tracing::info;

use crate::api::FoundationModelApi;
use crate::error::BedrockError;

/// Every foundation model visible in the configured region.
pub async fn list_foundation_models(
    api: &dyn FoundationModelApi,
) -> Result<Vec<FoundationModelSummary>, BedrockError> {
    let models = api.list_foundation_models().await?;
    info!(count = models.len(), "listed foundation models");
    Ok(models)
}

/// Models that accept image input, i.e. usable with multimodal invocation.
pub async fn multimodal_models(
    api: &dyn FoundationModelApi,
) -> Result<Vec<FoundationModelSummary>, BedrockError> {
    let models: Vec<_> = list_foundation_models(api)
        .await?
        .into_iter()
        .filter(FoundationModelSummary::accepts_images)
        .collect();
    info!(count = models.len(), "found multimodal models");
    Ok(models)
}
