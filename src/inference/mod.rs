pub mod codec;
pub mod image_client;
pub mod transport;

use crate::{
    config::InferenceConfig,
    error::{Result, StudioError},
};
use std::sync::Arc;

pub use image_client::{ImageClient, RenderedImage};
pub use transport::{BackendResponse, HttpInferenceBackend, ImagePayload, InferenceBackend};

fn http_backend(config: &InferenceConfig, url: &str, token: &str) -> Result<HttpInferenceBackend> {
    match config.timeout {
        Some(timeout) => HttpInferenceBackend::with_timeout(url, token, timeout),
        None => Ok(HttpInferenceBackend::new(url, token)),
    }
}

/// Build an `ImageClient` talking to the configured HTTP endpoints.
pub fn from_config(config: &InferenceConfig) -> Result<ImageClient> {
    let endpoint = config
        .endpoint
        .as_deref()
        .ok_or_else(|| StudioError::Config("INFERENCE_ENDPOINT is required".into()))?;
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| StudioError::Config("HF_TOKEN is required".into()))?;
    let upscale_endpoint = config.upscale_endpoint().unwrap_or(endpoint);

    let generator = Arc::new(http_backend(config, endpoint, token)?);
    let upscaler = Arc::new(http_backend(config, upscale_endpoint, token)?);

    log::info!("🖼️  Generation endpoint: {}", generator.url());
    if upscale_endpoint != endpoint {
        log::info!("🔍 Upscaling endpoint: {}", upscaler.url());
    }

    Ok(ImageClient::new(generator, upscaler))
}
