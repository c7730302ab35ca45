#[cfg(feature = "bedrock")]
pub mod bedrock_client;
pub mod chat_client;

use crate::{
    config::{LlmConfig, LlmProvider},
    error::{Result, StudioError},
    models::CompletionRequest,
};
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(feature = "bedrock")]
pub use bedrock_client::BedrockTextClient;
pub use chat_client::ChatClient;

/// A chat-style text completion capability.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    fn model_id(&self) -> &str;
}

/// Build the client selected by `config.provider`.
pub async fn from_config(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>> {
    let model: Arc<dyn LanguageModel> = match config.provider {
        LlmProvider::Groq => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| StudioError::Config("GROQ_API_KEY is required".into()))?;
            Arc::new(ChatClient::new(
                config.base_url.clone(),
                api_key,
                config.model_id(),
            ))
        }
        LlmProvider::Bedrock => {
            #[cfg(feature = "bedrock")]
            {
                Arc::new(BedrockTextClient::new(&config.bedrock, config.model_id()).await)
            }
            #[cfg(not(feature = "bedrock"))]
            {
                return Err(StudioError::Config(
                    "Bedrock feature not enabled".into(),
                ));
            }
        }
    };

    log::info!("🧠 Language model: {}", model.model_id());
    Ok(model)
}
