pub mod catalog;
pub mod cli;
pub mod composer;
pub mod config;
pub mod error;
pub mod inference;
pub mod llm;
pub mod logger;
pub mod models;
pub mod retry;
pub mod shell;
pub mod storage;
pub mod studio;

#[cfg(test)]
mod test_support;

pub use catalog::{Topic, TopicCatalog, GUIDE, TOPICS};
pub use composer::PromptComposer;
pub use config::{BedrockConfig, Config, Credential, InferenceConfig, LlmConfig, LlmProvider};
pub use error::{Result, StudioError};
pub use inference::{HttpInferenceBackend, ImageClient, InferenceBackend, RenderedImage};
pub use llm::{ChatClient, LanguageModel};
pub use models::{OutputMode, RenderStage, UpscaleFactor};
pub use retry::RetryPolicy;
pub use storage::{ImageStorage, LocalImageStore};
pub use studio::{BatchJob, BatchReport, Studio};
