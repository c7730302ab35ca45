use crate::error::{Result, StudioError};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_BEDROCK_MODEL: &str = "meta.llama3-70b-instruct-v1:0";
pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_OUTPUT_DIR: &str = "images";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Any OpenAI-compatible chat completions API; Groq by default.
    #[default]
    Groq,
    Bedrock,
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" | "openai" | "chat" => Ok(LlmProvider::Groq),
            "bedrock" | "aws" => Ok(LlmProvider::Bedrock),
            other => Err(format!("unknown LLM provider: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl BedrockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let region = env::var("AWS_REGION")
            .or_else(|_| env::var("AWS_DEFAULT_REGION"))
            .ok();
        let access_key = env::var("AWS_ACCESS_KEY_ID").ok();
        let secret_key = env::var("AWS_SECRET_ACCESS_KEY").ok();

        BedrockConfig {
            region,
            access_key,
            secret_key,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: Option<String>,
    pub temperature: f32,
    pub bedrock: BedrockConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            provider: LlmProvider::Groq,
            api_key: None,
            base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            bedrock: BedrockConfig::default(),
        }
    }
}

impl LlmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let provider = env::var("LLM_PROVIDER")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_default();
        let api_key = env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty());
        let base_url =
            env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_GROQ_BASE_URL.to_string());
        let model = env::var("LLM_MODEL").ok().filter(|m| !m.is_empty());
        let temperature = env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(DEFAULT_TEMPERATURE);

        LlmConfig {
            provider,
            api_key,
            base_url,
            model,
            temperature,
            bedrock: BedrockConfig::from_env(),
        }
    }

    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_bedrock(mut self, bedrock: BedrockConfig) -> Self {
        self.bedrock = bedrock;
        self
    }

    /// Configured model, or the provider's default.
    pub fn model_id(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(model), _) => model,
            (None, LlmProvider::Groq) => DEFAULT_GROQ_MODEL,
            (None, LlmProvider::Bedrock) => DEFAULT_BEDROCK_MODEL,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InferenceConfig {
    pub endpoint: Option<String>,
    pub upscale_endpoint: Option<String>,
    pub token: Option<String>,
    pub timeout: Option<Duration>,
}

impl InferenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let endpoint = env::var("INFERENCE_ENDPOINT").ok().filter(|e| !e.is_empty());
        let upscale_endpoint = env::var("UPSCALE_ENDPOINT").ok().filter(|e| !e.is_empty());
        let token = env::var("HF_TOKEN").ok().filter(|t| !t.is_empty());
        let timeout = env::var("INFERENCE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs);

        InferenceConfig {
            endpoint,
            upscale_endpoint,
            token,
            timeout,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_upscale_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.upscale_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The upscaler shares the generation endpoint unless told otherwise.
    pub fn upscale_endpoint(&self) -> Option<&str> {
        self.upscale_endpoint
            .as_deref()
            .or(self.endpoint.as_deref())
    }
}

/// A credential the pipeline cannot start without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    GroqApiKey,
    InferenceToken,
    InferenceEndpoint,
}

impl Credential {
    pub fn env_var(&self) -> &'static str {
        match self {
            Credential::GroqApiKey => "GROQ_API_KEY",
            Credential::InferenceToken => "HF_TOKEN",
            Credential::InferenceEndpoint => "INFERENCE_ENDPOINT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Credential::GroqApiKey => "Groq API key",
            Credential::InferenceToken => "HuggingFace access token",
            Credential::InferenceEndpoint => "Inference endpoint URL",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub inference: InferenceConfig,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            llm: LlmConfig::default(),
            inference: InferenceConfig::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let output_dir = env::var("IMAGE_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR));

        Config {
            llm: LlmConfig::from_env(),
            inference: InferenceConfig::from_env(),
            output_dir,
        }
    }

    pub fn with_llm(mut self, llm: LlmConfig) -> Self {
        self.llm = llm;
        self
    }

    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn missing_credentials(&self) -> Vec<Credential> {
        let mut missing = Vec::new();
        if self.llm.provider == LlmProvider::Groq && self.llm.api_key.is_none() {
            missing.push(Credential::GroqApiKey);
        }
        if self.inference.token.is_none() {
            missing.push(Credential::InferenceToken);
        }
        if self.inference.endpoint.is_none() {
            missing.push(Credential::InferenceEndpoint);
        }
        missing
    }

    /// Fill in a credential collected from the operator. Blank values are ignored.
    pub fn set_credential(&mut self, credential: Credential, value: impl Into<String>) {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return;
        }
        match credential {
            Credential::GroqApiKey => self.llm.api_key = Some(value),
            Credential::InferenceToken => self.inference.token = Some(value),
            Credential::InferenceEndpoint => self.inference.endpoint = Some(value),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_credentials();
        if missing.is_empty() {
            return Ok(());
        }
        let names: Vec<&str> = missing.iter().map(|c| c.env_var()).collect();
        Err(StudioError::Config(format!(
            "missing required settings: {}",
            names.join(", ")
        )))
    }
}
