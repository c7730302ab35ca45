use crate::{
    config::BedrockConfig,
    error::{Result, StudioError},
    llm::LanguageModel,
    models::{CompletionRequest, Role},
};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::{error::ProvideErrorMetadata, primitives::Blob, Client};
use serde_json::{json, Value};

const DEFAULT_MAX_TOKENS: i32 = 1024;

#[derive(Clone)]
pub struct BedrockTextClient {
    client: Client,
    model_id: String,
}

impl BedrockTextClient {
    pub async fn new(config: &BedrockConfig, model_id: impl Into<String>) -> Self {
        let aws_config = if let (Some(access_key), Some(secret_key)) =
            (&config.access_key, &config.secret_key)
        {
            aws_config::from_env()
                .credentials_provider(aws_sdk_bedrockruntime::config::Credentials::new(
                    access_key,
                    secret_key,
                    None,
                    None,
                    "fluxgen",
                ))
                .region(aws_sdk_bedrockruntime::config::Region::new(
                    config
                        .region
                        .clone()
                        .unwrap_or_else(|| "us-east-1".to_string()),
                ))
                .load()
                .await
        } else {
            aws_config::load_from_env().await
        };

        Self {
            client: Client::new(&aws_config),
            model_id: model_id.into(),
        }
    }

    pub fn build_request_payload(model_id: &str, request: &CompletionRequest) -> Result<Value> {
        let system = request.system_text();
        let user_text = request
            .conversation()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let max_tokens = request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        let temperature = request.temperature.unwrap_or(0.7);

        let payload = match model_id {
            id if id.starts_with("anthropic.claude") || id.starts_with("arn:aws:bedrock") => {
                let messages: Vec<Value> = request
                    .conversation()
                    .map(|m| {
                        json!({
                            "role": if m.role == Role::Assistant { "assistant" } else { "user" },
                            "content": m.content,
                        })
                    })
                    .collect();
                json!({
                    "anthropic_version": "bedrock-2023-05-31",
                    "system": system,
                    "messages": messages,
                    "max_tokens": max_tokens,
                    "temperature": temperature
                })
            }
            id if id.starts_with("meta.llama3") => json!({
                "prompt": format!(
                    "<|begin_of_text|><|start_header_id|>system<|end_header_id|>\n\n{}<|eot_id|>\
                     <|start_header_id|>user<|end_header_id|>\n\n{}<|eot_id|>\
                     <|start_header_id|>assistant<|end_header_id|>\n\n",
                    system, user_text
                ),
                "max_gen_len": max_tokens,
                "temperature": temperature,
                "top_p": 0.9
            }),
            id if id.starts_with("mistral.") => json!({
                "prompt": format!("<s>[INST] {}\n\n{} [/INST]", system, user_text),
                "max_tokens": max_tokens,
                "temperature": temperature,
                "top_p": 0.9
            }),
            id if id.starts_with("amazon.titan") => json!({
                "inputText": format!("{}\n\n{}", system, user_text),
                "textGenerationConfig": {
                    "maxTokenCount": max_tokens,
                    "temperature": temperature,
                    "topP": 0.9
                }
            }),
            _ => {
                return Err(StudioError::Config(format!(
                    "Unsupported Bedrock model ID: {}",
                    model_id
                )))
            }
        };

        Ok(payload)
    }

    pub fn parse_response(model_id: &str, body: &Value) -> Result<String> {
        let text = match model_id {
            id if id.starts_with("anthropic.claude") || id.starts_with("arn:aws:bedrock") => {
                body["content"][0]["text"].as_str()
            }
            id if id.starts_with("meta.llama3") => body["generation"].as_str(),
            id if id.starts_with("mistral.") => body["outputs"][0]["text"].as_str(),
            id if id.starts_with("amazon.titan") => body["results"][0]["outputText"].as_str(),
            _ => None,
        };

        text.map(str::to_string)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                StudioError::Llm(format!("no completion text in {} response", model_id))
            })
    }
}

#[async_trait]
impl LanguageModel for BedrockTextClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let payload = Self::build_request_payload(&self.model_id, request)?;
        let request_json = serde_json::to_string(&payload)?;

        log::info!("Invoking model: {}", self.model_id);
        log::debug!("Bedrock request payload: {}", request_json);

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json.into_bytes()))
            .send()
            .await
            .map_err(|e| {
                if let Some(service_error) = e.as_service_error() {
                    log::error!("Service error code: {:?}", service_error.code());
                    log::error!("Service error message: {:?}", service_error.message());
                    StudioError::Llm(format!(
                        "Bedrock service error: {} - {}",
                        service_error.code().unwrap_or("unknown"),
                        service_error.message().unwrap_or("no message")
                    ))
                } else {
                    StudioError::Transport(format!("AWS SDK error: {}", e))
                }
            })?;

        let body: Value = serde_json::from_slice(response.body.as_ref())
            .map_err(|e| StudioError::Llm(format!("unparsable Bedrock response: {}", e)))?;

        Self::parse_response(&self.model_id, &body)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
