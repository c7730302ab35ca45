use crate::{
    error::{Result, StudioError},
    llm::LanguageModel,
    models::{ChatCompletionResponse, CompletionRequest},
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Client for OpenAI-compatible `/chat/completions` APIs (Groq, OpenAI, vLLM, ...).
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn build_payload(&self, request: &CompletionRequest) -> Value {
        let mut payload = json!({
            "model": self.model,
            "messages": request.messages,
        });
        if let Some(obj) = payload.as_object_mut() {
            if let Some(temperature) = request.temperature {
                obj.insert("temperature".to_string(), json!(temperature));
            }
            if let Some(max_tokens) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(max_tokens));
            }
            if request.json_output {
                obj.insert(
                    "response_format".to_string(),
                    json!({ "type": "json_object" }),
                );
            }
        }
        payload
    }

    pub fn extract_content(response: ChatCompletionResponse) -> Result<String> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| StudioError::Llm("completion returned no choices".into()))?;

        if let Some(reason) = &choice.finish_reason {
            log::debug!("Completion finish reason: {}", reason);
        }

        choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| StudioError::Llm("completion message has no content".into()))
    }
}

#[async_trait]
impl LanguageModel for ChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let payload = self.build_payload(request);

        log::info!("Invoking model: {}", self.model);
        log::debug!("Chat completion request payload: {}", payload);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StudioError::Transport(format!("chat completion request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StudioError::Transport(format!("failed reading completion body: {}", e)))?;

        if !status.is_success() {
            log::error!("Chat completion error {}: {}", status, body);
            return Err(StudioError::Llm(format!(
                "provider returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| StudioError::Llm(format!("unparsable completion response: {}", e)))?;

        Self::extract_content(parsed)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
