//! Turns a theme, its instructions and the style guide into a final image prompt.

use crate::{
    error::{Result, StudioError},
    llm::LanguageModel,
    models::{ChatMessage, CompletionRequest, ImagePrompt, OutputMode},
};
use std::sync::Arc;

const SYSTEM_PREAMBLE: &str = "You are an image prompt generator specialized in FLUX models. \
Your task is to create detailed and effective image prompts based on the user's topic, \
instructions, and specific requests. No function tool calling is available.";

const FREEFORM_RULE: &str = "Output ONLY the final prompt and nothing else!";

#[derive(Clone)]
pub struct PromptComposer {
    model: Arc<dyn LanguageModel>,
    mode: OutputMode,
    temperature: Option<f32>,
}

impl PromptComposer {
    pub fn new(model: Arc<dyn LanguageModel>, mode: OutputMode) -> Self {
        Self {
            model,
            mode,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Build the two-message request for one prompt.
    pub fn build_request(
        &self,
        guide: &str,
        topic: &str,
        instructions: &str,
        user_request: &str,
    ) -> CompletionRequest {
        let system = match self.mode {
            OutputMode::Freeform => format!("{} {}\n\n{}", SYSTEM_PREAMBLE, FREEFORM_RULE, guide),
            OutputMode::Structured => format!(
                "{} Output the final prompt in JSON format matching the following schema:\n\n{}\n\n\
                 Ensure that your output is ONLY the JSON object without any additional \
                 explanations or text!\n\n{}",
                SYSTEM_PREAMBLE,
                ImagePrompt::json_schema(),
                guide
            ),
        };

        let mut user = format!(
            "Please create a detailed image prompt for the following topic:\n\n{}\n\n{}\n\n\
             Additional user request (if any):\n\n{}",
            topic,
            instructions,
            user_request.trim()
        );
        if self.mode == OutputMode::Freeform {
            user.push_str("\n\nOutput ONLY the final prompt following the example and nothing else!");
        }

        let mut request = CompletionRequest::new(vec![
            ChatMessage::system(system),
            ChatMessage::user(user),
        ])
        .with_json_output(self.mode == OutputMode::Structured);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        request
    }

    /// Ask the model for a final prompt. Performs no retries of its own.
    pub async fn compose(
        &self,
        guide: &str,
        topic: &str,
        instructions: &str,
        user_request: &str,
    ) -> Result<String> {
        log::info!("Requesting image prompt for topic: '{}'...", topic);
        let request = self.build_request(guide, topic, instructions, user_request);
        let raw = self.model.complete(&request).await?;

        match self.mode {
            OutputMode::Freeform => {
                let prompt = raw.trim().to_string();
                if prompt.is_empty() {
                    return Err(StudioError::Llm("model returned an empty prompt".into()));
                }
                Ok(prompt)
            }
            OutputMode::Structured => parse_structured(&raw),
        }
    }
}

/// Extract `final_prompt` from a structured answer.
///
/// Models occasionally wrap the object in a code fence or a sentence; the
/// outermost `{...}` is taken as the payload.
pub fn parse_structured(raw: &str) -> Result<String> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => {
            return Err(StudioError::Schema(format!(
                "no JSON object in model output: {}",
                raw.trim()
            )))
        }
    };

    let parsed: ImagePrompt = serde_json::from_str(json)
        .map_err(|e| StudioError::Schema(format!("output does not match ImagePrompt: {}", e)))?;

    let prompt = parsed.final_prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(StudioError::Schema("final_prompt is empty".into()));
    }
    Ok(prompt)
}
