use serde::{Deserialize, Serialize};

/// How the prompt composer asks the language model to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Raw text, trimmed and used verbatim.
    #[default]
    Freeform,
    /// A JSON object matching the `ImagePrompt` schema.
    Structured,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Freeform => "freeform",
            OutputMode::Structured => "structured",
        }
    }
}

impl std::str::FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "freeform" | "text" | "plain" => Ok(OutputMode::Freeform),
            "structured" | "json" | "schema" => Ok(OutputMode::Structured),
            other => Err(format!("unknown output mode: {}", other)),
        }
    }
}

/// Terminal state of one pass through the image pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStage {
    /// Generation succeeded and no upscale was requested.
    Generated,
    /// The upscaler returned a replacement image.
    Upscaled,
    /// Upscaling was requested but failed; the generated image stands.
    UpscaleFallback,
}
