use serde::{Deserialize, Serialize};
use std::fmt;

pub const GENERATION_STEPS: u32 = 50;
pub const GENERATION_GUIDANCE_SCALE: f64 = 3.5;
pub const GENERATION_HEIGHT: u32 = 1024;
pub const GENERATION_WIDTH: u32 = 768;

pub const UPSCALE_STEPS: u32 = 28;
pub const UPSCALE_GUIDANCE_SCALE: f64 = 3.5;
pub const UPSCALE_CONDITIONING_SCALE: f64 = 0.6;

/// Body posted to the generation endpoint.
///
/// The parameters are fixed; the backend is provisioned for exactly this
/// resolution and step count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub inputs: String,
    pub num_inference_steps: u32,
    pub guidance_scale: f64,
    pub height: u32,
    pub width: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            inputs: prompt.into(),
            num_inference_steps: GENERATION_STEPS,
            guidance_scale: GENERATION_GUIDANCE_SCALE,
            height: GENERATION_HEIGHT,
            width: GENERATION_WIDTH,
        }
    }
}

/// Body posted to the upscaling endpoint. Output size follows the control image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpscaleRequest {
    pub inputs: String,
    /// Base64 PNG of the generated image.
    pub control_image: String,
    pub upscale_factor: u32,
    pub num_inference_steps: u32,
    pub guidance_scale: f64,
    pub controlnet_conditioning_scale: f64,
}

impl UpscaleRequest {
    pub fn new(control_image: String, factor: UpscaleFactor) -> Self {
        Self {
            inputs: String::new(),
            control_image,
            upscale_factor: factor.multiplier(),
            num_inference_steps: UPSCALE_STEPS,
            guidance_scale: UPSCALE_GUIDANCE_SCALE,
            controlnet_conditioning_scale: UPSCALE_CONDITIONING_SCALE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UpscaleFactor {
    #[default]
    None,
    X2,
    X4,
    X8,
}

impl UpscaleFactor {
    /// Wire value; 0 means no upscaling.
    pub fn multiplier(&self) -> u32 {
        match self {
            UpscaleFactor::None => 0,
            UpscaleFactor::X2 => 2,
            UpscaleFactor::X4 => 4,
            UpscaleFactor::X8 => 8,
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self != UpscaleFactor::None
    }
}

impl TryFrom<u32> for UpscaleFactor {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 | 1 => Ok(UpscaleFactor::None),
            2 => Ok(UpscaleFactor::X2),
            4 => Ok(UpscaleFactor::X4),
            8 => Ok(UpscaleFactor::X8),
            other => Err(format!(
                "unsupported upscale factor {}; choose 2, 4 or 8",
                other
            )),
        }
    }
}

impl std::str::FromStr for UpscaleFactor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(UpscaleFactor::None);
        }
        let value: u32 = trimmed
            .parse()
            .map_err(|_| format!("invalid upscale factor: {}", trimmed))?;
        UpscaleFactor::try_from(value)
    }
}

impl fmt::Display for UpscaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpscaleFactor::None => write!(f, "none"),
            other => write!(f, "{}x", other.multiplier()),
        }
    }
}
