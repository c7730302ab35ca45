use crate::{
    catalog::{Topic, TopicCatalog},
    config::{Config, LlmProvider},
    logger::{LogLevel, LoggerConfig},
    models::{OutputMode, UpscaleFactor},
    shell,
};
use clap::Parser;
use std::path::PathBuf;

/// Expand a theme into an image prompt, render it, optionally upscale it,
/// and save the result as PNG.
///
/// Any question not answered by a flag is asked interactively.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "fluxgen", version)]
#[command(about = "Theme-driven image generation with optional upscaling")]
pub struct CliOptions {
    /// Topic name (case-insensitive) or 1-based menu number
    #[arg(long)]
    pub topic: Option<String>,

    /// Extra details to fold into the prompt
    #[arg(long)]
    pub request: Option<String>,

    /// Number of images to generate
    #[arg(long, value_parser = parse_batch_size_arg)]
    pub batch_size: Option<u32>,

    /// Upscale factor: 1 (none), 2, 4 or 8
    #[arg(long, value_parser = parse_upscale_arg)]
    pub upscale: Option<UpscaleFactor>,

    /// Prompt composition mode: freeform or structured
    #[arg(long, default_value = "freeform", env = "PROMPT_MODE")]
    pub mode: OutputMode,

    /// Language model provider: groq or bedrock
    #[arg(long)]
    pub provider: Option<LlmProvider>,

    /// Root directory for saved images
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    pub debug: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,

    /// Also append log lines to this file
    #[arg(long)]
    pub log_file: Option<String>,
}

fn parse_batch_size_arg(s: &str) -> Result<u32, String> {
    shell::parse_batch_size(s).ok_or_else(|| format!("invalid batch size: {}", s))
}

fn parse_upscale_arg(s: &str) -> Result<UpscaleFactor, String> {
    shell::parse_upscale_factor(s).ok_or_else(|| format!("unsupported upscale factor: {}", s))
}

impl CliOptions {
    pub fn logger_config(&self) -> LoggerConfig {
        let base = if self.debug {
            LoggerConfig::development()
        } else {
            LoggerConfig::default()
        };
        let level = if self.debug { LogLevel::Debug } else { LogLevel::Info };
        let config = base
            .with_level(level)
            .with_colors(!self.no_color)
            .with_json_output(self.json_logs);
        match &self.log_file {
            Some(path) => config.with_file_output(path),
            None => config,
        }
    }

    /// Flags win over environment values.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(provider) = self.provider {
            config.llm = config.llm.with_provider(provider);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir.clone());
        }
        config
    }

    /// `None` when no topic flag was given. An unknown selector is an error.
    pub fn resolve_topic(&self, catalog: &TopicCatalog) -> Result<Option<Topic>, String> {
        match &self.topic {
            None => Ok(None),
            Some(selector) => catalog
                .resolve(selector)
                .map(Some)
                .ok_or_else(|| format!("unknown topic: {}", selector)),
        }
    }
}
