use crate::{
    catalog::{Topic, GUIDE},
    composer::PromptComposer,
    config::Config,
    error::{Result, StudioError},
    inference::{self, ImageClient},
    llm,
    logger,
    models::{OutputMode, RenderStage, UpscaleFactor},
    retry::RetryPolicy,
    storage::{ImageStorage, LocalImageStore},
};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything one batch needs, resolved up front.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub topic: Topic,
    pub user_request: String,
    pub batch_size: u32,
    pub upscale_factor: UpscaleFactor,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub saved: Vec<PathBuf>,
    /// Images the generation endpoint answered without a payload for.
    pub skipped: u32,
    pub upscale_fallbacks: u32,
}

/// Composer, image pipeline and storage wired together.
pub struct Studio {
    composer: PromptComposer,
    images: ImageClient,
    store: Arc<dyn ImageStorage>,
    guide: String,
    retry: RetryPolicy,
}

impl Studio {
    pub fn new(composer: PromptComposer, images: ImageClient, store: Arc<dyn ImageStorage>) -> Self {
        Self {
            composer,
            images,
            store,
            guide: GUIDE.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Build from a validated configuration.
    pub async fn from_config(config: &Config, mode: OutputMode) -> Result<Self> {
        config.validate()?;
        let model = llm::from_config(&config.llm).await?;
        let composer = PromptComposer::new(model, mode).with_temperature(config.llm.temperature);
        let images = inference::from_config(&config.inference)?;
        let store = Arc::new(LocalImageStore::new(config.output_dir.clone()));
        Ok(Self::new(composer, images, store))
    }

    /// Policy for the prompt composition call. The image pipeline carries its own.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn compose_prompt(&self, topic: &Topic, user_request: &str) -> Result<String> {
        self.retry
            .run("prompt composition", || {
                self.composer
                    .compose(&self.guide, topic.name, topic.instructions, user_request)
            })
            .await
    }

    /// Compose, render and save one image. `Ok(None)` when the backend sent no image.
    pub async fn generate_one(&self, job: &BatchJob) -> Result<Option<(PathBuf, RenderStage)>> {
        let prompt = self.compose_prompt(&job.topic, &job.user_request).await?;
        log::info!("Generated image prompt:\n{}", prompt);

        let rendered = match self.images.render_image(&prompt, job.upscale_factor).await? {
            Some(rendered) => rendered,
            None => return Ok(None),
        };

        let store = Arc::clone(&self.store);
        let topic = job.topic.name;
        let image = rendered.image;
        let path = tokio::task::spawn_blocking(move || store.save(topic, &image))
            .await
            .map_err(|e| StudioError::Storage(format!("save task failed: {}", e)))??;
        Ok(Some((path, rendered.stage)))
    }

    /// Run the job serially. The first error aborts the rest of the batch.
    pub async fn run_batch(&self, job: &BatchJob) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for i in 1..=job.batch_size {
            log::info!("Processing image {}/{}...", i, job.batch_size);
            let _timer = logger::timer(&format!("image {}/{}", i, job.batch_size));

            match self.generate_one(job).await? {
                Some((path, stage)) => {
                    if stage == RenderStage::UpscaleFallback {
                        report.upscale_fallbacks += 1;
                    }
                    report.saved.push(path);
                }
                None => {
                    log::warn!("Image {}/{} skipped: no image in response", i, job.batch_size);
                    report.skipped += 1;
                }
            }
        }

        Ok(report)
    }
}
