use crate::{
    error::{Result, StudioError},
    inference::{
        codec,
        transport::{BackendResponse, ImagePayload, InferenceBackend},
    },
    models::{GenerationRequest, RenderStage, UpscaleFactor, UpscaleRequest},
    retry::RetryPolicy,
};
use image::RgbImage;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    pub image: RgbImage,
    pub stage: RenderStage,
}

/// Generation followed by best-effort upscaling.
///
/// Generation failures propagate (and are retried by `render_image`). An
/// upscaler that errors or answers without an image never fails the render;
/// the generated image is returned instead.
#[derive(Clone)]
pub struct ImageClient {
    generator: Arc<dyn InferenceBackend>,
    upscaler: Arc<dyn InferenceBackend>,
    retry: RetryPolicy,
}

impl ImageClient {
    pub fn new(generator: Arc<dyn InferenceBackend>, upscaler: Arc<dyn InferenceBackend>) -> Self {
        Self {
            generator,
            upscaler,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Render with the retry policy applied. `Ok(None)` means the generation
    /// endpoint answered without an image.
    pub async fn render_image(
        &self,
        prompt: &str,
        factor: UpscaleFactor,
    ) -> Result<Option<RenderedImage>> {
        self.retry
            .run("image generation", || self.render_attempt(prompt, factor))
            .await
    }

    /// A single pass through generate → (upscale), without retries.
    pub async fn render_attempt(
        &self,
        prompt: &str,
        factor: UpscaleFactor,
    ) -> Result<Option<RenderedImage>> {
        log::info!("Generating low-resolution image...");
        let request = serde_json::to_value(GenerationRequest::new(prompt))?;
        let response = self.generator.invoke(&request).await?;

        let generated = match decode_payload(&response)? {
            Some(image) => image,
            None => {
                log::error!("No image found in the response.");
                return Ok(None);
            }
        };
        log::debug!(
            "Generated image is {}x{}",
            generated.width(),
            generated.height()
        );

        if !factor.is_enabled() {
            return Ok(Some(RenderedImage {
                image: generated,
                stage: RenderStage::Generated,
            }));
        }

        log::info!("Upscaling image ({})...", factor);
        match self.upscale(&generated, factor).await {
            Ok(Some(upscaled)) => Ok(Some(RenderedImage {
                image: upscaled,
                stage: RenderStage::Upscaled,
            })),
            Ok(None) => {
                log::error!("No image found in the upscaling response; keeping the generated image.");
                Ok(Some(RenderedImage {
                    image: generated,
                    stage: RenderStage::UpscaleFallback,
                }))
            }
            Err(err @ StudioError::Decode(_)) => Err(err),
            Err(err) => {
                log::warn!("Upscaling failed, keeping the generated image: {}", err);
                Ok(Some(RenderedImage {
                    image: generated,
                    stage: RenderStage::UpscaleFallback,
                }))
            }
        }
    }

    async fn upscale(&self, image: &RgbImage, factor: UpscaleFactor) -> Result<Option<RgbImage>> {
        let control_image = codec::encode_png_base64(image)?;
        let request = serde_json::to_value(UpscaleRequest::new(control_image, factor))?;
        let response = self.upscaler.invoke(&request).await?;
        decode_payload(&response)
    }
}

/// `Ok(None)` when the response carries no image; `Decode` when it carries a broken one.
fn decode_payload(response: &BackendResponse) -> Result<Option<RgbImage>> {
    match response.image_payload() {
        Some(ImagePayload::Base64(encoded)) => codec::decode_base64_image(encoded).map(Some),
        Some(ImagePayload::Raw(bytes)) => codec::decode_image(bytes).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::Rgb;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Replays scripted responses and records every body it receives.
    struct FakeBackend {
        replies: Mutex<VecDeque<Result<BackendResponse>>>,
        calls: Mutex<Vec<(Instant, Value)>>,
    }

    impl FakeBackend {
        fn new(replies: Vec<Result<BackendResponse>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
        }

        fn body(&self, index: usize) -> Value {
            self.calls.lock().unwrap()[index].1.clone()
        }
    }

    #[async_trait]
    impl InferenceBackend for FakeBackend {
        async fn invoke(&self, body: &Value) -> Result<BackendResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((Instant::now(), body.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(StudioError::Transport("no scripted reply".into())))
        }
    }

    fn image(width: u32, height: u32, shade: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([shade, 255 - shade, 7]))
    }

    fn json_reply(image: &RgbImage) -> Result<BackendResponse> {
        Ok(BackendResponse::Json(
            json!({ "image": codec::encode_png_base64(image).unwrap() }),
        ))
    }

    fn server_error() -> Result<BackendResponse> {
        Err(StudioError::RemoteGeneration {
            status: 503,
            body: "Service Unavailable".into(),
        })
    }

    fn client(generator: &Arc<FakeBackend>, upscaler: &Arc<FakeBackend>) -> ImageClient {
        ImageClient::new(generator.clone(), upscaler.clone())
    }

    #[tokio::test]
    async fn test_no_upscale_returns_generated_image() {
        let generated = image(8, 6, 10);
        let generator = FakeBackend::new(vec![json_reply(&generated)]);
        let upscaler = FakeBackend::new(vec![]);

        let rendered = client(&generator, &upscaler)
            .render_image("a koi pond", UpscaleFactor::None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(rendered.image, generated);
        assert_eq!(rendered.stage, RenderStage::Generated);
        assert_eq!(upscaler.call_count(), 0);
        assert_eq!(generator.body(0)["inputs"], "a koi pond");
        assert_eq!(generator.body(0)["width"], 768);
    }

    #[tokio::test]
    async fn test_upscaled_image_replaces_generated() {
        let generated = image(4, 4, 10);
        let upscaled = image(16, 16, 200);
        let generator = FakeBackend::new(vec![json_reply(&generated)]);
        let upscaler = FakeBackend::new(vec![json_reply(&upscaled)]);

        let rendered = client(&generator, &upscaler)
            .render_image("a koi pond", UpscaleFactor::X4)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(rendered.image, upscaled);
        assert_eq!(rendered.stage, RenderStage::Upscaled);

        let body = upscaler.body(0);
        assert_eq!(body["upscale_factor"], 4);
        assert_eq!(body["inputs"], "");
        let control = codec::decode_base64_image(body["control_image"].as_str().unwrap()).unwrap();
        assert_eq!(control, generated);
    }

    #[tokio::test]
    async fn test_upscaler_failure_falls_back() {
        let generated = image(4, 4, 10);
        let generator = FakeBackend::new(vec![json_reply(&generated)]);
        let upscaler = FakeBackend::new(vec![server_error()]);

        let rendered = client(&generator, &upscaler)
            .render_image("p", UpscaleFactor::X2)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(rendered.image, generated);
        assert_eq!(rendered.stage, RenderStage::UpscaleFallback);
        assert_eq!(generator.call_count(), 1);
        assert_eq!(upscaler.call_count(), 1);
    }

    #[tokio::test]
    async fn test_upscaler_empty_payload_falls_back() {
        let generated = image(4, 4, 10);
        let generator = FakeBackend::new(vec![json_reply(&generated)]);
        let upscaler = FakeBackend::new(vec![Ok(BackendResponse::Json(json!({"image": ""})))]);

        let rendered = client(&generator, &upscaler)
            .render_image("p", UpscaleFactor::X8)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(rendered.image, generated);
        assert_eq!(rendered.stage, RenderStage::UpscaleFallback);
    }

    #[tokio::test]
    async fn test_raw_binary_generation_payload() {
        let generated = image(3, 5, 90);
        let png = codec::encode_png(&generated).unwrap();
        let generator = FakeBackend::new(vec![Ok(BackendResponse::Binary(png))]);
        let upscaler = FakeBackend::new(vec![]);

        let rendered = client(&generator, &upscaler)
            .render_image("p", UpscaleFactor::None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rendered.image, generated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_then_success() {
        let generated = image(4, 4, 10);
        let generator =
            FakeBackend::new(vec![server_error(), server_error(), json_reply(&generated)]);
        let upscaler = FakeBackend::new(vec![]);

        let rendered = client(&generator, &upscaler)
            .render_image("p", UpscaleFactor::None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(rendered.image, generated);
        assert_eq!(generator.call_count(), 3);

        let times = generator.call_times();
        let first_gap = times[1] - times[0];
        let second_gap = times[2] - times[1];
        assert!(first_gap >= Duration::from_secs(1) && first_gap < Duration::from_secs(2));
        assert!(second_gap >= Duration::from_secs(2) && second_gap < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_failure_propagates_after_three_calls() {
        let generator = FakeBackend::new(vec![server_error(), server_error(), server_error()]);
        let upscaler = FakeBackend::new(vec![]);

        let err = client(&generator, &upscaler)
            .render_image("p", UpscaleFactor::X2)
            .await
            .unwrap_err();

        assert!(matches!(err, StudioError::RemoteGeneration { status: 503, .. }));
        assert_eq!(generator.call_count(), 3);
        assert_eq!(upscaler.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_generation_payload_is_none_without_retry() {
        let generator = FakeBackend::new(vec![Ok(BackendResponse::Json(json!({"status": "ok"})))]);
        let upscaler = FakeBackend::new(vec![]);

        let rendered = client(&generator, &upscaler)
            .render_image("p", UpscaleFactor::X2)
            .await
            .unwrap();

        assert!(rendered.is_none());
        assert_eq!(generator.call_count(), 1);
        assert_eq!(upscaler.call_count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_generation_payload_is_decode_error_without_retry() {
        let generator = FakeBackend::new(vec![Ok(BackendResponse::Json(
            json!({"image": "bm90IGFuIGltYWdl"}),
        ))]);
        let upscaler = FakeBackend::new(vec![]);

        let err = client(&generator, &upscaler)
            .render_image("p", UpscaleFactor::None)
            .await
            .unwrap_err();

        assert!(matches!(err, StudioError::Decode(_)));
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_upscale_payload_is_decode_error() {
        let generated = image(4, 4, 10);
        let generator = FakeBackend::new(vec![json_reply(&generated)]);
        let upscaler = FakeBackend::new(vec![Ok(BackendResponse::Binary(b"<html>oops</html>".to_vec()))]);

        let err = client(&generator, &upscaler)
            .render_image("p", UpscaleFactor::X2)
            .await
            .unwrap_err();

        assert!(matches!(err, StudioError::Decode(_)));
        assert_eq!(generator.call_count(), 1);
        assert_eq!(upscaler.call_count(), 1);
    }
}
