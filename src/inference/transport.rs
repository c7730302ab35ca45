use crate::error::{Result, StudioError};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::Value;
use std::time::Duration;

/// What an inference endpoint sent back on success.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendResponse {
    Json(Value),
    Binary(Vec<u8>),
}

impl BackendResponse {
    /// The image payload, if the response carries one.
    pub fn image_payload(&self) -> Option<ImagePayload<'_>> {
        match self {
            BackendResponse::Json(body) => body
                .get("image")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(ImagePayload::Base64),
            BackendResponse::Binary(bytes) if !bytes.is_empty() => {
                Some(ImagePayload::Raw(bytes.as_slice()))
            }
            BackendResponse::Binary(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImagePayload<'a> {
    Base64(&'a str),
    Raw(&'a [u8]),
}

#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// POST one JSON body. Non-2xx responses are errors.
    async fn invoke(&self, body: &Value) -> Result<BackendResponse>;
}

/// Bearer-authenticated JSON POST to a hosted inference endpoint.
#[derive(Clone)]
pub struct HttpInferenceBackend {
    client: Client,
    url: String,
    token: String,
}

impl HttpInferenceBackend {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            token: token.into(),
        }
    }

    pub fn with_timeout(url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StudioError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
            token: token.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl InferenceBackend for HttpInferenceBackend {
    async fn invoke(&self, body: &Value) -> Result<BackendResponse> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                log::error!("An error occurred: {}", e);
                StudioError::Transport(e.to_string())
            })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StudioError::Transport(format!("failed reading response body: {}", e)))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes).to_string();
            log::error!("HTTP error occurred: {} - {}", status, text);
            return Err(StudioError::RemoteGeneration {
                status: status.as_u16(),
                body: text,
            });
        }

        classify_body(content_type.as_deref(), bytes.to_vec())
    }
}

/// `image/*` and `application/octet-stream` are raw image bytes. Anything else,
/// including a missing Content-Type, is read as JSON when the body looks like
/// a JSON object.
pub fn classify_body(content_type: Option<&str>, body: Vec<u8>) -> Result<BackendResponse> {
    let mime = content_type
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if mime.starts_with("image/") || mime == "application/octet-stream" {
        return Ok(BackendResponse::Binary(body));
    }

    let looks_like_json = body
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .map(|b| *b == b'{')
        .unwrap_or(false);
    if mime == "application/json" || mime.ends_with("+json") || looks_like_json {
        let value: Value = serde_json::from_slice(&body)?;
        Ok(BackendResponse::Json(value))
    } else {
        Ok(BackendResponse::Binary(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_payload_requires_non_empty_image() {
        let ok = BackendResponse::Json(json!({"image": "iVBORw0KGgo="}));
        assert_eq!(ok.image_payload(), Some(ImagePayload::Base64("iVBORw0KGgo=")));

        assert_eq!(BackendResponse::Json(json!({"image": ""})).image_payload(), None);
        assert_eq!(BackendResponse::Json(json!({"error": "cold start"})).image_payload(), None);
        assert_eq!(BackendResponse::Json(json!({"image": 42})).image_payload(), None);
    }

    #[test]
    fn test_binary_payload() {
        let raw = BackendResponse::Binary(vec![0x89, b'P', b'N', b'G']);
        assert!(matches!(raw.image_payload(), Some(ImagePayload::Raw(b)) if b.len() == 4));
        assert_eq!(BackendResponse::Binary(Vec::new()).image_payload(), None);
    }

    #[test]
    fn test_classify_body_by_content_type() {
        let png = vec![0x89, b'P', b'N', b'G'];
        assert_eq!(
            classify_body(Some("image/png"), png.clone()).unwrap(),
            BackendResponse::Binary(png.clone())
        );
        assert_eq!(
            classify_body(Some("application/octet-stream"), png.clone()).unwrap(),
            BackendResponse::Binary(png.clone())
        );
        assert_eq!(
            classify_body(None, png.clone()).unwrap(),
            BackendResponse::Binary(png)
        );

        let body = br#"{"image": "abc"}"#.to_vec();
        for content_type in [
            Some("application/json; charset=utf-8"),
            Some("text/plain"),
            None,
        ] {
            assert_eq!(
                classify_body(content_type, body.clone()).unwrap(),
                BackendResponse::Json(json!({"image": "abc"}))
            );
        }

        assert!(matches!(
            classify_body(Some("application/json"), b"{not json".to_vec()),
            Err(StudioError::Serialization(_))
        ));
    }

    mod http {
        use super::*;
        use crate::inference::{codec, ImageClient};
        use crate::models::{RenderStage, UpscaleFactor};
        use crate::retry::RetryPolicy;
        use crate::test_support::serve_once;
        use image::{Rgb, RgbImage};
        use std::sync::Arc;

        fn png_json() -> (RgbImage, String) {
            let image = RgbImage::from_pixel(3, 2, Rgb([9, 99, 199]));
            let body = json!({ "image": codec::encode_png_base64(&image).unwrap() }).to_string();
            (image, body)
        }

        fn client(url: &str) -> ImageClient {
            let backend = Arc::new(HttpInferenceBackend::new(url, "tok123"));
            ImageClient::new(backend.clone(), backend).with_retry(RetryPolicy::none())
        }

        #[tokio::test]
        async fn test_sends_bearer_token_and_json_body() {
            let (_, body) = png_json();
            let (url, server) = serve_once(200, Some("application/json"), body).await;

            let backend = HttpInferenceBackend::new(url, "tok123");
            let response = backend.invoke(&json!({"inputs": "a red fox"})).await.unwrap();
            assert!(response.image_payload().is_some());

            let request = server.await.unwrap();
            assert!(request.starts_with("POST / HTTP/1.1"));
            assert!(request
                .to_ascii_lowercase()
                .contains("authorization: bearer tok123"));
            assert!(request.contains(r#""inputs":"a red fox""#));
        }

        #[tokio::test]
        async fn test_non_success_status_is_retryable_remote_error() {
            let (url, server) = serve_once(503, Some("text/plain"), "busy").await;

            let err = HttpInferenceBackend::new(url, "tok123")
                .invoke(&json!({}))
                .await
                .unwrap_err();
            server.await.unwrap();

            assert!(err.is_retryable());
            match err {
                StudioError::RemoteGeneration { status, body } => {
                    assert_eq!(status, 503);
                    assert_eq!(body, "busy");
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_raw_png_body_is_binary() {
            let image = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
            let png = codec::encode_png(&image).unwrap();
            let (url, server) = serve_once(200, Some("image/png"), png.clone()).await;

            let response = HttpInferenceBackend::new(url, "t")
                .invoke(&json!({}))
                .await
                .unwrap();
            server.await.unwrap();
            assert_eq!(response, BackendResponse::Binary(png));
        }

        #[tokio::test]
        async fn test_json_sent_as_plain_text_still_renders() {
            let (image, body) = png_json();
            let (url, server) = serve_once(200, Some("text/plain"), body).await;

            let rendered = client(&url)
                .render_image("a red fox", UpscaleFactor::None)
                .await
                .unwrap()
                .unwrap();
            server.await.unwrap();

            assert_eq!(rendered.stage, RenderStage::Generated);
            assert_eq!(rendered.image, image);
        }

        #[tokio::test]
        async fn test_json_without_image_and_content_type_is_empty() {
            let (url, server) = serve_once(200, None, r#"{"error":"no image"}"#).await;

            let rendered = client(&url)
                .render_image("a red fox", UpscaleFactor::None)
                .await
                .unwrap();
            server.await.unwrap();
            assert!(rendered.is_none());
        }
    }
}
