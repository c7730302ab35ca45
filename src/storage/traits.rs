use crate::error::Result;
use image::RgbImage;
use std::path::PathBuf;

/// Somewhere finished images are kept.
pub trait ImageStorage: Send + Sync {
    /// Persist `image` under `topic` and return where it went.
    fn save(&self, topic: &str, image: &RgbImage) -> Result<PathBuf>;
}
