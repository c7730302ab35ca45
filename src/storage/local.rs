use crate::{
    catalog::topic_slug,
    error::{Result, StudioError},
    storage::traits::ImageStorage,
};
use image::{ImageFormat, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Writes `<root>/<topic_slug>/<uuid>.png`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl Default for LocalImageStore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_OUTPUT_DIR)
    }
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn topic_dir(&self, topic: &str) -> PathBuf {
        self.root.join(topic_slug(topic))
    }
}

impl ImageStorage for LocalImageStore {
    fn save(&self, topic: &str, image: &RgbImage) -> Result<PathBuf> {
        let directory = self.topic_dir(topic);
        fs::create_dir_all(&directory).map_err(|e| {
            StudioError::Storage(format!("failed to create {}: {}", directory.display(), e))
        })?;

        let path = directory.join(format!("{}.png", Uuid::new_v4()));
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| StudioError::Storage(format!("failed to write {}: {}", path.display(), e)))?;

        log::info!("💾 Image saved to {}", path.display());
        Ok(path)
    }
}
