use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Utc};

use crate::{
    error::FrameResult,
    model::{Approach, ConvertOptions},
    source::SourceImage,
};

pub const MANIFEST_FILE_NAME: &str = "run.json";

/// Per-run descriptor persisted next to the generated artifacts.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunManifest {
    pub base_name: String,
    pub image_width: u32,
    pub image_height: u32,
    pub image_bytes: u64,
    /// Active approaches in catalog order.
    pub approaches: Vec<Approach>,
    pub char_width: u32,
    pub png_width: Option<u32>,
    pub raster: bool,
    pub cache_capacity: usize,
    pub created_at: DateTime<Utc>,
}

impl RunManifest {
    pub fn new(
        source: &SourceImage,
        approaches: &[Approach],
        options: &ConvertOptions,
        cache_capacity: usize,
    ) -> Self {
        Self {
            base_name: source.base_name.clone(),
            image_width: source.width,
            image_height: source.height,
            image_bytes: source.byte_len,
            approaches: approaches.to_vec(),
            char_width: options.char_width.get(),
            png_width: options.png_width,
            raster: options.raster,
            cache_capacity,
            created_at: Utc::now(),
        }
    }

    pub fn write(&self, dir: &Path) -> FrameResult<PathBuf> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let file = std::fs::File::create(&path)
            .with_context(|| format!("failed to create manifest '{}'", path.display()))?;
        serde_json::to_writer_pretty(file, self)
            .with_context(|| format!("failed to write manifest '{}'", path.display()))?;
        Ok(path)
    }

    pub fn read(path: &Path) -> FrameResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest '{}'", path.display()))?;
        let manifest =
            serde_json::from_str(&text).with_context(|| "failed to parse run manifest")?;
        Ok(manifest)
    }
}
