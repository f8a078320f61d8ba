use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    error::{FrameError, FrameResult},
    workdir::WorkDir,
};

/// Raster formats accepted for local uploads.
pub const ALLOWED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "webp", "gif", "tiff"];

/// Name of the normalized source image inside a run directory.
pub const EXPORT_FILE_NAME: &str = "export.png";

/// Where the input image comes from: a local file or an HTTP(S) URL.
#[derive(Clone, Debug)]
pub enum ImageSource {
    Upload { name: String, bytes: Vec<u8> },
    Url(String),
}

/// Input image normalized to a PNG inside the run directory, immutable for
/// the rest of the run.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Size of the original (pre-normalization) bytes.
    pub byte_len: u64,
    pub base_name: String,
}

impl ImageSource {
    /// Wrap a local file, rejecting extensions outside the allowed set.
    pub fn from_path(path: &Path) -> FrameResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(FrameError::validation(format!(
                "unsupported image type '{ext}' (allowed: {})",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read image '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::Upload { name, bytes })
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// Fetch (if needed), decode, and save the normalized `export.png` into
    /// the run directory.
    pub fn resolve(&self, workdir: &WorkDir) -> FrameResult<SourceImage> {
        let (base_name, bytes) = match self {
            ImageSource::Upload { name, bytes } => (name.clone(), bytes.clone()),
            ImageSource::Url(url) => (url_base_name(url), fetch_url(url)?),
        };

        let decoded = image::load_from_memory(&bytes).map_err(|e| {
            FrameError::validation(format!("failed to decode image '{base_name}': {e}"))
        })?;

        let export = workdir.file(EXPORT_FILE_NAME);
        decoded
            .save_with_format(&export, image::ImageFormat::Png)
            .with_context(|| format!("failed to save '{}'", export.display()))?;
        tracing::info!(path = %export.display(), "saved normalized source image");

        Ok(SourceImage {
            path: export,
            width: decoded.width(),
            height: decoded.height(),
            byte_len: bytes.len() as u64,
            base_name,
        })
    }
}

fn fetch_url(url: &str) -> FrameResult<Vec<u8>> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(FrameError::fetch(format!(
            "only http(s) URLs are supported, got '{url}'"
        )));
    }

    tracing::info!(url, "fetching source image");
    let response = reqwest::blocking::get(url)
        .map_err(|e| FrameError::fetch(format!("failed to fetch '{url}': {e}")))?;
    if !response.status().is_success() {
        return Err(FrameError::fetch(format!(
            "fetching '{url}' returned status {}",
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .map_err(|e| FrameError::fetch(format!("failed to read body of '{url}': {e}")))?;
    Ok(bytes.to_vec())
}

fn url_base_name(url: &str) -> String {
    url.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.split(['?', '#']).next().unwrap_or(s))
        .filter(|s| !s.is_empty())
        .unwrap_or("download")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_extensions() {
        assert!(ImageSource::from_path(Path::new("notes.txt")).is_err());
        assert!(ImageSource::from_path(Path::new("archive")).is_err());
    }

    #[test]
    fn accepts_uppercase_extension() {
        // Read failure is fine; the extension gate must pass first.
        let err = ImageSource::from_path(Path::new("missing.PNG")).unwrap_err();
        assert!(!matches!(err, FrameError::Validation(_)), "{err}");
    }

    #[test]
    fn non_http_urls_fail_fetch() {
        let err = fetch_url("ftp://example.com/x.png").unwrap_err();
        assert!(matches!(err, FrameError::Fetch(_)));
    }

    #[test]
    fn url_base_name_strips_query_and_fragments() {
        assert_eq!(url_base_name("https://x.test/a/cat.png?s=1"), "cat.png");
        assert_eq!(url_base_name("https://x.test/"), "download");
    }

    #[test]
    fn resolve_normalizes_upload_to_png_and_probes_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = WorkDir::at(dir.path().join("run")).unwrap();

        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();

        let byte_len = bytes.len() as u64;
        let source = ImageSource::Upload {
            name: "tiny.png".to_string(),
            bytes,
        };
        let resolved = source.resolve(&workdir).unwrap();
        assert_eq!((resolved.width, resolved.height), (3, 2));
        assert_eq!(resolved.byte_len, byte_len);
        assert_eq!(resolved.base_name, "tiny.png");
        assert!(resolved.path.ends_with(EXPORT_FILE_NAME));
        assert!(resolved.path.is_file());
    }
}
