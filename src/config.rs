use std::path::Path;

use crate::error::{FrameError, FrameResult};

/// ViewBox adjustments applied when cropping terminal chrome out of a
/// rendered SVG.
///
/// The defaults are empirical constants reverse-engineered from one
/// specific renderer version. They compensate for that renderer's fixed
/// title-bar height and side padding and are not derived from any
/// documented geometry, which is why they live in configuration instead of
/// the stripper itself.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChromeOffsets {
    /// Added to the viewBox min-y.
    pub top: f64,
    /// Added to the viewBox width (negative shrinks).
    pub width: f64,
    /// Added to the viewBox height (negative shrinks).
    pub height: f64,
}

impl Default for ChromeOffsets {
    fn default() -> Self {
        Self {
            top: 2.0,
            width: -19.0,
            height: -53.0,
        }
    }
}

/// Names of the external programs the pipeline shells out to, plus the
/// knobs shared by every conversion run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// ASCII-art generator driven by `--color`/`--complex`/`--color-bg` flags.
    pub converter_bin: String,
    /// Alternative ASCII-art generator used by the "(III)" approaches.
    pub magic_bin: String,
    /// ANSI-to-SVG renderer; reads ANSI text on stdin, writes SVG on stdout.
    pub svg_renderer_bin: String,
    /// Vector editor used to rasterize cleaned SVG files to PNG.
    pub vector_editor_bin: String,
    pub chrome: ChromeOffsets,
    /// Capacity of each per-concern memo cache (text, svg, png).
    pub cache_capacity: usize,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            converter_bin: "ascii-image-converter".to_string(),
            magic_bin: "artem".to_string(),
            svg_renderer_bin: "ansisvg".to_string(),
            vector_editor_bin: "inkscape".to_string(),
            chrome: ChromeOffsets::default(),
            cache_capacity: 64,
        }
    }
}

impl ToolConfig {
    pub fn validate(&self) -> FrameResult<()> {
        for (name, value) in [
            ("converter_bin", &self.converter_bin),
            ("magic_bin", &self.magic_bin),
            ("svg_renderer_bin", &self.svg_renderer_bin),
            ("vector_editor_bin", &self.vector_editor_bin),
        ] {
            if value.trim().is_empty() {
                return Err(FrameError::validation(format!(
                    "{name} must be a non-empty program name"
                )));
            }
        }
        if self.cache_capacity == 0 {
            return Err(FrameError::validation("cache_capacity must be > 0"));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> FrameResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FrameError::validation(format!("failed to read config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_str(&text).map_err(|e| {
            FrameError::validation(format!("failed to parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ToolConfig::default().validate().is_ok());
    }

    #[test]
    fn default_chrome_offsets_match_renderer_constants() {
        let c = ChromeOffsets::default();
        assert_eq!((c.top, c.width, c.height), (2.0, -19.0, -53.0));
    }

    #[test]
    fn empty_program_name_is_rejected() {
        let cfg = ToolConfig {
            vector_editor_bin: "  ".to_string(),
            ..ToolConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg: ToolConfig = serde_json::from_str(r#"{"magic_bin":"tai"}"#).unwrap();
        assert_eq!(cfg.magic_bin, "tai");
        assert_eq!(cfg.converter_bin, "ascii-image-converter");
        assert_eq!(cfg.chrome, ChromeOffsets::default());
    }
}
