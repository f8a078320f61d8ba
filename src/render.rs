use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    chrome,
    error::FrameResult,
    fingerprint::FingerprintBuilder,
    invoke::Toolchain,
};

/// Raw and chrome-stripped SVG files produced for one piece of ANSI text.
#[derive(Clone, Debug)]
pub struct RenderedSvg {
    pub raw: PathBuf,
    pub optimized: PathBuf,
}

impl Toolchain {
    /// Render ANSI text to SVG through the configured external renderer
    /// (text on stdin, SVG on stdout), then strip the terminal chrome.
    ///
    /// Writes `<out_base>.svg` and `<out_base>-optimized.svg`. Memoized by
    /// (ANSI text, output base); a renderer failure or a chrome-strip
    /// failure caches nothing.
    pub fn render_ansi(&self, ansi: &str, out_base: &Path) -> FrameResult<RenderedSvg> {
        let renderer = self.config().svg_renderer_bin.clone();

        let mut fp = FingerprintBuilder::new();
        fp.write_str(&renderer);
        fp.write_path(out_base);
        fp.write_str(ansi);
        let key = fp.finish();

        self.svg_cache.get_or_try_insert_with(key, || {
            let svg_bytes = self.run_capture(&renderer, &[], Some(ansi.as_bytes()))?;

            let raw = out_base.with_extension("svg");
            std::fs::write(&raw, &svg_bytes)
                .with_context(|| format!("failed to write svg '{}'", raw.display()))?;

            let optimized = chrome::strip_chrome_file(&raw, &self.config().chrome)?;
            tracing::info!(raw = %raw.display(), optimized = %optimized.display(), "rendered ansi to svg");

            Ok(RenderedSvg { raw, optimized })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolConfig;
    use crate::error::FrameError;

    #[test]
    fn missing_renderer_is_a_tool_error() {
        let cfg = ToolConfig {
            svg_renderer_bin: "no-such-renderer-19af".to_string(),
            ..ToolConfig::default()
        };
        let tc = Toolchain::new(cfg).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = tc
            .render_ansi("hello", &dir.path().join("banner"))
            .unwrap_err();
        assert!(matches!(err, FrameError::Tool(_)));
    }
}
