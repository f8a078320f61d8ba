use std::path::{Path, PathBuf};

use crate::{
    error::{FrameError, FrameResult},
    fingerprint::FingerprintBuilder,
    invoke::{Toolchain, find_on_path},
};

impl Toolchain {
    /// Rasterize a cleaned SVG to a PNG of the requested pixel width,
    /// preserving aspect ratio, via the configured vector editor.
    ///
    /// A missing editor binary is fatal for this conversion only; the
    /// orchestrator lets other approaches continue. Memoized by
    /// (svg path, width); nothing is cached on failure.
    pub fn rasterize(&self, svg: &Path, png_width: u32, out: &Path) -> FrameResult<PathBuf> {
        if png_width == 0 {
            return Err(FrameError::validation("png width must be > 0"));
        }

        let editor = self.config().vector_editor_bin.clone();

        let mut fp = FingerprintBuilder::new();
        fp.write_str(&editor);
        fp.write_path(svg);
        fp.write_path(out);
        fp.write_u32(png_width);
        let key = fp.finish();

        self.png_cache.get_or_try_insert_with(key, || {
            if find_on_path(&editor).is_none() {
                return Err(FrameError::tool(format!(
                    "'{editor}' is required for PNG export, but was not found on PATH"
                )));
            }

            let args = vec![
                "--export-type=png".to_string(),
                format!("--export-filename={}", out.display()),
                format!("--export-width={png_width}"),
                svg.display().to_string(),
            ];
            self.run_capture(&editor, &args, None)?;

            if !out.is_file() {
                return Err(FrameError::tool(format!(
                    "'{editor}' reported success but produced no file at '{}'",
                    out.display()
                )));
            }

            Ok(out.to_path_buf())
        })
    }
}
