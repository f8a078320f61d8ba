use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use rayon::prelude::*;

use crate::{
    ascii::strip_art_glyphs,
    config::ToolConfig,
    error::{FrameError, FrameResult},
    invoke::Toolchain,
    manifest::RunManifest,
    model::{Approach, CharWidth, ConvertOptions, Generator},
    source::{ImageSource, SourceImage},
    workdir::WorkDir,
};

/// Everything one approach produced for the current image.
#[derive(Clone, Debug)]
pub struct Conversion {
    pub text: Arc<String>,
    pub text_path: PathBuf,
    pub raw_svg_path: PathBuf,
    /// Chrome-stripped SVG, the variant meant for preview and download.
    pub svg_path: PathBuf,
    pub png_path: Option<PathBuf>,
    pub download_stem: String,
}

/// Per-approach result; failures are isolated so one broken tool does not
/// abort the rest of the fan-out.
#[derive(Debug)]
pub struct ApproachOutcome {
    pub approach: Approach,
    pub result: FrameResult<Conversion>,
}

/// Filter the fixed catalog by an activation set, preserving catalog order.
/// Duplicate or unordered activations have no effect on the output order.
pub fn active_in_catalog_order(active: &[Approach]) -> Vec<Approach> {
    Approach::CATALOG
        .iter()
        .copied()
        .filter(|a| active.contains(a))
        .collect()
}

/// One conversion run: a fresh working directory plus the shared toolchain.
pub struct Session {
    toolchain: Toolchain,
    workdir: WorkDir,
}

impl Session {
    pub fn new(cfg: ToolConfig, root: &Path) -> FrameResult<Self> {
        Ok(Self {
            toolchain: Toolchain::new(cfg)?,
            workdir: WorkDir::create(root)?,
        })
    }

    /// Run inside an existing directory instead of a fresh timestamped one.
    pub fn with_workdir(cfg: ToolConfig, workdir: WorkDir) -> FrameResult<Self> {
        Ok(Self {
            toolchain: Toolchain::new(cfg)?,
            workdir,
        })
    }

    pub fn workdir(&self) -> &WorkDir {
        &self.workdir
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Normalize the upload/URL into this run's directory.
    pub fn resolve(&self, source: &ImageSource) -> FrameResult<SourceImage> {
        source.resolve(&self.workdir)
    }

    /// Fan the source image out across the activated approaches.
    ///
    /// Approaches run in parallel; they share only the immutable source
    /// image and the thread-safe memo caches. Outcomes come back in catalog
    /// order. An empty activation set performs zero external invocations.
    pub fn convert(
        &self,
        source: &SourceImage,
        active: &[Approach],
        options: &ConvertOptions,
    ) -> FrameResult<Vec<ApproachOutcome>> {
        options.validate()?;
        let ordered = active_in_catalog_order(active);

        let outcomes: Vec<ApproachOutcome> = ordered
            .par_iter()
            .map(|&approach| ApproachOutcome {
                approach,
                result: self.run_approach(source, approach, options),
            })
            .collect();

        RunManifest::new(
            source,
            &ordered,
            options,
            self.toolchain.config().cache_capacity,
        )
        .write(self.workdir.path())?;

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        tracing::info!(
            total = outcomes.len(),
            failed,
            spawns = self.toolchain.spawn_count(),
            "conversion run finished"
        );
        Ok(outcomes)
    }

    fn approach_text(
        &self,
        source: &SourceImage,
        approach: Approach,
        char_width: CharWidth,
    ) -> FrameResult<Arc<String>> {
        match approach.generator() {
            Generator::PostProcess { base } => {
                // Cache-shared with the base approach when both are active.
                let base_text = self.approach_text(source, base, char_width)?;
                Ok(Arc::new(strip_art_glyphs(&base_text)))
            }
            generator => {
                let (program, args) = generator
                    .command(self.toolchain.config(), &source.path, char_width)
                    .ok_or_else(|| {
                        FrameError::validation(format!(
                            "approach '{}' has no generator command",
                            approach.slug()
                        ))
                    })?;
                self.toolchain.ascii_text(&program, &args)
            }
        }
    }

    fn run_approach(
        &self,
        source: &SourceImage,
        approach: Approach,
        options: &ConvertOptions,
    ) -> FrameResult<Conversion> {
        let text = self.approach_text(source, approach, options.char_width)?;
        let download_stem = approach.download_stem(options.char_width);

        let text_path = self.workdir.file(&format!("{download_stem}.txt"));
        std::fs::write(&text_path, text.as_bytes())
            .with_context(|| format!("failed to write '{}'", text_path.display()))?;

        let rendered = self
            .toolchain
            .render_ansi(&text, &self.workdir.file(&download_stem))?;

        let png_path = if options.raster {
            let png = self.workdir.file(&format!("{download_stem}.png"));
            Some(
                self.toolchain
                    .rasterize(&rendered.optimized, options.effective_png_width(), &png)?,
            )
        } else {
            None
        };

        Ok(Conversion {
            text,
            text_path,
            raw_svg_path: rendered.raw,
            svg_path: rendered.optimized,
            png_path,
            download_stem,
        })
    }
}
