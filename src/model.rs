use std::path::Path;

use crate::{
    config::ToolConfig,
    error::{FrameError, FrameResult},
};

pub const MIN_CHAR_WIDTH: u32 = 10;
pub const MAX_CHAR_WIDTH: u32 = 300;
pub const DEFAULT_CHAR_WIDTH: u32 = 60;

/// One named configuration of flags/tool calls producing one ASCII-art
/// rendering style.
///
/// The catalog is a closed set: display order, colors, and generator
/// bindings are compile-time data, and results are always reported in
/// [`Approach::CATALOG`] order regardless of activation order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Approach {
    WithColors,
    WithColorsComplex,
    WithColorsMagic,
    WithBackground,
    WithBackgroundComplex,
    OnlyBackground,
    Neutral,
    NeutralComplex,
    NeutralMagic,
}

/// How an approach obtains its ASCII text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Generator {
    /// Flag-driven converter binary (`--color`, `--complex`, `--color-bg`).
    Converter { flags: &'static [&'static str] },
    /// Alternative generator binary; only distinguishes color vs monochrome.
    Magic { monochrome: bool },
    /// Post-process of another approach's text (art glyphs stripped).
    PostProcess { base: Approach },
}

impl Approach {
    pub const CATALOG: [Approach; 9] = [
        Approach::WithColors,
        Approach::WithColorsComplex,
        Approach::WithColorsMagic,
        Approach::WithBackground,
        Approach::WithBackgroundComplex,
        Approach::OnlyBackground,
        Approach::Neutral,
        Approach::NeutralComplex,
        Approach::NeutralMagic,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Approach::WithColors => "With colors (I)",
            Approach::WithColorsComplex => "With colors (II)",
            Approach::WithColorsMagic => "With colors (III)",
            Approach::WithBackground => "With background (I)",
            Approach::WithBackgroundComplex => "With background (II)",
            Approach::OnlyBackground => "Only background",
            Approach::Neutral => "No colors (I)",
            Approach::NeutralComplex => "No colors (II)",
            Approach::NeutralMagic => "No colors (III)",
        }
    }

    /// Stable kebab-case identifier used for file stems and CLI values.
    pub fn slug(self) -> &'static str {
        match self {
            Approach::WithColors => "with-colors",
            Approach::WithColorsComplex => "with-colors-complex",
            Approach::WithColorsMagic => "with-colors-magic",
            Approach::WithBackground => "with-background",
            Approach::WithBackgroundComplex => "with-background-complex",
            Approach::OnlyBackground => "only-background",
            Approach::Neutral => "neutral",
            Approach::NeutralComplex => "neutral-complex",
            Approach::NeutralMagic => "neutral-magic",
        }
    }

    pub fn uses_color(self) -> bool {
        !matches!(
            self,
            Approach::Neutral | Approach::NeutralComplex | Approach::NeutralMagic
        )
    }

    pub fn description(self) -> &'static str {
        match self {
            Approach::WithColors => "converter: simple, colored ASCII characters",
            Approach::WithColorsComplex => "converter: complex, colored ASCII characters",
            Approach::WithColorsMagic => "magic generator: simple, colored ASCII characters",
            Approach::WithBackground => {
                "converter: simple, one-colored ASCII characters and background colors"
            }
            Approach::WithBackgroundComplex => {
                "converter: complex, one-colored ASCII characters and background colors"
            }
            Approach::OnlyBackground => {
                "converter: background colors only (each character is a whitespace)"
            }
            Approach::Neutral => "converter: simple, one-color ASCII characters",
            Approach::NeutralComplex => "converter: complex, one-color ASCII characters",
            Approach::NeutralMagic => "magic generator: simple, one-color ASCII characters",
        }
    }

    pub fn generator(self) -> Generator {
        match self {
            Approach::WithColors => Generator::Converter {
                flags: &["--color"],
            },
            Approach::WithColorsComplex => Generator::Converter {
                flags: &["--color", "--complex"],
            },
            Approach::WithColorsMagic => Generator::Magic { monochrome: false },
            Approach::WithBackground => Generator::Converter {
                flags: &["--color", "--color-bg"],
            },
            Approach::WithBackgroundComplex => Generator::Converter {
                flags: &["--color", "--color-bg", "--complex"],
            },
            Approach::OnlyBackground => Generator::PostProcess {
                base: Approach::WithBackground,
            },
            Approach::Neutral => Generator::Converter { flags: &[] },
            Approach::NeutralComplex => Generator::Converter {
                flags: &["--complex"],
            },
            Approach::NeutralMagic => Generator::Magic { monochrome: true },
        }
    }

    /// File stem for downloadable artifacts, e.g. `ascii-image-with-colors-60`.
    pub fn download_stem(self, char_width: CharWidth) -> String {
        format!("ascii-image-{}-{}", self.slug(), char_width.get())
    }
}

impl Generator {
    /// Program and argument vector for generators that invoke an external
    /// process. `PostProcess` approaches have no command of their own.
    pub fn command(
        &self,
        cfg: &ToolConfig,
        image: &Path,
        char_width: CharWidth,
    ) -> Option<(String, Vec<String>)> {
        match self {
            Generator::Converter { flags } => {
                let mut args: Vec<String> = flags.iter().map(|f| (*f).to_string()).collect();
                args.push("--width".to_string());
                args.push(char_width.get().to_string());
                args.push(image.display().to_string());
                Some((cfg.converter_bin.clone(), args))
            }
            Generator::Magic { monochrome } => {
                let mut args = vec![
                    image.display().to_string(),
                    "--size".to_string(),
                    char_width.get().to_string(),
                ];
                if *monochrome {
                    args.push("--no-color".to_string());
                }
                Some((cfg.magic_bin.clone(), args))
            }
            Generator::PostProcess { .. } => None,
        }
    }
}

/// Characters per line in the generated output, clamped to
/// `[MIN_CHAR_WIDTH, MAX_CHAR_WIDTH]`. Out-of-range values never reach an
/// external tool.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct CharWidth(u32);

impl CharWidth {
    pub fn new(v: u32) -> FrameResult<Self> {
        if !(MIN_CHAR_WIDTH..=MAX_CHAR_WIDTH).contains(&v) {
            return Err(FrameError::validation(format!(
                "character width {v} out of range [{MIN_CHAR_WIDTH}, {MAX_CHAR_WIDTH}]"
            )));
        }
        Ok(Self(v))
    }

    pub fn clamp(v: u32) -> Self {
        Self(v.clamp(MIN_CHAR_WIDTH, MAX_CHAR_WIDTH))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Default pixel width for rasterized output at this character width.
    ///
    /// Matches the original HTML-rendering heuristic of 8 px per character
    /// minus a fifth of a pixel per character of letter-spacing drift.
    pub fn default_raster_width(self) -> u32 {
        8 * self.0 - self.0 / 5
    }
}

impl Default for CharWidth {
    fn default() -> Self {
        Self(DEFAULT_CHAR_WIDTH)
    }
}

/// Per-run conversion parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConvertOptions {
    pub char_width: CharWidth,
    /// Target pixel width for PNG export; defaults from `char_width` when absent.
    pub png_width: Option<u32>,
    /// Whether to rasterize the cleaned SVG to PNG at all.
    pub raster: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            char_width: CharWidth::default(),
            png_width: None,
            raster: true,
        }
    }
}

impl ConvertOptions {
    pub fn validate(&self) -> FrameResult<()> {
        if let Some(w) = self.png_width
            && w == 0
        {
            return Err(FrameError::validation("png_width must be > 0"));
        }
        Ok(())
    }

    pub fn effective_png_width(&self) -> u32 {
        self.png_width
            .unwrap_or_else(|| self.char_width.default_raster_width())
    }
}
