#![forbid(unsafe_code)]

//! Image to ASCII art conversion pipeline.
//!
//! Fans one input image out across a fixed catalog of conversion
//! approaches, each backed by an external ASCII-art generator, then renders
//! the ANSI output to a chrome-stripped SVG and optionally rasterizes it to
//! PNG. Generation itself is deliberately delegated to external tools; this
//! crate owns the orchestration, caching, and SVG cleanup.

pub mod ascii;
pub mod cache;
pub mod chrome;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod invoke;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod raster;
pub mod render;
pub mod source;
pub mod workdir;

pub use chrome::{OPTIMIZED_SUFFIX, strip_chrome, strip_chrome_file};
pub use config::{ChromeOffsets, ToolConfig};
pub use error::{FrameError, FrameResult};
pub use invoke::Toolchain;
pub use manifest::RunManifest;
pub use model::{
    Approach, CharWidth, ConvertOptions, DEFAULT_CHAR_WIDTH, Generator, MAX_CHAR_WIDTH,
    MIN_CHAR_WIDTH,
};
pub use pipeline::{ApproachOutcome, Conversion, Session, active_in_catalog_order};
pub use source::{ImageSource, SourceImage};
pub use workdir::WorkDir;
