use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{Duration, Local, NaiveDateTime};

use crate::error::{FrameError, FrameResult};

const RUN_DIR_FORMAT: &str = "%Y%m%d-%H%M%S";

/// One fresh timestamped directory per conversion run. All intermediate and
/// output files for the run live here; directories are never reused.
#[derive(Clone, Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Create `<root>/<YYYYmmdd-HHMMSS>`, appending `-2`, `-3`, … when two
    /// runs start within the same second.
    pub fn create(root: &Path) -> FrameResult<Self> {
        let stamp = Local::now().format(RUN_DIR_FORMAT).to_string();
        let mut candidate = root.join(&stamp);
        let mut suffix = 2u32;
        while candidate.exists() {
            if suffix > 1000 {
                return Err(FrameError::validation(format!(
                    "could not find a free run directory under '{}'",
                    root.display()
                )));
            }
            candidate = root.join(format!("{stamp}-{suffix}"));
            suffix += 1;
        }

        std::fs::create_dir_all(&candidate)
            .with_context(|| format!("failed to create run directory '{}'", candidate.display()))?;
        tracing::info!(dir = %candidate.display(), "new working directory");
        Ok(Self { path: candidate })
    }

    /// Open an existing directory without the timestamp convention. Used by
    /// tests and by callers that manage run layout themselves.
    pub fn at(path: impl Into<PathBuf>) -> FrameResult<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create run directory '{}'", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

/// Delete run directories older than `max_age`, returning how many were
/// removed. Entries whose names do not follow the run timestamp convention
/// are left alone.
pub fn gc(root: &Path, max_age: Duration) -> FrameResult<usize> {
    let cutoff = Local::now().naive_local() - max_age;
    let mut removed = 0usize;

    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        // A root that was never created holds nothing to collect.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(FrameError::validation(format!(
                "failed to list '{}': {e}",
                root.display()
            )));
        }
    };

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry under '{}'", root.display()))?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(stamp) = parse_run_timestamp(&name.to_string_lossy()) else {
            continue;
        };
        if stamp < cutoff {
            std::fs::remove_dir_all(entry.path()).with_context(|| {
                format!("failed to remove run directory '{}'", entry.path().display())
            })?;
            tracing::warn!(dir = %entry.path().display(), "garbage-collected run directory");
            removed += 1;
        }
    }

    Ok(removed)
}

/// Parse `YYYYmmdd-HHMMSS` or `YYYYmmdd-HHMMSS-n` directory names.
pub fn parse_run_timestamp(name: &str) -> Option<NaiveDateTime> {
    let stamp = if name.len() > 15 && name.as_bytes().get(15) == Some(&b'-') {
        &name[..15]
    } else {
        name
    };
    NaiveDateTime::parse_from_str(stamp, RUN_DIR_FORMAT).ok()
}
