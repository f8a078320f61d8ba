use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    cache::MemoCache,
    config::ToolConfig,
    error::{FrameError, FrameResult},
    fingerprint::FingerprintBuilder,
};

/// Shared runner for every external process the pipeline touches.
///
/// Holds one bounded memo cache per concern (ASCII text, rendered SVG,
/// rasterized PNG) so that repeated requests with identical inputs do not
/// re-invoke a process. Failed runs are never cached. Thread-safe: the
/// per-approach fan-out shares one `Toolchain` across rayon workers.
pub struct Toolchain {
    cfg: ToolConfig,
    pub(crate) text_cache: MemoCache<Arc<String>>,
    pub(crate) svg_cache: MemoCache<crate::render::RenderedSvg>,
    pub(crate) png_cache: MemoCache<PathBuf>,
    spawns: AtomicU64,
}

impl Toolchain {
    pub fn new(cfg: ToolConfig) -> FrameResult<Self> {
        cfg.validate()?;
        let capacity = cfg.cache_capacity;
        Ok(Self {
            cfg,
            text_cache: MemoCache::new(capacity),
            svg_cache: MemoCache::new(capacity),
            png_cache: MemoCache::new(capacity),
            spawns: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &ToolConfig {
        &self.cfg
    }

    /// Number of real process spawns so far. Cache hits do not count.
    pub fn spawn_count(&self) -> u64 {
        self.spawns.load(Ordering::Relaxed)
    }

    /// Run an ASCII-art generator and return its stdout as UTF-8 text,
    /// memoized by (program, argv).
    pub fn ascii_text(&self, program: &str, args: &[String]) -> FrameResult<Arc<String>> {
        let mut fp = FingerprintBuilder::new();
        fp.write_str(program);
        fp.write_strs(args.iter().map(String::as_str));
        let key = fp.finish();

        self.text_cache.get_or_try_insert_with(key, || {
            let stdout = self.run_capture(program, args, None)?;
            let text = String::from_utf8(stdout).map_err(|_| {
                FrameError::tool(format!("'{program}' produced non-UTF-8 output"))
            })?;
            Ok(Arc::new(text))
        })
    }

    /// Spawn `program args...`, optionally feeding `stdin_bytes`, and return
    /// captured stdout. Missing binaries and non-zero exits are distinct,
    /// user-visible errors carrying trimmed stderr.
    pub(crate) fn run_capture(
        &self,
        program: &str,
        args: &[String],
        stdin_bytes: Option<&[u8]>,
    ) -> FrameResult<Vec<u8>> {
        if find_on_path(program).is_none() {
            return Err(FrameError::tool(format!(
                "'{program}' is required, but was not found on PATH"
            )));
        }

        tracing::info!(program, args = ?args, "execute");
        self.spawns.fetch_add(1, Ordering::Relaxed);

        let mut cmd = Command::new(program);
        cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd.stdin(if stdin_bytes.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        let mut child = cmd
            .spawn()
            .map_err(|e| FrameError::tool(format!("failed to spawn '{program}': {e}")))?;

        if let Some(bytes) = stdin_bytes {
            let Some(mut stdin) = child.stdin.take() else {
                return Err(FrameError::tool(format!(
                    "failed to open stdin of '{program}' (unexpected)"
                )));
            };
            use std::io::Write as _;
            stdin.write_all(bytes).map_err(|e| {
                FrameError::tool(format!("failed to write to stdin of '{program}': {e}"))
            })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| FrameError::tool(format!("failed to wait for '{program}': {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FrameError::tool(format!(
                "'{program}' exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

/// Locate an executable on PATH, honoring `PATHEXT`-free unix semantics; an
/// explicit path is accepted as-is when it points at a file.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&paths) {
        let full = dir.join(program);
        if full.is_file() {
            return Some(full);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{program}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}
