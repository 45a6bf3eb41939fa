//! Artifact persistence.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

use crate::core::{Failure, Stage};
use crate::signal::Signal;

/// Distinguishes the temp files of overlapping writes.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Write `content` to `path`, creating missing parent directories.
///
/// Content goes to a sibling temp file first and is renamed into place, so
/// the output only ever holds one complete artifact. Nothing is renamed once
/// `token` is cancelled, so a superseded run never reaches the output file,
/// even if its write was already running when it was superseded.
pub fn persist(path: PathBuf, content: String, token: CancellationToken) -> Signal<()> {
    Signal::from_future(async move {
        let fail = |e: std::io::Error| {
            Failure::error(Stage::Write, format!("cannot write {}: {e}", path.display()))
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(fail)?;
        }

        if token.is_cancelled() {
            return Err(Failure::superseded(Stage::Write));
        }

        let temp = temp_path(&path);
        if let Err(e) = tokio::fs::write(&temp, content).await {
            tokio::fs::remove_file(&temp).await.ok();
            return Err(fail(e));
        }
        if token.is_cancelled() {
            tokio::fs::remove_file(&temp).await.ok();
            return Err(Failure::superseded(Stage::Write));
        }
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            tokio::fs::remove_file(&temp).await.ok();
            return Err(fail(e));
        }

        crate::debug!("write"; "{}", path.display());
        Ok(())
    })
}

/// `dist/main.html` → `dist/.main.html.<pid>.<seq>.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "artifact".into(), |n| n.to_string_lossy().into_owned());
    let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
}
