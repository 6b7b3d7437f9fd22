//! Log file retention

use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Log files older than this are removed when logging starts
pub const LOG_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Delete regular files in `dir` last modified more than `retention` before `now`
///
/// Subdirectories are left alone. An entry that cannot be read, inspected or
/// removed is skipped with a warning. Only failing to open `dir` itself is an
/// error. Returns the paths that were deleted.
pub fn cleanup_old_logs(dir: &Path, retention: Duration, now: SystemTime) -> io::Result<Vec<PathBuf>> {
    Ok(sweep(fs::read_dir(dir)?, retention, now))
}

fn sweep<I>(entries: I, retention: Duration, now: SystemTime) -> Vec<PathBuf>
where
    I: IntoIterator<Item = io::Result<DirEntry>>,
{
    let mut removed = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read log directory entry");
                continue;
            }
        };
        let path = entry.path();

        let modified = match file_modified(&entry) {
            Ok(Some(modified)) => modified,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Could not inspect log file");
                continue;
            }
        };

        // Files stamped in the future have age zero.
        let age = now.duration_since(modified).unwrap_or_default();
        if age <= retention {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(file = %path.display(), "Deleting old log file");
                removed.push(path);
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Could not delete old log file");
            }
        }
    }

    removed
}

/// Modification time of a regular file, `None` for anything else
fn file_modified(entry: &DirEntry) -> io::Result<Option<SystemTime>> {
    let metadata = entry.metadata()?;
    if !metadata.is_file() {
        return Ok(None);
    }
    metadata.modified().map(Some)
}
