use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

use crate::error::BuildError;

/// Files and bytes written by a copy pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: u64,
    pub bytes: u64,
}

impl CopyStats {
    fn record(&mut self, bytes: u64) {
        self.files += 1;
        self.bytes += bytes;
    }
}

impl std::ops::AddAssign for CopyStats {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.bytes += other.bytes;
    }
}

/// Create `path` and its parents
pub fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|e| {
        BuildError::classify(e, path, |source| BuildError::CreateDirFailed {
            path: path.to_path_buf(),
            source,
        })
    })
}

/// Copy a single file from src to dst, overwriting dst.
/// Permissions are carried by the copy, the modification time is restored afterwards.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, BuildError> {
    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            create_dir(parent)?;
        }
    }

    let bytes = fs::copy(src, dst).map_err(|e| {
        BuildError::classify(e, dst, |source| BuildError::CopyFailed {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            source,
        })
    })?;

    preserve_mtime(src, dst);
    Ok(bytes)
}

fn preserve_mtime(src: &Path, dst: &Path) {
    let result = fs::metadata(src)
        .and_then(|meta| meta.modified())
        .and_then(|mtime| {
            fs::File::options()
                .write(true)
                .open(dst)
                .and_then(|file| file.set_modified(mtime))
        });

    if let Err(e) = result {
        tracing::debug!("could not preserve mtime of {}: {e}", dst.display());
    }
}

/// Copy directory recursively, overwriting files that already exist in dst.
///
/// Directories are recreated even when empty. A missing `src` is an error.
pub fn copy_directory(
    src: &Path,
    dst: &Path,
    shutdown: &AtomicBool,
) -> Result<CopyStats, BuildError> {
    let mut stats = CopyStats::default();

    for entry in WalkDir::new(src).follow_links(true) {
        if shutdown.load(Ordering::Relaxed) {
            return Err(BuildError::Cancelled);
        }

        let entry = entry.map_err(|source| BuildError::WalkFailed {
            path: src.to_path_buf(),
            source,
        })?;

        let src_path = entry.path();
        let relative = src_path.strip_prefix(src).unwrap_or(src_path);
        let dst_path = dst.join(relative);

        if entry.file_type().is_dir() {
            create_dir(&dst_path)?;
            continue;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        let bytes = copy_file(src_path, &dst_path)?;
        tracing::debug!("copied {}", relative.display());
        stats.record(bytes);
    }

    Ok(stats)
}

/// Copy each named file from `root` into `output` if it exists at the source.
/// Missing files are skipped.
pub fn copy_root_files(
    root: &Path,
    output: &Path,
    names: &[&str],
    shutdown: &AtomicBool,
) -> Result<CopyStats, BuildError> {
    let mut stats = CopyStats::default();

    for name in names {
        if shutdown.load(Ordering::Relaxed) {
            return Err(BuildError::Cancelled);
        }

        let src = root.join(name);
        if !src.exists() {
            tracing::debug!("root file {name} not present, skipping");
            continue;
        }

        let bytes = copy_file(&src, &output.join(name))?;
        stats.record(bytes);
    }

    Ok(stats)
}
