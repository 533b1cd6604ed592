use std::path::PathBuf;
use thiserror::Error;

/// Build error types
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to prepare output directory: {path}")]
    PrepareFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No space left on device for {path}")]
    DiskFull { path: PathBuf },

    #[error("Failed to copy {src} to {dst}")]
    CopyFailed {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory: {path}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run `{program}`")]
    ToolSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` failed with exit code {code}: {stderr}")]
    ToolFailed {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("Failed to walk {path}")]
    WalkFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Build cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// ENOSPC on Unix
const ENOSPC: i32 = 28;

impl BuildError {
    /// Map an I/O error on `path` to `DiskFull` when the device is out of space,
    /// otherwise build the error with `other`.
    pub(crate) fn classify(
        err: std::io::Error,
        path: &std::path::Path,
        other: impl FnOnce(std::io::Error) -> BuildError,
    ) -> BuildError {
        if err.raw_os_error() == Some(ENOSPC) {
            return BuildError::DiskFull {
                path: path.to_path_buf(),
            };
        }
        other(err)
    }
}
