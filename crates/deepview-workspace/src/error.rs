use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("path is required")]
    PathRequired,

    #[error("file too large ({size} > {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = WorkspaceError> = std::result::Result<T, E>;
