use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::error::Result;
use crate::error::WorkspaceError;

/// Lexically folds `.` and `..` without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Absolute, normalized form of `path` against the current directory.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    Ok(normalize(&std::env::current_dir()?.join(path)))
}

/// Resolves `relative` under `root` (already absolute and normalized) and
/// refuses anything that lands outside it. Containment is per component, so
/// `/srv/work2` is not inside `/srv/work`.
pub fn resolve_within(root: &Path, relative: &str) -> Result<PathBuf> {
    let resolved = normalize(&root.join(relative));
    if !resolved.starts_with(root) {
        return Err(WorkspaceError::AccessDenied(relative.to_string()));
    }
    Ok(resolved)
}

/// `full` relative to `root`, `/`-separated.
pub fn display_relative(root: &Path, full: &Path) -> String {
    let relative = full.strip_prefix(root).unwrap_or(full);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
