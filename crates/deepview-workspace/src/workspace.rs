use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::error::Result;
use crate::error::WorkspaceError;
use crate::paths::absolutize;
use crate::paths::display_relative;
use crate::paths::resolve_within;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Directory,
    File,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::File => "file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
    pub updated_at: DateTime<Utc>,
}

/// The agent's working directory, exposed for browsing and editing. Every
/// operation takes a path relative to the root and is refused if it would
/// leave it.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            root: absolutize(root.as_ref())?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        resolve_within(&self.root, relative).inspect_err(|_| {
            tracing::warn!(path = relative, "workspace access outside root denied");
        })
    }

    /// Directories first, then by name.
    pub fn list(&self, relative: &str) -> Result<Vec<WorkspaceEntry>> {
        let dir = self.resolve(relative)?;
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let full = entry.path();
            let metadata = fs::metadata(&full)?;
            let kind = if metadata.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(WorkspaceEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: display_relative(&self.root, &full),
                kind,
                size: metadata.len(),
                updated_at: DateTime::<Utc>::from(
                    metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                ),
            });
        }
        entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
        Ok(entries)
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.existing_file(relative)?;
        Ok(fs::read_to_string(path)?)
    }

    /// Creates missing parent directories.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.required(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        tracing::info!(path = relative, bytes = content.len(), "workspace file written");
        Ok(path)
    }

    pub fn delete(&self, relative: &str) -> Result<()> {
        self.required(relative)?;
        let path = self.existing_file(relative)?;
        fs::remove_file(&path)?;
        tracing::info!(path = relative, "workspace file deleted");
        Ok(())
    }

    fn required(&self, relative: &str) -> Result<PathBuf> {
        if relative.trim().is_empty() {
            return Err(WorkspaceError::PathRequired);
        }
        let path = self.resolve(relative)?;
        if path == self.root {
            return Err(WorkspaceError::NotAFile(path));
        }
        Ok(path)
    }

    fn existing_file(&self, relative: &str) -> Result<PathBuf> {
        let path = self.resolve(relative)?;
        if fs::metadata(&path)?.is_dir() {
            return Err(WorkspaceError::NotAFile(path));
        }
        Ok(path)
    }
}
