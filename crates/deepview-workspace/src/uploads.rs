use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::error::WorkspaceError;
use crate::paths::absolutize;

const MAX_NAME_CHARS: usize = 120;
const DEFAULT_EXTENSION: &str = ".bin";
const DEFAULT_BASE_NAME: &str = "upload";

fn unsafe_name_chars() -> &'static Regex {
    static UNSAFE_NAME_RE: OnceLock<Regex> = OnceLock::new();
    UNSAFE_NAME_RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9._-]").expect("valid name regex"))
}

fn unsafe_bucket_chars() -> &'static Regex {
    static UNSAFE_BUCKET_RE: OnceLock<Regex> = OnceLock::new();
    UNSAFE_BUCKET_RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("valid bucket regex"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredUpload {
    pub filename: String,
    /// `bucket/filename`, or just `filename` when stored at the top level.
    pub path: String,
    #[serde(skip)]
    pub full_path: PathBuf,
}

/// Where user-supplied grounding files land.
#[derive(Debug, Clone)]
pub struct UploadStore {
    base: PathBuf,
    max_bytes: u64,
}

impl UploadStore {
    pub fn new(base: impl AsRef<Path>, max_bytes: u64) -> Result<Self> {
        Ok(Self {
            base: absolutize(base.as_ref())?,
            max_bytes,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Stores a file from disk under its own name. The size limit is checked
    /// against the file's metadata before any of it is read.
    pub fn store_file(&self, source: &Path, bucket: &str) -> Result<StoredUpload> {
        self.check_size(fs::metadata(source)?.len())?;
        let bytes = fs::read(source)?;
        let name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.store(&name, bucket, &bytes)
    }

    pub fn store(&self, original_name: &str, bucket: &str, bytes: &[u8]) -> Result<StoredUpload> {
        self.store_at(
            original_name,
            bucket,
            bytes,
            chrono::Utc::now().timestamp_millis(),
        )
    }

    pub fn store_at(
        &self,
        original_name: &str,
        bucket: &str,
        bytes: &[u8],
        now_ms: i64,
    ) -> Result<StoredUpload> {
        let size = bytes.len() as u64;
        self.check_size(size)?;

        let bucket = sanitize_bucket(bucket);
        let dir = if bucket.is_empty() {
            self.base.clone()
        } else {
            self.base.join(&bucket)
        };
        let filename = upload_file_name(original_name, now_ms);
        let full_path = dir.join(&filename);

        fs::create_dir_all(&dir)?;
        fs::write(&full_path, bytes)?;
        tracing::info!(file = %filename, bucket = %bucket, size, "upload stored");

        let path = if bucket.is_empty() {
            filename.clone()
        } else {
            format!("{bucket}/{filename}")
        };
        Ok(StoredUpload {
            filename,
            path,
            full_path,
        })
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_bytes {
            return Err(WorkspaceError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// `<sanitized stem>-<millis><extension>`; the extension keeps its dot.
pub fn upload_file_name(original_name: &str, now_ms: i64) -> String {
    let original = Path::new(original_name);
    let extension = original
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    let stem = original
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    let base = match sanitize_name(stem) {
        name if name.is_empty() => DEFAULT_BASE_NAME.to_string(),
        name => name,
    };
    format!("{base}-{now_ms}{extension}")
}

pub fn sanitize_name(name: &str) -> String {
    unsafe_name_chars()
        .replace_all(name, "_")
        .chars()
        .take(MAX_NAME_CHARS)
        .collect()
}

pub fn sanitize_bucket(bucket: &str) -> String {
    unsafe_bucket_chars().replace_all(bucket, "").into_owned()
}
