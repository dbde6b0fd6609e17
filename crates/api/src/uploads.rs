//! Profile picture storage on the local filesystem.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A file received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only .png, .jpg and .jpeg files are allowed")]
    UnsupportedType,

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes profile pictures under one directory and names them
/// `image-<millis>-<uuid>.<ext>`.
#[derive(Debug, Clone)]
pub struct ProfileUploads {
    dir: PathBuf,
}

impl ProfileUploads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stores the file and returns the name it was stored under.
    #[tracing::instrument(skip(self, file), fields(size = file.bytes.len()))]
    pub async fn save(&self, file: &UploadedFile) -> Result<String, UploadError> {
        let extension = extension_of(file).ok_or(UploadError::UnsupportedType)?;
        let name = format!(
            "image-{}-{}.{extension}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4()
        );

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&name), &file.bytes).await?;

        tracing::debug!(%name, "profile picture stored");
        Ok(name)
    }

    /// Removes a stored file. Failures are logged, not returned.
    pub async fn discard(&self, name: &str) {
        if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
            tracing::warn!(%name, error = %e, "failed to remove orphaned upload");
        }
    }
}

fn extension_of(file: &UploadedFile) -> Option<&'static str> {
    let from_name = file
        .file_name
        .as_deref()
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let candidate = match from_name {
        Some(ext) => ext,
        None => match file.content_type.as_deref() {
            Some("image/png") => "png".to_string(),
            Some("image/jpeg") | Some("image/jpg") => "jpg".to_string(),
            _ => return None,
        },
    };

    ALLOWED_EXTENSIONS.into_iter().find(|allowed| *allowed == candidate)
}
