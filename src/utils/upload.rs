use std::io;
use std::path::PathBuf;

use log::{debug, info};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::employee::UploadedFile;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File size exceeds {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("Only image files are allowed")]
    NotAnImage,
    #[error("upload storage failed: {0}")]
    Io(#[from] io::Error),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Io(io_err) => {
                log::error!("Upload IO error: {:?}", io_err);
                AppError::InternalServerError("Failed to store upload".to_string())
            }
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

pub struct StoredImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Image files on disk under a single root directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn check_size(&self, len: usize) -> Result<(), UploadError> {
        if len > self.max_bytes {
            return Err(UploadError::TooLarge { limit: self.max_bytes });
        }
        Ok(())
    }

    /// Validates and writes an image, returning its generated filename.
    pub async fn save_image(&self, bytes: &[u8]) -> Result<UploadedFile, UploadError> {
        self.check_size(bytes.len())?;

        if !infer::is_image(bytes) {
            return Err(UploadError::NotAnImage);
        }
        let file_type = infer::get(bytes).ok_or(UploadError::NotAnImage)?;

        let filename = format!("{}.{}", Uuid::new_v4(), file_type.extension());
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&filename), bytes).await?;

        info!("Stored upload {} ({} bytes)", filename, bytes.len());
        Ok(UploadedFile::new(filename))
    }

    /// Reads a previously stored file. Unknown or unsafe names yield `None`.
    pub async fn read(&self, filename: &str) -> Result<Option<StoredImage>, UploadError> {
        if !is_safe_filename(filename) {
            debug!("Rejected upload name {:?}", filename);
            return Ok(None);
        }

        match tokio::fs::read(self.root.join(filename)).await {
            Ok(bytes) => {
                let content_type = infer::get(&bytes)
                    .map(|kind| kind.mime_type())
                    .unwrap_or("application/octet-stream");
                Ok(Some(StoredImage { bytes, content_type }))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.starts_with('.')
        && !filename.contains(|c: char| c == '/' || c == '\\')
        && !filename.contains("..")
}
