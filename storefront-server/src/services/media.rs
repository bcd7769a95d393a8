//! Media store
//!
//! Stores uploaded images and hands back stable filenames. Uploads are
//! decoded and re-encoded as JPEG so the store never persists an
//! arbitrary byte blob under an image name. Callers follow one ordering
//! rule: upload the replacement before removing the old file, and only
//! reference a filename after the store call returns.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;
use uuid::Uuid;

use crate::utils::AppError;

const JPEG_QUALITY: u8 = 85;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Unsupported or corrupt image: {0}")]
    Decode(String),

    #[error("Failed to write image: {0}")]
    Store(String),

    #[error("Failed to remove image: {0}")]
    Remove(String),
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        AppError::upload_failed(err.to_string())
    }
}

/// Blob store for uploaded images
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store one image, returning the generated filename
    async fn store(&self, data: &[u8]) -> Result<String, MediaError>;

    async fn remove(&self, filename: &str) -> Result<(), MediaError>;

    /// Display URL for a stored filename
    fn url_for(&self, filename: &str) -> String;
}

/// Remove a blob, logging instead of failing; a dangling file never
/// blocks a completed logical delete.
pub async fn remove_quietly(store: &dyn MediaStore, filename: &str) {
    if let Err(e) = store.remove(filename).await {
        tracing::warn!(filename, error = %e, "image removal failed");
    }
}

fn encode_jpeg(data: &[u8]) -> Result<Vec<u8>, MediaError> {
    let img = image::load_from_memory(data).map_err(|e| MediaError::Decode(e.to_string()))?;
    let mut buf = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY))
        .map_err(|e| MediaError::Store(e.to_string()))?;
    Ok(buf)
}

fn new_filename() -> String {
    format!("{}.jpg", Uuid::new_v4())
}

/// Filesystem-backed store serving files from the uploads directory
pub struct FsMediaStore {
    dir: PathBuf,
    public_base: String,
}

impl FsMediaStore {
    /// `public_base` is the externally visible URL prefix the uploads
    /// directory is served under, e.g. `http://localhost:8080/uploads`
    pub fn new(dir: PathBuf, public_base: String) -> Self {
        Self {
            dir,
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn store(&self, data: &[u8]) -> Result<String, MediaError> {
        let encoded = encode_jpeg(data)?;
        let filename = new_filename();
        tokio::fs::write(self.dir.join(&filename), encoded)
            .await
            .map_err(|e| MediaError::Store(e.to_string()))?;
        Ok(filename)
    }

    async fn remove(&self, filename: &str) -> Result<(), MediaError> {
        tokio::fs::remove_file(self.dir.join(filename))
            .await
            .map_err(|e| MediaError::Remove(e.to_string()))
    }

    fn url_for(&self, filename: &str) -> String {
        format!("{}/{}", self.public_base, filename)
    }
}

/// In-memory store, used by tests
#[derive(Default)]
pub struct MemoryMediaStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.files.lock().is_ok_and(|f| f.contains_key(filename))
    }

    pub fn len(&self) -> usize {
        self.files.lock().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn store(&self, data: &[u8]) -> Result<String, MediaError> {
        let encoded = encode_jpeg(data)?;
        let filename = new_filename();
        self.files
            .lock()
            .map_err(|_| MediaError::Store("store poisoned".to_string()))?
            .insert(filename.clone(), encoded);
        Ok(filename)
    }

    async fn remove(&self, filename: &str) -> Result<(), MediaError> {
        let removed = self
            .files
            .lock()
            .map_err(|_| MediaError::Remove("store poisoned".to_string()))?
            .remove(filename);
        if removed.is_none() {
            return Err(MediaError::Remove(format!("no such file: {filename}")));
        }
        Ok(())
    }

    fn url_for(&self, filename: &str) -> String {
        format!("/uploads/{filename}")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Smallest valid image the codecs will take: 1x1 PNG
    pub(crate) fn tiny_png() -> Vec<u8> {
        let img = image::RgbImage::new(1, 1);
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn stores_reencode_to_jpeg() {
        let store = MemoryMediaStore::new();
        let filename = store.store(&tiny_png()).await.unwrap();
        assert!(filename.ends_with(".jpg"));
        assert!(store.contains(&filename));
        assert_eq!(store.url_for(&filename), format!("/uploads/{filename}"));
    }

    #[tokio::test]
    async fn garbage_bytes_are_rejected() {
        let store = MemoryMediaStore::new();
        let err = store.store(b"not an image").await.unwrap_err();
        assert!(matches!(err, MediaError::Decode(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn remove_quietly_never_fails() {
        let store = MemoryMediaStore::new();
        remove_quietly(&store, "missing.jpg").await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn fs_store_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(
            dir.path().to_path_buf(),
            "http://localhost:8080/uploads/".to_string(),
        );

        let filename = store.store(&tiny_png()).await.unwrap();
        assert!(dir.path().join(&filename).exists());
        assert_eq!(
            store.url_for(&filename),
            format!("http://localhost:8080/uploads/{filename}")
        );

        store.remove(&filename).await.unwrap();
        assert!(!dir.path().join(&filename).exists());
    }
}
