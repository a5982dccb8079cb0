//! Uploaded media storage.
//!
//! Files are written one subdirectory per kind of upload, under a fresh UUID
//! name that keeps the original extension. Product images and store logos go
//! below the public media root, which `/media/<path>` serves back. Store
//! verification documents go below the private root, which nothing serves.
//! The stored path is relative to its root and is what the database records.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Extensions accepted for uploaded images.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Errors that can occur when storing an upload.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The file is not one of the accepted image types.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// The upload has no content.
    #[error("uploaded file is empty")]
    Empty,

    /// Writing to disk failed.
    #[error("media storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// What an upload is for; decides its subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    ProductImage,
    StoreLogo,
    StoreVerification,
}

impl MediaKind {
    /// Subdirectory below the media root.
    #[must_use]
    pub const fn dir(self) -> &'static str {
        match self {
            Self::ProductImage => "product_images",
            Self::StoreLogo => "store_logo",
            Self::StoreVerification => "store",
        }
    }

    /// Whether files of this kind may be served to anyone.
    #[must_use]
    pub const fn is_public(self) -> bool {
        !matches!(self, Self::StoreVerification)
    }

    /// The kind a stored relative path was written for.
    fn of_path(relative: &str) -> Option<Self> {
        let dir = relative.split('/').next()?;
        [Self::ProductImage, Self::StoreLogo, Self::StoreVerification]
            .into_iter()
            .find(|kind| kind.dir() == dir)
    }
}

/// A file received in a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Browsers send an empty, unnamed part for a file input left blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.file_name.is_empty() && self.bytes.is_empty()
    }
}

/// Filesystem store for uploaded images.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    private_root: PathBuf,
}

impl MediaStore {
    /// Create a store over a public and a private root. Directories are
    /// created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, private_root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            private_root: private_root.into(),
        }
    }

    /// The publicly served media root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where files of `kind` are written.
    #[must_use]
    pub fn root_for(&self, kind: MediaKind) -> &Path {
        if kind.is_public() {
            &self.root
        } else {
            &self.private_root
        }
    }

    /// Absolute location of a stored relative path.
    fn locate(&self, relative: &str) -> PathBuf {
        MediaKind::of_path(relative)
            .map_or(self.root.as_path(), |kind| self.root_for(kind))
            .join(relative)
    }

    /// Write an upload and return its path relative to its root.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Empty` for an empty file,
    /// `MediaError::UnsupportedType` for a non-image extension, and
    /// `MediaError::Io` if the file cannot be written.
    pub async fn save(&self, kind: MediaKind, upload: &Upload) -> Result<String, MediaError> {
        if upload.bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        let extension = allowed_extension(&upload.file_name)?;

        let dir = self.root_for(kind).join(kind.dir());
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{extension}", Uuid::new_v4());
        tokio::fs::write(dir.join(&file_name), &upload.bytes).await?;

        let relative = format!("{}/{file_name}", kind.dir());
        tracing::debug!(path = %relative, size = upload.bytes.len(), "Stored upload");
        Ok(relative)
    }

    /// Delete a previously stored file. Missing files are ignored.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Io` for failures other than the file being absent.
    pub async fn remove(&self, relative: &str) -> Result<(), MediaError> {
        match tokio::fs::remove_file(self.locate(relative)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort cleanup of files written for a request that then failed.
    pub async fn discard(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.remove(path).await {
                tracing::warn!(path = %path, error = %e, "Failed to remove orphaned upload");
            }
        }
    }
}

/// Lower-cased extension of `file_name` if it is an accepted image type.
fn allowed_extension(file_name: &str) -> Result<String, MediaError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(MediaError::UnsupportedType(file_name.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> MediaStore {
        let base = std::env::temp_dir().join(format!("grabit-media-{}", Uuid::new_v4()));
        MediaStore::new(base.join("public"), base.join("private"))
    }

    fn upload(name: &str, bytes: &[u8]) -> Upload {
        Upload {
            file_name: name.to_owned(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_allowed_extensions() {
        assert_eq!(allowed_extension("photo.JPG").unwrap(), "jpg");
        assert_eq!(allowed_extension("a.b.webp").unwrap(), "webp");
        assert!(matches!(
            allowed_extension("script.php"),
            Err(MediaError::UnsupportedType(_))
        ));
        assert!(allowed_extension("no_extension").is_err());
        assert!(allowed_extension(".png").is_err());
    }

    #[test]
    fn test_blank_upload() {
        assert!(upload("", b"").is_blank());
        assert!(!upload("a.png", b"").is_blank());
    }

    #[tokio::test]
    async fn test_save_writes_under_kind_directory() {
        let store = temp_store();
        let path = store
            .save(MediaKind::ProductImage, &upload("kettle.png", b"\x89PNG"))
            .await
            .unwrap();

        assert!(path.starts_with("product_images/"));
        assert!(path.ends_with(".png"));
        let written = tokio::fs::read(store.root().join(&path)).await.unwrap();
        assert_eq!(written, b"\x89PNG");

        store.remove(&path).await.unwrap();
        assert!(!store.root().join(&path).exists());
        // Removing again is not an error
        store.remove(&path).await.unwrap();

        tokio::fs::remove_dir_all(store.root()).await.unwrap();
    }

    #[tokio::test]
    async fn test_verification_documents_stay_out_of_public_root() {
        let store = temp_store();
        let path = store
            .save(MediaKind::StoreVerification, &upload("id.jpg", b"\xFF\xD8"))
            .await
            .unwrap();

        assert!(path.starts_with("store/"));
        assert!(!store.root().join(&path).exists());
        let private = store.root_for(MediaKind::StoreVerification).join(&path);
        assert!(private.exists());

        store.discard(std::slice::from_ref(&path)).await;
        assert!(!private.exists());

        tokio::fs::remove_dir_all(store.root_for(MediaKind::StoreVerification))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_logos_stay_public() {
        let store = temp_store();
        let path = store
            .save(MediaKind::StoreLogo, &upload("logo.png", b"\x89PNG"))
            .await
            .unwrap();
        assert!(store.root().join(&path).exists());
        tokio::fs::remove_dir_all(store.root()).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_empty_file() {
        let store = temp_store();
        let err = store
            .save(MediaKind::StoreLogo, &upload("logo.png", b""))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Empty));
        assert!(!store.root().exists());
    }

    #[test]
    fn test_kind_directories() {
        assert_eq!(MediaKind::ProductImage.dir(), "product_images");
        assert_eq!(MediaKind::StoreLogo.dir(), "store_logo");
        assert_eq!(MediaKind::StoreVerification.dir(), "store");
        assert!(MediaKind::ProductImage.is_public());
        assert!(!MediaKind::StoreVerification.is_public());
        assert_eq!(
            MediaKind::of_path("store/abc.png"),
            Some(MediaKind::StoreVerification)
        );
        assert_eq!(MediaKind::of_path("store_logo/abc.png"), Some(MediaKind::StoreLogo));
    }
}
