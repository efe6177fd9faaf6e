//! Product image storage on the local filesystem.
//!
//! Files are named `{uuid}_{declared name}` and written with an exclusive
//! create, so an existing file is never overwritten: a second write to the
//! same name is rejected with a notification instead.

use std::io::ErrorKind;
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::notification::Notifications;
use crate::services::messages;

/// Name used when the client declares no usable file name.
const FALLBACK_NAME: &str = "image";

/// Longest declared name kept, in bytes. With the `{uuid}_` prefix a stored
/// name stays within the 255-byte filename limit and the `image` column.
pub const MAX_IMAGE_NAME: usize = 200;

/// Errors writing images to disk.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("image storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes product images under a fixed directory.
#[derive(Debug, Clone)]
pub struct ImageStorage {
    dir: PathBuf,
}

impl ImageStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store `bytes` under a fresh `{uuid}_{declared_name}` file name.
    ///
    /// Returns the stored file name, or `None` after notifying if the name
    /// is already taken.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory or file cannot be written.
    pub async fn store(
        &self,
        declared_name: &str,
        bytes: &[u8],
        notifications: &mut Notifications,
    ) -> Result<Option<String>, StorageError> {
        let file_name = unique_file_name(declared_name);
        let stored = self.store_as(&file_name, bytes, notifications).await?;
        Ok(stored.then_some(file_name))
    }

    /// Store `bytes` under exactly `file_name`.
    ///
    /// Returns `false` after notifying if the file already exists; the
    /// existing file is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory or file cannot be written.
    pub async fn store_as(
        &self,
        file_name: &str,
        bytes: &[u8],
        notifications: &mut Notifications,
    ) -> Result<bool, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                notifications.notify(messages::IMAGE_EXISTS);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = write_all(&mut file, bytes).await {
            drop(file);
            self.discard(file_name).await;
            return Err(e.into());
        }

        tracing::info!(file = %file_name, bytes = bytes.len(), "image stored");
        Ok(true)
    }

    /// Delete a stored image, logging instead of failing.
    pub async fn discard(&self, file_name: &str) {
        if let Err(e) = tokio::fs::remove_file(self.dir.join(file_name)).await {
            tracing::warn!(file = %file_name, error = %e, "failed to remove image");
        }
    }
}

async fn write_all(file: &mut tokio::fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

/// `{uuid}_{final path component of declared_name}`.
#[must_use]
pub fn unique_file_name(declared_name: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitize_file_name(declared_name))
}

/// Reduce a client-declared name to its final path component, keeping at
/// most the last [`MAX_IMAGE_NAME`] bytes so the extension survives.
#[must_use]
pub fn sanitize_file_name(declared_name: &str) -> String {
    let name = declared_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let mut start = name.len().saturating_sub(MAX_IMAGE_NAME);
    while !name.is_char_boundary(start) {
        start += 1;
    }
    let name = &name[start..];

    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_NAME.to_owned()
    } else {
        name.to_owned()
    }
}

/// Decode a base64 image payload, notifying when it is missing or invalid.
///
/// A `data:<mime>;base64,` prefix is accepted and ignored.
pub fn decode_image(payload: Option<&str>, notifications: &mut Notifications) -> Option<Vec<u8>> {
    let payload = payload.map(str::trim).unwrap_or_default();
    let payload = payload
        .split_once(";base64,")
        .map_or(payload, |(_, data)| data);

    if payload.is_empty() {
        notifications.notify(messages::IMAGE_REQUIRED);
        return None;
    }

    match STANDARD.decode(payload) {
        Ok(bytes) if !bytes.is_empty() => Some(bytes),
        Ok(_) => {
            notifications.notify(messages::IMAGE_REQUIRED);
            None
        }
        Err(_) => {
            notifications.notify(messages::IMAGE_INVALID);
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_final_component() {
        assert_eq!(sanitize_file_name("caneta.png"), "caneta.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\fotos\\caneta.png"), "caneta.png");
        assert_eq!(sanitize_file_name("fotos/"), FALLBACK_NAME);
        assert_eq!(sanitize_file_name(".."), FALLBACK_NAME);
    }

    #[test]
    fn test_unique_file_name_shape() {
        let name = unique_file_name("caneta.png");
        let (prefix, rest) = name.split_once('_').unwrap();
        assert!(Uuid::parse_str(prefix).is_ok());
        assert_eq!(rest, "caneta.png");
    }

    #[test]
    fn test_long_names_keep_their_tail() {
        let declared = format!("{}.png", "a".repeat(400));
        let name = unique_file_name(&declared);
        assert!(name.len() <= 255);
        assert!(name.ends_with("aaa.png"));
        assert_eq!(sanitize_file_name(&declared).len(), MAX_IMAGE_NAME);

        // Never splits a multi-byte character.
        let accented = "é".repeat(150);
        let kept = sanitize_file_name(&accented);
        assert!(kept.len() <= MAX_IMAGE_NAME);
        assert!(kept.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_decode_image() {
        let mut notifications = Notifications::new();
        assert_eq!(
            decode_image(Some("aGVsbG8="), &mut notifications),
            Some(b"hello".to_vec())
        );
        assert_eq!(
            decode_image(Some("data:image/png;base64,aGVsbG8="), &mut notifications),
            Some(b"hello".to_vec())
        );
        assert!(!notifications.has_any());

        assert_eq!(decode_image(None, &mut notifications), None);
        assert_eq!(decode_image(Some("  "), &mut notifications), None);
        assert_eq!(decode_image(Some("not base64!"), &mut notifications), None);
        assert_eq!(
            notifications.messages(),
            [
                messages::IMAGE_REQUIRED,
                messages::IMAGE_REQUIRED,
                messages::IMAGE_INVALID
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_name_keeps_first_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path().join("assets"));
        let mut notifications = Notifications::new();

        assert!(
            storage
                .store_as("x_caneta.png", b"first", &mut notifications)
                .await
                .unwrap()
        );
        assert!(
            !storage
                .store_as("x_caneta.png", b"second", &mut notifications)
                .await
                .unwrap()
        );

        assert_eq!(notifications.messages(), [messages::IMAGE_EXISTS]);
        let on_disk = std::fs::read(dir.path().join("assets/x_caneta.png")).unwrap();
        assert_eq!(on_disk, b"first");
    }

    #[tokio::test]
    async fn test_store_returns_generated_name() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path());
        let mut notifications = Notifications::new();

        let name = storage
            .store("fotos/caneta.png", b"png", &mut notifications)
            .await
            .unwrap()
            .unwrap();

        assert!(name.ends_with("_caneta.png"));
        assert_eq!(std::fs::read(dir.path().join(&name)).unwrap(), b"png");

        storage.discard(&name).await;
        assert!(!dir.path().join(&name).exists());
    }
}
