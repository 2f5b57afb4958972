use crate::error::ItemsError;
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub const IMAGE_EXT: &str = ".jpg";
pub const DEFAULT_IMAGE: &str = "default.jpg";

/// Content-addressed image directory. Files are named `<sha256 hex>.jpg`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_name_for(bytes: &[u8]) -> String {
        let digest = Sha256::digest(bytes);
        format!("{}{IMAGE_EXT}", hex::encode(digest))
    }

    /// Write `bytes` under its content hash and return the file name.
    pub async fn save(&self, bytes: &[u8]) -> Result<String, ItemsError> {
        let name = Self::file_name_for(bytes);
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), "stored image");
        Ok(name)
    }

    /// Path to serve for `name`, or the default image when it does not exist.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf, ItemsError> {
        validate_name(name)?;
        let path = self.dir.join(name);
        if tokio::fs::try_exists(&path).await? {
            return Ok(path);
        }
        debug!(path = %path.display(), "image not found, falling back to default");
        let fallback = self.dir.join(DEFAULT_IMAGE);
        if tokio::fs::try_exists(&fallback).await? {
            Ok(fallback)
        } else {
            Err(ItemsError::ImageNotFound)
        }
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, ItemsError> {
        let path = self.resolve(name).await?;
        Ok(tokio::fs::read(path).await?)
    }
}

/// A plain `*.jpg` file name with no directory parts.
fn validate_name(name: &str) -> Result<(), ItemsError> {
    let mut components = Path::new(name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if plain && !name.contains('\\') && name.ends_with(IMAGE_EXT) {
        Ok(())
    } else {
        Err(ItemsError::InvalidImageName(name.to_string()))
    }
}
