//! Flat-file backend: the whole catalogue is one JSON document.

use crate::db::models::{Item, ItemId, NewItem};
use crate::db::store::ItemStore;
use crate::error::ItemsError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ItemsFile {
    #[serde(default)]
    items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ItemRecord {
    id: ItemId,
    name: String,
    category: String,
    image_filename: String,
}

/// On-disk shape as read. Documents written by the older service carry no
/// `id`; such records are addressed by position, starting at 1.
#[derive(Debug, Default, Deserialize)]
struct StoredFile {
    #[serde(default)]
    items: Vec<StoredRecord>,
}

#[derive(Debug, Deserialize)]
struct StoredRecord {
    #[serde(default)]
    id: Option<ItemId>,
    name: String,
    category: String,
    image_filename: String,
}

impl From<StoredFile> for ItemsFile {
    fn from(stored: StoredFile) -> Self {
        let items = stored
            .items
            .into_iter()
            .enumerate()
            .map(|(index, r)| ItemRecord {
                id: r.id.unwrap_or(index as ItemId + 1),
                name: r.name,
                category: r.category,
                image_filename: r.image_filename,
            })
            .collect();
        Self { items }
    }
}

impl From<ItemRecord> for Item {
    fn from(r: ItemRecord) -> Self {
        Item {
            id: r.id,
            name: r.name,
            category_name: r.category,
            image_filename: r.image_filename,
        }
    }
}

pub struct JsonFileItemStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileItemStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<ItemsFile, ItemsError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(ItemsFile::default()),
            Ok(bytes) => Ok(serde_json::from_slice::<StoredFile>(&bytes)?.into()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ItemsFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a sibling temp file, then rename over the original.
    async fn store(&self, file: &ItemsFile) -> Result<(), ItemsError> {
        let bytes = serde_json::to_vec_pretty(file)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ItemStore for JsonFileItemStore {
    async fn add_item(&self, item: NewItem) -> Result<ItemId, ItemsError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        let id = file.items.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        file.items.push(ItemRecord {
            id,
            name: item.name,
            category: item.category_name,
            image_filename: item.image_filename,
        });
        self.store(&file).await?;
        debug!(item_id = id, path = %self.path.display(), "appended item");
        Ok(id)
    }

    async fn list_items(&self) -> Result<Vec<Item>, ItemsError> {
        let _guard = self.lock.lock().await;
        let mut items: Vec<Item> = self.load().await?.items.into_iter().map(Into::into).collect();
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    async fn search_items(&self, keyword: &str) -> Result<Vec<Item>, ItemsError> {
        let needle = keyword.to_ascii_lowercase();
        let items = self.list_items().await?;
        Ok(items
            .into_iter()
            .filter(|i| i.name.to_ascii_lowercase().contains(&needle))
            .collect())
    }

    async fn get_item(&self, id: ItemId) -> Result<Item, ItemsError> {
        let _guard = self.lock.lock().await;
        self.load()
            .await?
            .items
            .into_iter()
            .find(|r| r.id == id)
            .map(Into::into)
            .ok_or(ItemsError::ItemNotFound(id))
    }
}
