use crate::db::models::{Item, ItemId, NewItem};
use crate::error::ItemsError;
use async_trait::async_trait;

/// Storage capability shared by the SQLite and JSON-file backends.
///
/// Search matches `keyword` as a substring of the item name, ASCII
/// case-insensitively. Wildcard characters in the keyword match literally, and
/// an empty keyword matches every item.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Persist a new item, creating its category if needed. All or nothing.
    async fn add_item(&self, item: NewItem) -> Result<ItemId, ItemsError>;

    /// All items in ascending id order.
    async fn list_items(&self) -> Result<Vec<Item>, ItemsError>;

    async fn search_items(&self, keyword: &str) -> Result<Vec<Item>, ItemsError>;

    /// Fails with [`ItemsError::ItemNotFound`] when no item has this id.
    async fn get_item(&self, id: ItemId) -> Result<Item, ItemsError>;
}
