use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type ItemId = i64;

/// An item joined with the name of its category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category_name: String,
    pub image_filename: String,
}

/// Input for a new item. The category is referenced by name and created on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub category_name: String,
    pub image_filename: String,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        category_name: impl Into<String>,
        image_filename: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category_name: category_name.into(),
            image_filename: image_filename.into(),
        }
    }
}

/// Wire shape for list and search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ItemsList {
    pub items: Vec<Item>,
}

impl From<Vec<Item>> for ItemsList {
    fn from(items: Vec<Item>) -> Self {
        Self { items }
    }
}
