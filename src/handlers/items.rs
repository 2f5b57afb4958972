use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::{Item, ItemId, ItemsList, NewItem};
use crate::middleware::ItemForm;
use crate::{ItemsError, server::router::ItemsState};

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddItemResponse {
    pub message: String,
    pub id: ItemId,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
}

/// GET / -> liveness greeting.
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello, world!".to_string(),
    })
}

/// GET /items
pub async fn list_items(State(state): State<ItemsState>) -> Result<Json<ItemsList>, ItemsError> {
    let items = state.store.list_items().await?;
    Ok(Json(items.into()))
}

/// POST /items -> stores the image under its content hash, then records the item.
pub async fn add_item(
    State(state): State<ItemsState>,
    form: ItemForm,
) -> Result<Json<AddItemResponse>, ItemsError> {
    info!(name = %form.name, category = %form.category, "Receive item");

    // Not removed if the insert below fails: names are content hashes, so
    // the file may already back another item.
    let image_filename = state.images.save(&form.image).await?;
    let id = state
        .store
        .add_item(NewItem::new(
            form.name.clone(),
            form.category,
            image_filename,
        ))
        .await?;

    info!(item_id = id, "item stored");
    Ok(Json(AddItemResponse {
        message: format!("item received: {}", form.name),
        id,
    }))
}

/// GET /items/{item_id}
pub async fn get_item(
    State(state): State<ItemsState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Item>, ItemsError> {
    let item_id: ItemId = raw_id
        .parse()
        .map_err(|_| ItemsError::InvalidItemId(raw_id.clone()))?;
    Ok(Json(state.store.get_item(item_id).await?))
}

/// GET /search?keyword=...
pub async fn search_items(
    State(state): State<ItemsState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ItemsList>, ItemsError> {
    let items = state.store.search_items(&query.keyword).await?;
    Ok(Json(items.into()))
}
