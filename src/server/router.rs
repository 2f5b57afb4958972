use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::ItemStore;
use crate::handlers::{image, items};
use crate::service::ImageStore;

/// Upper bound for `POST /items` bodies, image included.
pub const ITEM_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Handles shared by every request. The store is injected, never global.
#[derive(Clone)]
pub struct ItemsState {
    pub store: Arc<dyn ItemStore>,
    pub images: ImageStore,
}

impl ItemsState {
    pub fn new(store: Arc<dyn ItemStore>, images: ImageStore) -> Self {
        Self { store, images }
    }
}

pub fn items_router(state: ItemsState) -> Router {
    Router::new()
        .route("/", get(items::root))
        .route(
            "/items",
            get(items::list_items)
                .post(items::add_item)
                .layer(DefaultBodyLimit::max(ITEM_BODY_LIMIT)),
        )
        .route("/items/{item_id}", get(items::get_item))
        .route("/search", get(items::search_items))
        .route("/image/{image_filename}", get(image::get_image))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Only the front end's origin may call the API from a browser.
pub fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([Method::GET, Method::PUT, Method::POST, Method::DELETE])
        .allow_headers(Any)
}
