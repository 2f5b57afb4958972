use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderValue, Request, StatusCode, header},
};
use mercari_items::db::{ItemStore, JsonFileItemStore, SqliteItemStore};
use mercari_items::server::router::{ITEM_BODY_LIMIT, ItemsState, cors_layer, items_router};
use mercari_items::service::ImageStore;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "XX-items-test-boundary";

async fn sqlite_app(dir: &tempfile::TempDir) -> Router {
    let database_url = format!("sqlite:{}", dir.path().join("items.sqlite3").display());
    let store = SqliteItemStore::connect(&database_url)
        .await
        .expect("failed to open sqlite store");
    app_with(Arc::new(store), dir)
}

fn app_with(store: Arc<dyn ItemStore>, dir: &tempfile::TempDir) -> Router {
    let images = ImageStore::new(dir.path().join("images"));
    items_router(ItemsState::new(store, images))
}

fn multipart_body(fields: &[(&str, &str)], image: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"local.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn post_item(fields: &[(&str, &str)], image: Option<&[u8]>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/items")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, image)))
        .expect("failed to build request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    (status, body.to_vec())
}

async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, req).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn root_says_hello() {
    let dir = tempfile::tempdir().unwrap();
    let app = sqlite_app(&dir).await;

    let (status, body) = send_json(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hello, world!");
}

#[tokio::test]
async fn add_item_then_fetch_it() {
    let dir = tempfile::tempdir().unwrap();
    let app = sqlite_app(&dir).await;
    let image = b"\xff\xd8\xff\xe0 not really a jpeg";

    let (status, body) = send_json(
        &app,
        post_item(&[("name", "shirt"), ("category", "fashion")], Some(image.as_slice())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "item received: shirt");
    assert_eq!(body["id"], 1);

    let expected_image = ImageStore::file_name_for(image);
    assert!(dir.path().join("images").join(&expected_image).exists());

    let (status, item) = send_json(&app, get("/items/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["name"], "shirt");
    assert_eq!(item["category_name"], "fashion");
    assert_eq!(item["image_filename"], expected_image.as_str());

    let (status, list) = send_json(&app, get("/items")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["items"].as_array().map(Vec::len), Some(1));

    let (status, bytes) = send(&app, get(&format!("/image/{expected_image}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, image);
}

#[tokio::test]
async fn empty_list_is_an_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let app = sqlite_app(&dir).await;

    let (status, body) = send_json(&app, get("/items")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "items": [] }));
}

#[tokio::test]
async fn missing_item_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = sqlite_app(&dir).await;

    let (status, body) = send_json(&app, get("/items/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = send_json(&app, get("/items/not-a-number")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn oversized_item_is_413_json() {
    let dir = tempfile::tempdir().unwrap();
    let app = sqlite_app(&dir).await;
    let image = vec![b'a'; ITEM_BODY_LIMIT + 1024];

    let (status, body) = send_json(
        &app,
        post_item(&[("name", "big"), ("category", "misc")], Some(image.as_slice())),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");

    let (_, list) = send_json(&app, get("/items")).await;
    assert_eq!(list["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn add_item_requires_all_fields() {
    let dir = tempfile::tempdir().unwrap();
    let app = sqlite_app(&dir).await;

    let (status, body) = send_json(&app, post_item(&[("name", "shirt")], Some(b"img".as_slice()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("category"))
    );

    let (status, _) = send(
        &app,
        post_item(&[("name", "shirt"), ("category", "fashion")], None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = send_json(&app, get("/items")).await;
    assert_eq!(list["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn search_filters_by_keyword() {
    let dir = tempfile::tempdir().unwrap();
    let app = sqlite_app(&dir).await;

    for (name, img) in [("blue shirt", "a"), ("jeans", "b"), ("t-shirt", "c")] {
        let (status, _) = send(
            &app,
            post_item(
                &[("name", name), ("category", "fashion")],
                Some(img.as_bytes()),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send_json(&app, get("/search?keyword=shirt")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|i| i["name"].as_str())
        .collect();
    assert_eq!(names, vec!["blue shirt", "t-shirt"]);

    let (_, body) = send_json(&app, get("/search")).await;
    assert_eq!(body["items"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn image_route_validates_and_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let app = sqlite_app(&dir).await;

    let (status, body) = send_json(&app, get("/image/cat.png")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Image path does not end with .jpg");

    let (status, _) = send(&app, get("/image/missing.jpg")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let images = dir.path().join("images");
    std::fs::create_dir_all(&images).unwrap();
    std::fs::write(images.join("default.jpg"), b"placeholder").unwrap();

    let (status, bytes) = send(&app, get("/image/missing.jpg")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"placeholder");
}

#[tokio::test]
async fn json_backend_serves_the_same_routes() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileItemStore::new(dir.path().join("items.json"));
    let app = app_with(Arc::new(store), &dir);

    let (status, _) = send(
        &app,
        post_item(&[("name", "mug"), ("category", "kitchen")], Some(b"mug".as_slice())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, item) = send_json(&app, get("/items/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["category_name"], "kitchen");

    let raw = std::fs::read_to_string(dir.path().join("items.json")).unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["items"][0]["category"], "kitchen");
}

#[tokio::test]
async fn cors_allows_front_end_origin() {
    let dir = tempfile::tempdir().unwrap();
    let app = sqlite_app(&dir)
        .await
        .layer(cors_layer(HeaderValue::from_static("http://localhost:3000")));

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/items")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(preflight).await.unwrap();
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );

    let foreign = Request::builder()
        .uri("/items")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(foreign).await.unwrap();
    assert!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
