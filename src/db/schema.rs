//! SQL DDL for initializing the item storage.

/// SQLite schema with:
/// - `category.name` UNIQUE, so concurrent writers converge on one row per name
/// - `items.category_id` a foreign key into `category`
/// - `items.image_name` holding the opaque image file name
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS category (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    category_id INTEGER NOT NULL REFERENCES category(id),
    image_name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_category_id ON items(category_id);
"#;
