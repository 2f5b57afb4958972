use crate::db::models::{Item, ItemId, NewItem};
use crate::db::schema::SQLITE_INIT;
use crate::db::store::ItemStore;
use crate::error::ItemsError;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

const SELECT_ITEMS: &str = r#"
    SELECT items.id, items.name, category.name AS category_name,
           items.image_name AS image_filename
    FROM items INNER JOIN category ON items.category_id = category.id"#;

#[derive(Clone)]
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and bootstrap the schema.
    pub async fn connect(database_url: &str) -> Result<Self, ItemsError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), ItemsError> {
        // sqlx::query runs a single statement, so split the script
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Number of category rows, mostly useful to check name uniqueness.
    pub async fn count_categories(&self) -> Result<i64, ItemsError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM category")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    /// Category upsert and item insert share one transaction; the upsert
    /// returns the id whether the row was created or already present.
    async fn add_item(&self, item: NewItem) -> Result<ItemId, ItemsError> {
        let mut tx = self.pool.begin().await?;

        let (category_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO category (name) VALUES (?)
            ON CONFLICT(name) DO UPDATE SET name = excluded.name
            RETURNING id
            "#,
        )
        .bind(&item.category_name)
        .fetch_one(&mut *tx)
        .await?;

        let id = sqlx::query("INSERT INTO items (name, category_id, image_name) VALUES (?, ?, ?)")
            .bind(&item.name)
            .bind(category_id)
            .bind(&item.image_filename)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        tx.commit().await?;
        debug!(item_id = id, category_id, "inserted item");
        Ok(id)
    }

    async fn list_items(&self) -> Result<Vec<Item>, ItemsError> {
        let rows = sqlx::query_as::<_, Item>(&format!("{SELECT_ITEMS} ORDER BY items.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn search_items(&self, keyword: &str) -> Result<Vec<Item>, ItemsError> {
        let pattern = format!("%{}%", escape_like(keyword));
        let rows = sqlx::query_as::<_, Item>(&format!(
            r"{SELECT_ITEMS} WHERE items.name LIKE ? ESCAPE '\' ORDER BY items.id"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_item(&self, id: ItemId) -> Result<Item, ItemsError> {
        sqlx::query_as::<_, Item>(&format!("{SELECT_ITEMS} WHERE items.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ItemsError::ItemNotFound(id))
    }
}

/// Escape LIKE metacharacters so the keyword matches literally.
fn escape_like(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
