// =============================================================================
// Larder Backend - SQLite Store
// =============================================================================

use async_trait::async_trait;
use larder_common::{InventoryItem, ItemFields, ItemStatus, NewPriceRecord, PriceRecord};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, Transaction};
use std::str::FromStr;
use tracing::{debug, info};

use super::{ItemRow, PriceRow, Store, StoreResult, StoreTx};

const ITEM_COLUMNS: &str = "id, name, quantity, category, expiration, location, status, price, store";

/// SQLite-backed store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open a pool, creating the database file when it does not exist.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections.max(1));
        if url.contains(":memory:") {
            // The database only lives as long as a connection does.
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database on a single connection.
    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect("sqlite::memory:", 1).await
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteTx { tx }))
    }

    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fridge_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                category TEXT NOT NULL,
                expiration TEXT NOT NULL,
                location TEXT NOT NULL,
                status TEXT DEFAULT 'fridge',
                price REAL,
                store TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Tables created before these columns existed
        let existing: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('fridge_items')")
                .fetch_all(&self.pool)
                .await?;
        for (column, definition) in [
            ("status", "status TEXT DEFAULT 'fridge'"),
            ("price", "price REAL"),
            ("store", "store TEXT"),
        ] {
            if existing.iter().any(|name| name == column) {
                continue;
            }
            let statement = format!("ALTER TABLE fridge_items ADD COLUMN {}", definition);
            sqlx::query(&statement).execute(&self.pool).await?;
            info!("Database migrated: added column {}", column);
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS price_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_name TEXT NOT NULL,
                store TEXT,
                price REAL NOT NULL,
                date_recorded TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_fridge_items_status ON fridge_items(status)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_price_history_series ON price_history(item_name, store)",
        )
        .execute(&self.pool)
        .await?;

        info!("SQLite migrations complete");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

struct SqliteTx {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl StoreTx for SqliteTx {
    async fn create_item(&mut self, fields: &ItemFields, status: ItemStatus) -> StoreResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO fridge_items (name, quantity, category, expiration, location, status, price, store)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&fields.name)
        .bind(fields.quantity)
        .bind(&fields.category)
        .bind(&fields.expiration)
        .bind(&fields.location)
        .bind(status.as_str())
        .bind(fields.price)
        .bind(&fields.store)
        .execute(&mut *self.tx)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, name = %fields.name, %status, "Item created");
        Ok(id)
    }

    async fn get_item(&mut self, id: i64) -> StoreResult<Option<InventoryItem>> {
        let sql = format!("SELECT {} FROM fridge_items WHERE id = ?", ITEM_COLUMNS);
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_items(&mut self, status: ItemStatus) -> StoreResult<Vec<InventoryItem>> {
        let order = match status {
            ItemStatus::Fridge => "expiration ASC, id ASC",
            ItemStatus::ShoppingList => "name COLLATE NOCASE ASC, id ASC",
        };
        // NULL status predates the column and means fridge.
        let sql = format!(
            "SELECT {} FROM fridge_items WHERE COALESCE(status, 'fridge') = ? ORDER BY {}",
            ITEM_COLUMNS, order
        );
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(status.as_str())
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_item(&mut self, id: i64, fields: &ItemFields) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE fridge_items
            SET name = ?, quantity = ?, category = ?, expiration = ?,
                location = ?, price = ?, store = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.name)
        .bind(fields.quantity)
        .bind(&fields.category)
        .bind(&fields.expiration)
        .bind(&fields.location)
        .bind(fields.price)
        .bind(&fields.store)
        .bind(id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_status(&mut self, id: i64, status: ItemStatus) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE fridge_items SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn restock_item(&mut self, id: i64, expiration: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE fridge_items SET status = 'fridge', expiration = ? WHERE id = ?")
            .bind(expiration)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_item(&mut self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM fridge_items WHERE id = ?")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_item_by_name(&mut self, name: &str, status: ItemStatus) -> StoreResult<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM fridge_items WHERE name = ? AND COALESCE(status, 'fridge') = ? LIMIT 1",
        )
        .bind(name)
        .bind(status.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn append_price(&mut self, record: &NewPriceRecord) -> StoreResult<()> {
        sqlx::query("INSERT INTO price_history (item_name, store, price, date_recorded) VALUES (?, ?, ?, ?)")
            .bind(&record.item_name)
            .bind(&record.store)
            .bind(record.price)
            .bind(record.date_text())
            .execute(&mut *self.tx)
            .await?;
        debug!(item = %record.item_name, store = %record.store, price = record.price, "Price recorded");
        Ok(())
    }

    async fn price_series(&mut self, item_name: &str, store: &str) -> StoreResult<Vec<PriceRecord>> {
        let rows = sqlx::query_as::<_, PriceRow>(
            r#"
            SELECT id, item_name, store, price, date_recorded
            FROM price_history
            WHERE item_name = ? AND store = ?
            ORDER BY date_recorded DESC, id DESC
            "#,
        )
        .bind(item_name)
        .bind(store)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn distinct_price_pairs(&mut self) -> StoreResult<Vec<(String, String)>> {
        let pairs = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT DISTINCT item_name, store
            FROM price_history
            WHERE store IS NOT NULL
            ORDER BY item_name, store
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(pairs)
    }

    async fn price_history(&mut self) -> StoreResult<Vec<PriceRecord>> {
        let rows = sqlx::query_as::<_, PriceRow>(
            r#"
            SELECT id, item_name, store, price, date_recorded
            FROM price_history
            ORDER BY date_recorded DESC, id DESC
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
