// =============================================================================
// Larder Backend - PostgreSQL Store
// =============================================================================
// Older deployments created `id SERIAL`, `quantity INTEGER` and `price REAL`
// columns, so every SELECT casts to the widths the row types expect.
// =============================================================================

use async_trait::async_trait;
use larder_common::{InventoryItem, ItemFields, ItemStatus, NewPriceRecord, PriceRecord};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres, Transaction};
use std::str::FromStr;
use tracing::{debug, info};

use super::{ItemRow, PriceRow, Store, StoreResult, StoreTx};

const ITEM_COLUMNS: &str = "id::BIGINT AS id, name, quantity::BIGINT AS quantity, category, \
     expiration, location, status, price::DOUBLE PRECISION AS price, store";

const PRICE_COLUMNS: &str = "id::BIGINT AS id, item_name, store, \
     price::DOUBLE PRECISION AS price, date_recorded";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        Self::connect_with(PgConnectOptions::from_str(url)?, max_connections).await
    }

    pub async fn connect_with(options: PgConnectOptions, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTx { tx }))
    }

    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fridge_items (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                quantity BIGINT NOT NULL,
                category TEXT NOT NULL,
                expiration TEXT NOT NULL,
                location TEXT NOT NULL,
                status TEXT DEFAULT 'fridge',
                price DOUBLE PRECISION,
                store TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for column in [
            "status TEXT DEFAULT 'fridge'",
            "price DOUBLE PRECISION",
            "store TEXT",
        ] {
            let statement = format!("ALTER TABLE fridge_items ADD COLUMN IF NOT EXISTS {}", column);
            sqlx::query(&statement).execute(&self.pool).await?;
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS price_history (
                id BIGSERIAL PRIMARY KEY,
                item_name TEXT NOT NULL,
                store TEXT,
                price DOUBLE PRECISION NOT NULL,
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

        info!("PostgreSQL migrations complete");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PostgresTx {
    async fn create_item(&mut self, fields: &ItemFields, status: ItemStatus) -> StoreResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO fridge_items (name, quantity, category, expiration, location, status, price, store)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id::BIGINT
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
        .fetch_one(&mut *self.tx)
        .await?;

        debug!(id, name = %fields.name, %status, "Item created");
        Ok(id)
    }

    async fn get_item(&mut self, id: i64) -> StoreResult<Option<InventoryItem>> {
        let sql = format!("SELECT {} FROM fridge_items WHERE id = $1", ITEM_COLUMNS);
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_items(&mut self, status: ItemStatus) -> StoreResult<Vec<InventoryItem>> {
        let order = match status {
            ItemStatus::Fridge => "expiration ASC, id ASC",
            ItemStatus::ShoppingList => "LOWER(name) ASC, id ASC",
        };
        let sql = format!(
            "SELECT {} FROM fridge_items WHERE COALESCE(status, 'fridge') = $1 ORDER BY {}",
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
            SET name = $1, quantity = $2, category = $3, expiration = $4,
                location = $5, price = $6, store = $7
            WHERE id = $8
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
        let result = sqlx::query("UPDATE fridge_items SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn restock_item(&mut self, id: i64, expiration: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE fridge_items SET status = 'fridge', expiration = $1 WHERE id = $2")
            .bind(expiration)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_item(&mut self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM fridge_items WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_item_by_name(&mut self, name: &str, status: ItemStatus) -> StoreResult<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT id::BIGINT FROM fridge_items WHERE name = $1 AND COALESCE(status, 'fridge') = $2 LIMIT 1",
        )
        .bind(name)
        .bind(status.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn append_price(&mut self, record: &NewPriceRecord) -> StoreResult<()> {
        sqlx::query("INSERT INTO price_history (item_name, store, price, date_recorded) VALUES ($1, $2, $3, $4)")
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
        let sql = format!(
            "SELECT {} FROM price_history WHERE item_name = $1 AND store = $2 \
             ORDER BY date_recorded DESC, id DESC",
            PRICE_COLUMNS
        );
        let rows = sqlx::query_as::<_, PriceRow>(&sql)
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
        let sql = format!(
            "SELECT {} FROM price_history ORDER BY date_recorded DESC, id DESC",
            PRICE_COLUMNS
        );
        let rows = sqlx::query_as::<_, PriceRow>(&sql)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
