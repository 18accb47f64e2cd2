// =============================================================================
// Larder Backend - Inventory Operations
// =============================================================================
// One method per user-facing operation. Each opens a single transaction,
// does all of its reads and writes inside it and commits once, so a request
// either lands completely or not at all.
// =============================================================================

use chrono::{Duration, NaiveDate};
use larder_common::{
    days_left, summarize, Freshness, InventoryItem, ItemFields, ItemStatus, NewPriceRecord,
    PriceRecord, PriceSummary,
};
use serde::Serialize;
use tracing::info;

use crate::config::{PurchasePolicy, SHELF_DAYS_RANGE};
use crate::recipes::ingredient_query;
use crate::store::{BoxedStore, StoreResult, StoreTx};

/// A fridge item with its derived expiration fields.
#[derive(Debug, Clone, Serialize)]
pub struct ListedItem {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub days_left: i64,
    pub freshness: Freshness,
}

/// Everything the price history page shows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PriceOverview {
    /// Every record, newest first.
    pub history: Vec<PriceRecord>,
    /// One entry per `(item_name, store)`, ordered by item name then store.
    pub summaries: Vec<PriceSummary>,
}

/// Result of marking a shopping-list item as purchased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purchase {
    Removed,
    Restocked,
    NotFound,
}

#[derive(Clone)]
pub struct Inventory {
    store: BoxedStore,
    purchase_policy: PurchasePolicy,
    shelf_days: i64,
}

impl Inventory {
    /// `shelf_days` is clamped into [`SHELF_DAYS_RANGE`].
    pub fn new(store: BoxedStore, purchase_policy: PurchasePolicy, shelf_days: i64) -> Self {
        Self {
            store,
            purchase_policy,
            shelf_days: shelf_days.clamp(*SHELF_DAYS_RANGE.start(), *SHELF_DAYS_RANGE.end()),
        }
    }

    /// Expiration assigned when none is given: `today` plus the configured shelf life.
    pub fn default_expiration(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(self.shelf_days)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Items on hand, soonest-expiring first.
    pub async fn fridge_items(&self, today: NaiveDate) -> StoreResult<Vec<ListedItem>> {
        let mut tx = self.store.begin().await?;
        let items = tx.list_items(ItemStatus::Fridge).await?;
        tx.commit().await?;

        Ok(items
            .into_iter()
            .map(|item| ListedItem {
                days_left: days_left(&item.expiration, today),
                freshness: Freshness::of(&item.expiration, today),
                item,
            })
            .collect())
    }

    pub async fn shopping_list(&self) -> StoreResult<Vec<InventoryItem>> {
        let mut tx = self.store.begin().await?;
        let items = tx.list_items(ItemStatus::ShoppingList).await?;
        tx.commit().await?;
        Ok(items)
    }

    pub async fn item(&self, id: i64) -> StoreResult<Option<InventoryItem>> {
        let mut tx = self.store.begin().await?;
        let item = tx.get_item(id).await?;
        tx.commit().await?;
        Ok(item)
    }

    /// Names of everything in the fridge, ready to send to the recipe search.
    pub async fn recipe_ingredients(&self) -> StoreResult<Vec<String>> {
        let mut tx = self.store.begin().await?;
        let items = tx.list_items(ItemStatus::Fridge).await?;
        tx.commit().await?;
        Ok(ingredient_query(items.iter().map(|i| i.name.as_str())))
    }

    pub async fn price_overview(&self) -> StoreResult<PriceOverview> {
        let mut tx = self.store.begin().await?;
        let history = tx.price_history().await?;
        let mut summaries = Vec::new();
        for (item_name, store) in tx.distinct_price_pairs().await? {
            let series = tx.price_series(&item_name, &store).await?;
            summaries.extend(summarize(&item_name, &store, series));
        }
        tx.commit().await?;
        Ok(PriceOverview { history, summaries })
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Add one fridge item, logging its price when it has one.
    pub async fn add_item(&self, fields: &ItemFields, today: NaiveDate) -> StoreResult<i64> {
        let mut tx = self.store.begin().await?;
        let id = tx.create_item(fields, ItemStatus::Fridge).await?;
        record_price(tx.as_mut(), fields, today).await?;
        tx.commit().await?;

        info!(id, name = %fields.name, "Item added");
        Ok(id)
    }

    /// Add several fridge items in one transaction. Returns how many were added.
    pub async fn bulk_add(&self, items: &[ItemFields], today: NaiveDate) -> StoreResult<usize> {
        let mut tx = self.store.begin().await?;
        for fields in items {
            tx.create_item(fields, ItemStatus::Fridge).await?;
            record_price(tx.as_mut(), fields, today).await?;
        }
        tx.commit().await?;

        info!(count = items.len(), "Items bulk added");
        Ok(items.len())
    }

    /// Replace every editable field of an item. Returns `false` when it does not exist.
    ///
    /// A price is logged only when it differs from the price stored on the row before the edit.
    pub async fn edit_item(&self, id: i64, fields: &ItemFields, today: NaiveDate) -> StoreResult<bool> {
        let mut tx = self.store.begin().await?;
        let Some(previous) = tx.get_item(id).await? else {
            return Ok(false);
        };

        tx.update_item(id, fields).await?;
        if previous.price != fields.price {
            record_price(tx.as_mut(), fields, today).await?;
        }
        tx.commit().await?;

        info!(id, name = %fields.name, "Item updated");
        Ok(true)
    }

    /// Delete an item. Deleting a missing id is not an error.
    pub async fn delete_item(&self, id: i64) -> StoreResult<bool> {
        let mut tx = self.store.begin().await?;
        let deleted = tx.delete_item(id).await?;
        tx.commit().await?;

        info!(id, deleted, "Item delete requested");
        Ok(deleted)
    }

    pub async fn move_to_shopping_list(&self, id: i64) -> StoreResult<bool> {
        let mut tx = self.store.begin().await?;
        let moved = tx.set_status(id, ItemStatus::ShoppingList).await?;
        tx.commit().await?;
        Ok(moved)
    }

    /// Take an item off the shopping list according to the purchase policy.
    pub async fn mark_purchased(&self, id: i64, today: NaiveDate) -> StoreResult<Purchase> {
        let mut tx = self.store.begin().await?;
        let outcome = match self.purchase_policy {
            PurchasePolicy::Remove => {
                if tx.delete_item(id).await? {
                    Purchase::Removed
                } else {
                    Purchase::NotFound
                }
            }
            PurchasePolicy::Restock => {
                let expiration = self.default_expiration(today).format("%Y-%m-%d").to_string();
                if tx.restock_item(id, &expiration).await? {
                    Purchase::Restocked
                } else {
                    Purchase::NotFound
                }
            }
        };
        tx.commit().await?;

        info!(id, ?outcome, "Item purchased");
        Ok(outcome)
    }

    /// Put recipe ingredients on the shopping list, skipping names already there.
    /// Returns how many were added.
    pub async fn add_missing_ingredients(&self, names: &[String], today: NaiveDate) -> StoreResult<usize> {
        let expiration = self.default_expiration(today);
        let mut added = 0;

        let mut tx = self.store.begin().await?;
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            if tx.find_item_by_name(name, ItemStatus::ShoppingList).await?.is_some() {
                continue;
            }
            tx.create_item(&ItemFields::placeholder(name, expiration), ItemStatus::ShoppingList)
                .await?;
            added += 1;
        }
        tx.commit().await?;

        info!(added, requested = names.len(), "Recipe ingredients added to shopping list");
        Ok(added)
    }
}

async fn record_price(tx: &mut dyn StoreTx, fields: &ItemFields, today: NaiveDate) -> StoreResult<()> {
    if let Some((price, store)) = fields.price_observation() {
        tx.append_price(&NewPriceRecord::new(&fields.name, store, price, today))
            .await?;
    }
    Ok(())
}
