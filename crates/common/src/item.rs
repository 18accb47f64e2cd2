//! Inventory rows and the editable field set shared by add, bulk-add and edit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::lifecycle::parse_iso_date;

/// Quantity used when a bulk row or recipe ingredient does not supply one.
pub const DEFAULT_QUANTITY: i64 = 1;

/// Category used when a bulk row or recipe ingredient does not supply one.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Location used when a bulk row or recipe ingredient does not supply one.
pub const DEFAULT_LOCATION: &str = "Fridge";

// -----------------------------------------------------------------------------
// Errors
// -----------------------------------------------------------------------------

/// Rejected form input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Quantity must be a whole number, got {0:?}")]
    InvalidQuantity(String),

    #[error("Expiration date must look like YYYY-MM-DD, got {0:?}")]
    InvalidDate(String),

    #[error("Unknown item status: {0}")]
    UnknownStatus(String),
}

// -----------------------------------------------------------------------------
// Status
// -----------------------------------------------------------------------------

/// Which list an item currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// On hand.
    #[default]
    Fridge,
    /// Needs to be bought.
    ShoppingList,
}

impl ItemStatus {
    /// Column value stored in `fridge_items.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Fridge => "fridge",
            ItemStatus::ShoppingList => "shopping_list",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fridge" => Ok(ItemStatus::Fridge),
            "shopping_list" => Ok(ItemStatus::ShoppingList),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

// -----------------------------------------------------------------------------
// Items
// -----------------------------------------------------------------------------

/// A stored inventory row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    pub category: String,
    /// ISO `YYYY-MM-DD`. Rows written by older versions may hold anything.
    pub expiration: String,
    pub location: String,
    pub status: ItemStatus,
    pub price: Option<f64>,
    pub store: Option<String>,
}

impl InventoryItem {
    /// The editable part of this row.
    pub fn fields(&self) -> ItemFields {
        ItemFields {
            name: self.name.clone(),
            quantity: self.quantity,
            category: self.category.clone(),
            expiration: self.expiration.clone(),
            location: self.location.clone(),
            price: self.price,
            store: self.store.clone(),
        }
    }
}

/// Every editable column of an item. Edits always replace all of them together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    pub name: String,
    pub quantity: i64,
    pub category: String,
    pub expiration: String,
    pub location: String,
    pub price: Option<f64>,
    pub store: Option<String>,
}

impl ItemFields {
    /// Validate the raw inputs of the add and edit forms.
    ///
    /// Price and store never fail: unparsable prices and blank stores become `None`.
    pub fn from_form(
        name: &str,
        quantity: &str,
        category: &str,
        expiration: &str,
        location: &str,
        price: Option<&str>,
        store: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let name = required("Name", name)?;
        let quantity = parse_quantity(required("Quantity", quantity)?)?;
        let category = required("Category", category)?;
        let raw_expiration = required("Expiration date", expiration)?;
        let expiration = parse_iso_date(raw_expiration)
            .ok_or_else(|| ValidationError::InvalidDate(raw_expiration.to_string()))?;
        let location = required("Location", location)?;

        Ok(Self {
            name: name.to_string(),
            quantity,
            category: category.to_string(),
            expiration: expiration.format("%Y-%m-%d").to_string(),
            location: location.to_string(),
            price: parse_price(price),
            store: parse_store(store),
        })
    }

    /// A shopping-list entry for a recipe ingredient, filled with defaults.
    pub fn placeholder(name: &str, expiration: NaiveDate) -> Self {
        Self {
            name: name.trim().to_string(),
            quantity: DEFAULT_QUANTITY,
            category: DEFAULT_CATEGORY.to_string(),
            expiration: expiration.format("%Y-%m-%d").to_string(),
            location: DEFAULT_LOCATION.to_string(),
            price: None,
            store: None,
        }
    }

    /// Price and store to log, when both are present and the item is named.
    pub fn price_observation(&self) -> Option<(f64, &str)> {
        match (self.price, self.store.as_deref()) {
            (Some(price), Some(store)) if !self.name.is_empty() => Some((price, store)),
            _ => None,
        }
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(value)
    }
}

fn parse_quantity(raw: &str) -> Result<i64, ValidationError> {
    match raw.parse::<i64>() {
        Ok(quantity) if quantity >= 0 => Ok(quantity),
        _ => Err(ValidationError::InvalidQuantity(raw.to_string())),
    }
}

/// Parse an optional price field. Blank, unparsable and non-finite input is `None`.
pub fn parse_price(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|price| price.is_finite())
}

/// Parse an optional store field. Blank input is `None`.
pub fn parse_store(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_column_value() {
        assert_eq!("fridge".parse::<ItemStatus>(), Ok(ItemStatus::Fridge));
        assert_eq!("shopping_list".parse::<ItemStatus>(), Ok(ItemStatus::ShoppingList));
        assert_eq!(ItemStatus::ShoppingList.to_string(), "shopping_list");
        assert!("pantry".parse::<ItemStatus>().is_err());
        assert_eq!(ItemStatus::default(), ItemStatus::Fridge);
    }

    #[test]
    fn test_price_parsing_is_lenient() {
        assert_eq!(parse_price(Some("4.50")), Some(4.5));
        assert_eq!(parse_price(Some("  3 ")), Some(3.0));
        assert_eq!(parse_price(Some("")), None);
        assert_eq!(parse_price(Some("four")), None);
        assert_eq!(parse_price(Some("NaN")), None);
        assert_eq!(parse_price(None), None);
    }

    #[test]
    fn test_blank_store_is_absent() {
        assert_eq!(parse_store(Some("   ")), None);
        assert_eq!(parse_store(Some(" Acme ")), Some("Acme".to_string()));
        assert_eq!(parse_store(None), None);
    }

    #[test]
    fn test_from_form_validates_required_fields() {
        let fields = ItemFields::from_form(
            " Milk ", "1", "Dairy", "2026-10-22", "Fridge", Some("4.50"), Some("Acme"),
        )
        .unwrap();
        assert_eq!(fields.name, "Milk");
        assert_eq!(fields.quantity, 1);
        assert_eq!(fields.expiration, "2026-10-22");
        assert_eq!(fields.price_observation(), Some((4.5, "Acme")));

        let err = ItemFields::from_form("", "1", "Dairy", "2026-10-22", "Fridge", None, None);
        assert_eq!(err, Err(ValidationError::MissingField("Name")));

        let err = ItemFields::from_form("Milk", "two", "Dairy", "2026-10-22", "Fridge", None, None);
        assert_eq!(err, Err(ValidationError::InvalidQuantity("two".into())));

        let err = ItemFields::from_form("Milk", "1", "Dairy", "22/10/2026", "Fridge", None, None);
        assert_eq!(err, Err(ValidationError::InvalidDate("22/10/2026".into())));
    }

    #[test]
    fn test_unparsable_price_does_not_reject_the_form() {
        let fields =
            ItemFields::from_form("Bread", "2", "Bakery", "2026-10-20", "Counter", Some("cheap"), Some(""))
                .unwrap();
        assert_eq!(fields.price, None);
        assert_eq!(fields.store, None);
        assert_eq!(fields.price_observation(), None);
    }

    #[test]
    fn test_placeholder_uses_defaults() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 26).unwrap();
        let fields = ItemFields::placeholder(" basil ", date);
        assert_eq!(fields.name, "basil");
        assert_eq!(fields.quantity, DEFAULT_QUANTITY);
        assert_eq!(fields.category, DEFAULT_CATEGORY);
        assert_eq!(fields.location, DEFAULT_LOCATION);
        assert_eq!(fields.expiration, "2026-10-26");
    }
}
