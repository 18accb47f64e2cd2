// =============================================================================
// Larder Backend - Form Payloads
// =============================================================================

use chrono::NaiveDate;
use larder_common::{
    parse_iso_date, parse_price, parse_store, ItemFields, ValidationError, DEFAULT_CATEGORY,
    DEFAULT_LOCATION, DEFAULT_QUANTITY,
};
use serde::Deserialize;
use std::collections::HashMap;

use super::ReturnTo;

/// Most rows accepted from one bulk-add submission.
pub const MAX_BULK_ROWS: usize = 50;

/// Fields of the add and edit forms. Missing fields arrive as empty strings so
/// they fail validation instead of the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub expiration_date: String,
    #[serde(default)]
    pub location: String,
    pub price: Option<String>,
    pub store: Option<String>,
    pub return_to: Option<String>,
}

impl ItemForm {
    pub fn validate(&self) -> Result<ItemFields, ValidationError> {
        ItemFields::from_form(
            &self.item_name,
            &self.quantity,
            &self.category,
            &self.expiration_date,
            &self.location,
            self.price.as_deref(),
            self.store.as_deref(),
        )
    }

    pub fn return_to(&self) -> ReturnTo {
        ReturnTo::parse(self.return_to.as_deref())
    }
}

/// Body of the single-button forms (delete, move, purchase).
#[derive(Debug, Default, Deserialize)]
pub struct ActionForm {
    pub return_to: Option<String>,
}

impl ActionForm {
    pub fn return_to(&self) -> ReturnTo {
        ReturnTo::parse(self.return_to.as_deref())
    }
}

/// A bulk-add submission claimed more rows than are accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("At most {max} items can be added at once, got {0}.", max = MAX_BULK_ROWS)]
pub struct TooManyRows(pub usize);

/// Turn a bulk-add submission into items.
///
/// Rows are numbered `0..item_count` (`item_name_0`, `quantity_0`, ...). Rows
/// with a blank name are skipped. Missing quantity, category, location and
/// expiration fall back to defaults; price and store follow the single-add rules.
/// An `item_count` above [`MAX_BULK_ROWS`] rejects the whole submission.
pub fn parse_bulk_rows(
    pairs: Vec<(String, String)>,
    default_expiration: NaiveDate,
) -> Result<Vec<ItemFields>, TooManyRows> {
    let fields: HashMap<String, String> = pairs.into_iter().collect();
    let field = |name: &str, row: usize| {
        fields
            .get(&format!("{}_{}", name, row))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };

    let count = fields
        .get("item_count")
        .and_then(|c| c.trim().parse::<usize>().ok())
        .unwrap_or(0);
    if count > MAX_BULK_ROWS {
        return Err(TooManyRows(count));
    }

    let items = (0..count)
        .filter_map(|row| {
            let name = field("item_name", row)?;
            let expiration = field("expiration", row)
                .and_then(parse_iso_date)
                .unwrap_or(default_expiration);
            Some(ItemFields {
                name: name.to_string(),
                quantity: field("quantity", row)
                    .and_then(|q| q.parse().ok())
                    .filter(|q: &i64| *q >= 0)
                    .unwrap_or(DEFAULT_QUANTITY),
                category: field("category", row).unwrap_or(DEFAULT_CATEGORY).to_string(),
                expiration: expiration.format("%Y-%m-%d").to_string(),
                location: field("location", row).unwrap_or(DEFAULT_LOCATION).to_string(),
                price: parse_price(field("price", row)),
                store: parse_store(field("store", row)),
            })
        })
        .collect();
    Ok(items)
}

/// Every `ingredients` value of a submission, in order.
pub fn ingredient_names(pairs: Vec<(String, String)>) -> Vec<String> {
    pairs
        .into_iter()
        .filter(|(key, _)| key == "ingredients")
        .map(|(_, value)| value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn default_expiration() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 26).unwrap()
    }

    #[test]
    fn test_bulk_rows_skip_blanks_and_fill_defaults() {
        let rows = parse_bulk_rows(
            pairs(&[
                ("item_count", "3"),
                ("item_name_0", "Apples"),
                ("quantity_0", "6"),
                ("category_0", "Produce"),
                ("expiration_0", "2026-11-01"),
                ("location_0", "Crisper"),
                ("price_0", "3.49"),
                ("store_0", "Acme"),
                ("item_name_1", "   "),
                ("quantity_1", "2"),
                ("item_name_2", "Butter"),
                ("quantity_2", ""),
                ("price_2", "cheap"),
            ]),
            default_expiration(),
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Apples");
        assert_eq!(rows[0].quantity, 6);
        assert_eq!(rows[0].category, "Produce");
        assert_eq!(rows[0].expiration, "2026-11-01");
        assert_eq!(rows[0].location, "Crisper");
        assert_eq!(rows[0].price_observation(), Some((3.49, "Acme")));

        assert_eq!(rows[1].name, "Butter");
        assert_eq!(rows[1].quantity, DEFAULT_QUANTITY);
        assert_eq!(rows[1].category, DEFAULT_CATEGORY);
        assert_eq!(rows[1].location, DEFAULT_LOCATION);
        assert_eq!(rows[1].expiration, "2026-10-26");
        assert_eq!(rows[1].price, None);
    }

    #[test]
    fn test_bulk_rows_beyond_count_are_ignored() {
        let rows = parse_bulk_rows(
            pairs(&[("item_count", "1"), ("item_name_0", "Kale"), ("item_name_1", "Leeks")]),
            default_expiration(),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(parse_bulk_rows(pairs(&[("item_name_0", "Kale")]), default_expiration())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_bulk_rows_over_the_cap_are_rejected() {
        let mut raw = vec![("item_count".to_string(), "51".to_string())];
        raw.extend((0..51).map(|i| (format!("item_name_{}", i), format!("Item {}", i))));

        assert_eq!(parse_bulk_rows(raw, default_expiration()), Err(TooManyRows(51)));

        let exactly: Vec<_> = std::iter::once(("item_count".to_string(), MAX_BULK_ROWS.to_string()))
            .chain((0..MAX_BULK_ROWS).map(|i| (format!("item_name_{}", i), format!("Item {}", i))))
            .collect();
        assert_eq!(parse_bulk_rows(exactly, default_expiration()).unwrap().len(), MAX_BULK_ROWS);
    }

    #[test]
    fn test_ingredient_names_keep_repeated_keys() {
        let names = ingredient_names(pairs(&[
            ("ingredients", "bread"),
            ("return_to", "home"),
            ("ingredients", "butter"),
        ]));
        assert_eq!(names, ["bread", "butter"]);
    }

    #[test]
    fn test_item_form_validation() {
        let form = ItemForm {
            item_name: "Milk".into(),
            quantity: "1".into(),
            category: "Dairy".into(),
            expiration_date: "2026-10-22".into(),
            location: "Fridge".into(),
            price: Some("4.50".into()),
            store: Some("Acme".into()),
            return_to: Some("shopping_list".into()),
        };
        assert!(form.validate().is_ok());
        assert_eq!(form.return_to(), ReturnTo::ShoppingList);
        assert!(ItemForm::default().validate().is_err());
    }
}
