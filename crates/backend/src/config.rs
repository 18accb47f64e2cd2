// =============================================================================
// Larder Backend - Configuration
// =============================================================================

use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// Accepted range for `RESTOCK_SHELF_DAYS`, about ten years at most.
pub const SHELF_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=3650;

/// What "mark purchased" does to a shopping-list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchasePolicy {
    /// Delete the row.
    Remove,
    /// Move the row back to the fridge with a fresh expiration date.
    Restock,
}

impl PurchasePolicy {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "remove" | "delete" => Ok(Self::Remove),
            "restock" => Ok(Self::Restock),
            other => Err(ConfigError::Invalid("PURCHASE_POLICY", other.to_string())),
        }
    }
}

/// Recipe search service settings.
#[derive(Debug, Clone)]
pub struct RecipeConfig {
    /// Spoonacular API key. `None` disables recipe lookups.
    pub api_key: Option<String>,

    /// Service base URL (no trailing path)
    pub base_url: String,

    /// Upper bound on a single lookup
    pub timeout: Duration,
}

/// Application configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "127.0.0.1:5000")
    pub bind_address: String,

    /// Database URL, `sqlite:` or `postgres://`
    pub database_url: String,

    /// Connection pool size
    pub max_connections: u32,

    pub recipes: RecipeConfig,

    pub purchase_policy: PurchasePolicy,

    /// Shelf life for restocked items and defaulted expirations
    pub shelf_days: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::vars().collect())
    }

    /// Build configuration from an explicit variable map.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        Ok(Self {
            bind_address: get("BIND_ADDRESS").unwrap_or("127.0.0.1:5000").to_string(),
            database_url: get("DATABASE_URL").unwrap_or("sqlite:fridge.db").to_string(),
            max_connections: parse_number(get("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", 5)?,
            recipes: RecipeConfig {
                api_key: get("SPOONACULAR_API_KEY").map(str::to_string),
                base_url: get("RECIPE_API_URL")
                    .unwrap_or("https://api.spoonacular.com")
                    .trim_end_matches('/')
                    .to_string(),
                timeout: Duration::from_secs(parse_number(get("RECIPE_TIMEOUT_SECS"), "RECIPE_TIMEOUT_SECS", 10)?),
            },
            purchase_policy: get("PURCHASE_POLICY")
                .map(PurchasePolicy::parse)
                .transpose()?
                .unwrap_or(PurchasePolicy::Remove),
            shelf_days: parse_shelf_days(get("RESTOCK_SHELF_DAYS"))?,
        })
    }
}

fn parse_shelf_days(raw: Option<&str>) -> Result<i64, ConfigError> {
    let days = parse_number(raw, "RESTOCK_SHELF_DAYS", 7)?;
    if !SHELF_DAYS_RANGE.contains(&days) {
        return Err(ConfigError::Invalid("RESTOCK_SHELF_DAYS", days.to_string()));
    }
    Ok(days)
}

fn parse_number<T: std::str::FromStr>(
    raw: Option<&str>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid(key, value.to_string())),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(HashMap::new()).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:5000");
        assert_eq!(config.database_url, "sqlite:fridge.db");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.recipes.api_key, None);
        assert_eq!(config.recipes.base_url, "https://api.spoonacular.com");
        assert_eq!(config.recipes.timeout, Duration::from_secs(10));
        assert_eq!(config.purchase_policy, PurchasePolicy::Remove);
        assert_eq!(config.shelf_days, 7);
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = Config::from_vars(vars(&[("SPOONACULAR_API_KEY", "  ")])).unwrap();
        assert_eq!(config.recipes.api_key, None);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("DATABASE_URL", "postgres://larder@localhost/larder"),
            ("SPOONACULAR_API_KEY", "abc123"),
            ("RECIPE_API_URL", "http://127.0.0.1:9999/"),
            ("RECIPE_TIMEOUT_SECS", "2"),
            ("PURCHASE_POLICY", "Restock"),
            ("RESTOCK_SHELF_DAYS", "14"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "postgres://larder@localhost/larder");
        assert_eq!(config.recipes.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.recipes.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.recipes.timeout, Duration::from_secs(2));
        assert_eq!(config.purchase_policy, PurchasePolicy::Restock);
        assert_eq!(config.shelf_days, 14);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_vars(vars(&[("PURCHASE_POLICY", "donate")])).is_err());
        assert!(Config::from_vars(vars(&[("RECIPE_TIMEOUT_SECS", "soon")])).is_err());
    }

    #[test]
    fn test_shelf_days_must_be_in_range() {
        for bad in ["100000000", "0", "-3", "3651"] {
            let err = Config::from_vars(vars(&[("RESTOCK_SHELF_DAYS", bad)])).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid("RESTOCK_SHELF_DAYS", _)), "{}", bad);
        }
        for good in ["1", "3650"] {
            let config = Config::from_vars(vars(&[("RESTOCK_SHELF_DAYS", good)])).unwrap();
            assert_eq!(config.shelf_days.to_string(), good);
        }
    }
}
