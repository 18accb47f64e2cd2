// =============================================================================
// Larder Backend - Recipe Suggestions (Spoonacular)
// =============================================================================
// Suggestions are best effort. Every failure mode (no API key, network error,
// timeout, non-2xx, unreadable body) degrades to an empty list and a log line.
// No retries, no caching.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

use crate::config::RecipeConfig;

// -----------------------------------------------------------------------------
// Constants
// -----------------------------------------------------------------------------

/// Most recipes requested per lookup.
pub const MAX_RECIPES: usize = 12;

const FIND_BY_INGREDIENTS_PATH: &str = "/recipes/findByIngredients";

/// Spoonacular ranking mode 2: minimise missing ingredients.
const RANKING_MAX_USED: &str = "2";

// -----------------------------------------------------------------------------
// Response Types
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub used_ingredient_count: u32,
    #[serde(default)]
    pub missed_ingredient_count: u32,
    #[serde(default)]
    pub used_ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub missed_ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub likes: i64,
}

impl Recipe {
    pub fn missing_names(&self) -> Vec<&str> {
        self.missed_ingredients.iter().map(|i| i.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    #[serde(default)]
    pub original: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum LookupError {
    #[error("invalid recipe service URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(reqwest::Error),

    #[error("recipe service answered {0}")]
    Status(reqwest::StatusCode),
}

// The request URL carries the API key; it must never reach a log line.
impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        LookupError::Request(e.without_url())
    }
}

// -----------------------------------------------------------------------------
// Client
// -----------------------------------------------------------------------------

/// Client for the ingredient-based recipe search.
#[derive(Clone)]
pub struct RecipeClient {
    http: reqwest::Client,
    config: RecipeConfig,
}

impl RecipeClient {
    pub fn new(config: &RecipeConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Whether lookups will actually be attempted.
    pub fn is_enabled(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Recipes that use as many of `ingredients` as possible, at most [`MAX_RECIPES`].
    pub async fn find_by_ingredients(&self, ingredients: &[String]) -> Vec<Recipe> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            debug!("No recipe API key configured, skipping lookup");
            return Vec::new();
        };
        if ingredients.is_empty() {
            return Vec::new();
        }

        match self.lookup(api_key, ingredients).await {
            Ok(mut recipes) => {
                recipes.truncate(MAX_RECIPES);
                debug!(count = recipes.len(), "Recipe lookup succeeded");
                recipes
            }
            Err(e) => {
                warn!("Recipe lookup failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn lookup(&self, api_key: &str, ingredients: &[String]) -> Result<Vec<Recipe>, LookupError> {
        let endpoint = format!("{}{}", self.config.base_url, FIND_BY_INGREDIENTS_PATH);
        let number = MAX_RECIPES.to_string();
        let joined = ingredients.join(",");
        let url = Url::parse_with_params(
            &endpoint,
            &[
                ("ingredients", joined.as_str()),
                ("number", number.as_str()),
                ("ranking", RANKING_MAX_USED),
                ("ignorePantry", "true"),
                ("apiKey", api_key),
            ],
        )?;

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(LookupError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

/// Trimmed, non-blank names with case-insensitive duplicates removed, in first-seen order.
pub fn ingredient_query<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(str::to_string)
        .collect()
}
