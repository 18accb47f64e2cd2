// =============================================================================
// Larder Backend - Application Library
// =============================================================================
// Table of Contents:
// 1. Modules
// 2. Application State
// 3. Router Setup
// =============================================================================

pub mod config;
pub mod error;
pub mod inventory;
pub mod recipes;
pub mod routes;
pub mod store;
pub mod views;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::inventory::Inventory;
use crate::recipes::RecipeClient;
use crate::routes::{items, prices, recipes as recipe_routes, shopping};

// -----------------------------------------------------------------------------
// 2. Application State
// -----------------------------------------------------------------------------

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub inventory: Inventory,
    pub recipes: RecipeClient,
}

// -----------------------------------------------------------------------------
// 3. Router Setup
// -----------------------------------------------------------------------------

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        .route("/about", get(|| async { views::about() }))
        // Fridge
        .route("/", get(items::home))
        .route("/add", post(items::add_item))
        .route("/bulk-add", get(items::bulk_add_form).post(items::bulk_add))
        .route("/edit/:id", get(items::edit_form).post(items::edit_item))
        .route("/delete/:id", post(items::delete_item))
        .route("/move-to-shopping/:id", post(items::move_to_shopping))
        // Shopping list
        .route("/shopping-list", get(shopping::shopping_list))
        .route("/mark-purchased/:id", post(shopping::mark_purchased))
        // Prices
        .route("/price-history", get(prices::price_history))
        // Recipes
        .route("/recipes", get(recipe_routes::recipes))
        .route("/add-missing-ingredients", post(recipe_routes::add_missing_ingredients))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PurchasePolicy;
    use crate::store::{SqliteStore, Store};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use std::collections::HashMap;
    use tower::ServiceExt;

    async fn app(policy: PurchasePolicy) -> Router {
        let mut config = Config::from_vars(HashMap::new()).unwrap();
        config.purchase_policy = policy;

        let store = SqliteStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();

        let state = AppState {
            inventory: Inventory::new(Arc::new(store), config.purchase_policy, config.shelf_days),
            recipes: RecipeClient::new(&config.recipes).unwrap(),
            config: Arc::new(config),
        };
        create_router(state)
    }

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn location(response: &Response) -> String {
        response.headers()[header::LOCATION].to_str().unwrap().to_string()
    }

    async fn text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    const MILK: &str = "item_name=Milk&quantity=1&category=Dairy&expiration_date=2030-01-01&location=Fridge&price=4.50&store=Acme";

    #[tokio::test]
    async fn test_health() {
        let response = app(PurchasePolicy::Remove).await.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_added_item_is_listed() {
        let app = app(PurchasePolicy::Remove).await;

        let response = app.clone().oneshot(form("/add", MILK)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?notice=Added%20Milk%21&level=success");

        let page = text(app.clone().oneshot(get("/")).await.unwrap()).await;
        assert!(page.contains("Milk"));
        assert!(page.contains("$4.50 @ Acme"));

        let prices = text(app.oneshot(get("/price-history")).await.unwrap()).await;
        assert!(prices.contains("<strong>Milk</strong> at Acme"));
    }

    #[tokio::test]
    async fn test_invalid_add_writes_nothing() {
        let app = app(PurchasePolicy::Remove).await;
        let body = "item_name=Milk&quantity=lots&category=Dairy&expiration_date=2030-01-01&location=Fridge";

        let response = app.clone().oneshot(form("/add", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).ends_with("&level=error"));

        let page = text(app.oneshot(get("/")).await.unwrap()).await;
        assert!(page.contains("Your fridge is empty"));
    }

    #[tokio::test]
    async fn test_delete_of_missing_item_redirects_like_success() {
        let app = app(PurchasePolicy::Remove).await;
        let response = app.clone().oneshot(form("/delete/999", "return_to=home")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let response = app.oneshot(form("/delete/999", "return_to=shopping_list")).await.unwrap();
        assert_eq!(location(&response), "/shopping-list");
    }

    #[tokio::test]
    async fn test_edit_of_missing_item_reports_not_found() {
        let app = app(PurchasePolicy::Remove).await;
        let response = app.clone().oneshot(form("/edit/999", MILK)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?notice=Item%20not%20found%21&level=error");

        let response = app.oneshot(get("/edit/999")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_edit_returns_to_requested_page() {
        let app = app(PurchasePolicy::Remove).await;
        app.clone().oneshot(form("/add", MILK)).await.unwrap();

        let page = text(app.clone().oneshot(get("/edit/1?return_to=shopping_list")).await.unwrap()).await;
        assert!(page.contains(r#"value="shopping_list""#));

        let body = format!("{}&return_to=shopping_list", MILK.replace("quantity=1", "quantity=2"));
        let response = app.oneshot(form("/edit/1", &body)).await.unwrap();
        assert_eq!(location(&response), "/shopping-list?notice=Updated%20Milk%21&level=success");
    }

    #[tokio::test]
    async fn test_bulk_add_counts_non_blank_rows() {
        let app = app(PurchasePolicy::Remove).await;
        let body = "item_count=3&item_name_0=Apples&quantity_0=6&item_name_1=&item_name_2=Kale";

        let response = app.clone().oneshot(form("/bulk-add", body)).await.unwrap();
        assert_eq!(
            location(&response),
            "/?notice=Successfully%20added%202%20item%28s%29%21&level=success"
        );

        let page = text(app.oneshot(get("/")).await.unwrap()).await;
        assert!(page.contains("Apples"));
        assert!(page.contains("Kale"));
    }

    #[tokio::test]
    async fn test_bulk_add_over_the_cap_writes_nothing() {
        let app = app(PurchasePolicy::Remove).await;
        let mut body = String::from("item_count=51");
        for i in 0..51 {
            body.push_str(&format!("&item_name_{}=Item{}", i, i));
        }

        let response = app.clone().oneshot(form("/bulk-add", &body)).await.unwrap();
        assert_eq!(
            location(&response),
            "/bulk-add?notice=At%20most%2050%20items%20can%20be%20added%20at%20once%2C%20got%2051.&level=error"
        );

        let page = text(app.oneshot(get("/")).await.unwrap()).await;
        assert!(page.contains("Your fridge is empty"));
    }

    #[tokio::test]
    async fn test_bulk_add_form_caps_rows() {
        let app = app(PurchasePolicy::Remove).await;
        let page = text(app.oneshot(get("/bulk-add?rows=500")).await.unwrap()).await;
        assert!(page.contains(r#"name="item_count" value="50""#));
        assert!(page.contains("item_name_49"));
        assert!(!page.contains("item_name_50"));
    }

    #[tokio::test]
    async fn test_shopping_round_trip() {
        let app = app(PurchasePolicy::Remove).await;
        app.clone().oneshot(form("/add", MILK)).await.unwrap();

        let response = app.clone().oneshot(form("/move-to-shopping/1", "return_to=home")).await.unwrap();
        assert_eq!(location(&response), "/?notice=Item%20moved%20to%20shopping%20list%21&level=success");

        let list = text(app.clone().oneshot(get("/shopping-list")).await.unwrap()).await;
        assert!(list.contains("Milk"));

        let response = app
            .clone()
            .oneshot(form("/mark-purchased/1", "return_to=shopping_list"))
            .await
            .unwrap();
        assert_eq!(
            location(&response),
            "/shopping-list?notice=Item%20marked%20as%20purchased%21&level=success"
        );

        let response = app.oneshot(form("/mark-purchased/1", "return_to=shopping_list")).await.unwrap();
        assert_eq!(
            location(&response),
            "/shopping-list?notice=Item%20not%20found%21&level=error"
        );
    }

    #[tokio::test]
    async fn test_add_missing_ingredients_skips_existing() {
        let app = app(PurchasePolicy::Remove).await;

        let response = app
            .clone()
            .oneshot(form("/add-missing-ingredients", "ingredients=bread&ingredients=butter"))
            .await
            .unwrap();
        assert_eq!(
            location(&response),
            "/recipes?notice=Added%202%20ingredient%28s%29%20to%20your%20shopping%20list%21&level=success"
        );

        let response = app
            .oneshot(form("/add-missing-ingredients", "ingredients=bread"))
            .await
            .unwrap();
        assert_eq!(
            location(&response),
            "/recipes?notice=All%20ingredients%20already%20in%20shopping%20list%21&level=info"
        );
    }

    #[tokio::test]
    async fn test_recipes_page_with_empty_fridge() {
        let app = app(PurchasePolicy::Remove).await;
        let response = app.oneshot(get("/recipes")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(text(response).await.contains("Add some items to your fridge"));
    }
}
