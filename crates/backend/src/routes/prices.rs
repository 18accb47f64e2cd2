// =============================================================================
// Larder Backend - Price History Handler
// =============================================================================

use axum::{
    extract::{Query, State},
    response::Html,
};

use super::NoticeQuery;
use crate::error::AppError;
use crate::views;
use crate::AppState;

/// Every recorded price plus one trend summary per item and store.
pub async fn price_history(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let overview = state.inventory.price_overview().await?;
    Ok(views::price_history(&overview, query.notice().as_ref()))
}
