// =============================================================================
// Larder Backend - Shopping List Handlers
// =============================================================================

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};

use super::forms::ActionForm;
use super::{redirect_with_notice, today, NoticeLevel, NoticeQuery};
use crate::error::AppError;
use crate::inventory::Purchase;
use crate::views;
use crate::AppState;

pub async fn shopping_list(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let items = state.inventory.shopping_list().await?;
    Ok(views::shopping_list(
        &items,
        state.config.purchase_policy,
        query.notice().as_ref(),
    ))
}

pub async fn mark_purchased(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ActionForm>,
) -> Result<Redirect, AppError> {
    let path = form.return_to().path();
    let redirect = match state.inventory.mark_purchased(id, today()).await? {
        Purchase::Removed | Purchase::Restocked => {
            redirect_with_notice(path, NoticeLevel::Success, "Item marked as purchased!")
        }
        Purchase::NotFound => redirect_with_notice(path, NoticeLevel::Error, "Item not found!"),
    };
    Ok(redirect)
}
