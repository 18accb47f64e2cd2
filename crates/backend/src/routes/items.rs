// =============================================================================
// Larder Backend - Fridge Item Handlers
// =============================================================================
// Table of Contents:
// 1. Listing and adding
// 2. Bulk add
// 3. Edit
// 4. Delete and move
// =============================================================================

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{debug, warn};

use super::forms::{parse_bulk_rows, ActionForm, ItemForm, MAX_BULK_ROWS};
use super::{redirect_with_notice, today, NoticeLevel, NoticeQuery, ReturnTo};
use crate::error::AppError;
use crate::views;
use crate::AppState;

const DEFAULT_BULK_ROWS: usize = 5;

const NOT_FOUND: &str = "Item not found!";

// -----------------------------------------------------------------------------
// 1. Listing and Adding
// -----------------------------------------------------------------------------

/// Fridge contents, soonest-expiring first.
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let today = today();
    let items = state.inventory.fridge_items(today).await?;
    Ok(views::home(
        &items,
        state.inventory.default_expiration(today),
        query.notice().as_ref(),
    ))
}

pub async fn add_item(
    State(state): State<AppState>,
    Form(form): Form<ItemForm>,
) -> Result<Redirect, AppError> {
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(e) => {
            debug!("Rejected new item: {}", e);
            return Ok(redirect_with_notice("/", NoticeLevel::Error, &e.to_string()));
        }
    };

    state.inventory.add_item(&fields, today()).await?;
    Ok(redirect_with_notice(
        "/",
        NoticeLevel::Success,
        &format!("Added {}!", fields.name),
    ))
}

// -----------------------------------------------------------------------------
// 2. Bulk Add
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BulkAddQuery {
    pub rows: Option<usize>,
}

pub async fn bulk_add_form(
    State(state): State<AppState>,
    Query(rows): Query<BulkAddQuery>,
    Query(query): Query<NoticeQuery>,
) -> Html<String> {
    let rows = rows.rows.unwrap_or(DEFAULT_BULK_ROWS).clamp(1, MAX_BULK_ROWS);
    views::bulk_add(
        rows,
        state.inventory.default_expiration(today()),
        query.notice().as_ref(),
    )
}

pub async fn bulk_add(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, AppError> {
    let today = today();
    let items = match parse_bulk_rows(pairs, state.inventory.default_expiration(today)) {
        Ok(items) => items,
        Err(e) => {
            debug!("Rejected bulk add: {}", e);
            return Ok(redirect_with_notice("/bulk-add", NoticeLevel::Error, &e.to_string()));
        }
    };
    if items.is_empty() {
        return Ok(redirect_with_notice(
            "/bulk-add",
            NoticeLevel::Info,
            "No items to add. Fill in at least one name.",
        ));
    }

    let added = state.inventory.bulk_add(&items, today).await?;
    Ok(redirect_with_notice(
        "/",
        NoticeLevel::Success,
        &format!("Successfully added {} item(s)!", added),
    ))
}

// -----------------------------------------------------------------------------
// 3. Edit
// -----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct EditQuery {
    pub return_to: Option<String>,
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(edit): Query<EditQuery>,
    Query(query): Query<NoticeQuery>,
) -> Result<Response, AppError> {
    let return_to = ReturnTo::parse(edit.return_to.as_deref());
    let Some(item) = state.inventory.item(id).await? else {
        return Ok(redirect_with_notice(return_to.path(), NoticeLevel::Error, NOT_FOUND).into_response());
    };
    Ok(views::edit_item(&item, return_to, query.notice().as_ref()).into_response())
}

pub async fn edit_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ItemForm>,
) -> Result<Redirect, AppError> {
    let return_to = form.return_to();
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(e) => {
            debug!(id, "Rejected edit: {}", e);
            let back = format!("/edit/{}?return_to={}", id, return_to.as_str());
            return Ok(redirect_with_notice(&back, NoticeLevel::Error, &e.to_string()));
        }
    };

    if !state.inventory.edit_item(id, &fields, today()).await? {
        warn!(id, "Edit of missing item");
        return Ok(redirect_with_notice(return_to.path(), NoticeLevel::Error, NOT_FOUND));
    }
    Ok(redirect_with_notice(
        return_to.path(),
        NoticeLevel::Success,
        &format!("Updated {}!", fields.name),
    ))
}

// -----------------------------------------------------------------------------
// 4. Delete and Move
// -----------------------------------------------------------------------------

/// Deleting an id that is already gone lands on the same page as a real delete.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ActionForm>,
) -> Result<Redirect, AppError> {
    state.inventory.delete_item(id).await?;
    Ok(Redirect::to(form.return_to().path()))
}

pub async fn move_to_shopping(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ActionForm>,
) -> Result<Redirect, AppError> {
    let path = form.return_to().path();
    if state.inventory.move_to_shopping_list(id).await? {
        Ok(redirect_with_notice(path, NoticeLevel::Success, "Item moved to shopping list!"))
    } else {
        Ok(redirect_with_notice(path, NoticeLevel::Error, NOT_FOUND))
    }
}
