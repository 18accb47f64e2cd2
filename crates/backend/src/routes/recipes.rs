// =============================================================================
// Larder Backend - Recipe Handlers
// =============================================================================

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Form,
};

use super::forms::ingredient_names;
use super::{redirect_with_notice, today, NoticeLevel, NoticeQuery};
use crate::error::AppError;
use crate::views;
use crate::AppState;

/// Suggestions for what is in the fridge. The storage transaction is finished
/// before the remote lookup starts.
pub async fn recipes(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let ingredients = state.inventory.recipe_ingredients().await?;
    let recipes = state.recipes.find_by_ingredients(&ingredients).await;
    Ok(views::recipes(
        &ingredients,
        &recipes,
        state.recipes.is_enabled(),
        query.notice().as_ref(),
    ))
}

pub async fn add_missing_ingredients(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, AppError> {
    let names = ingredient_names(pairs);
    let added = state.inventory.add_missing_ingredients(&names, today()).await?;

    let redirect = if added > 0 {
        redirect_with_notice(
            "/recipes",
            NoticeLevel::Success,
            &format!("Added {} ingredient(s) to your shopping list!", added),
        )
    } else {
        redirect_with_notice(
            "/recipes",
            NoticeLevel::Info,
            "All ingredients already in shopping list!",
        )
    };
    Ok(redirect)
}
