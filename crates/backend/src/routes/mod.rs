// =============================================================================
// Larder Backend - Request Handlers
// =============================================================================
// Table of Contents:
// 1. Notices (flash messages carried on the redirect URL)
// 2. Return-to targets
// 3. Handler modules
// =============================================================================

pub mod forms;
pub mod items;
pub mod prices;
pub mod recipes;
pub mod shopping;

use axum::response::Redirect;
use chrono::NaiveDate;
use serde::Deserialize;

// -----------------------------------------------------------------------------
// 1. Notices
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

impl NoticeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        }
    }

    fn parse(raw: &str) -> Self {
        match raw {
            "success" => NoticeLevel::Success,
            "error" => NoticeLevel::Error,
            _ => NoticeLevel::Info,
        }
    }
}

/// A one-shot message shown on the page a redirect lands on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Query parameters every page accepts for displaying a notice.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
    pub level: Option<String>,
}

impl NoticeQuery {
    pub fn notice(&self) -> Option<Notice> {
        let message = self.notice.as_deref().map(str::trim).filter(|m| !m.is_empty())?;
        Some(Notice {
            level: NoticeLevel::parse(self.level.as_deref().unwrap_or_default()),
            message: message.to_string(),
        })
    }
}

/// Redirect to `path` with a notice attached. `path` may already carry a query.
pub fn redirect_with_notice(path: &str, level: NoticeLevel, message: &str) -> Redirect {
    let separator = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!(
        "{}{}notice={}&level={}",
        path,
        separator,
        urlencoding::encode(message),
        level.as_str()
    ))
}

// -----------------------------------------------------------------------------
// 2. Return-to Targets
// -----------------------------------------------------------------------------

/// Page a form submission goes back to, sent explicitly as the `return_to` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReturnTo {
    #[default]
    Home,
    ShoppingList,
}

impl ReturnTo {
    /// Unknown or missing values go home.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("shopping_list") => ReturnTo::ShoppingList,
            _ => ReturnTo::Home,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReturnTo::Home => "home",
            ReturnTo::ShoppingList => "shopping_list",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            ReturnTo::Home => "/",
            ReturnTo::ShoppingList => "/shopping-list",
        }
    }
}

/// The local calendar date requests are evaluated against.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
