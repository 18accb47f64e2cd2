// =============================================================================
// Larder Backend - HTML Views
// =============================================================================
// Table of Contents:
// 1. Layout
// 2. Fridge (home, edit, bulk add)
// 3. Shopping List
// 4. Price History
// 5. Recipes
// 6. About
// =============================================================================

use axum::response::Html;
use chrono::NaiveDate;
use larder_common::{Freshness, InventoryItem, PriceTrend};
use std::fmt::Write;

use crate::config::PurchasePolicy;
use crate::inventory::{ListedItem, PriceOverview};
use crate::recipes::Recipe;
use crate::routes::{Notice, ReturnTo};

// -----------------------------------------------------------------------------
// 1. Layout
// -----------------------------------------------------------------------------

const STYLE: &str = r#"
        * { box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; background: #f5f7fa; color: #1f2933; }
        nav { background: #1a1a2e; padding: 12px 24px; display: flex; gap: 20px; }
        nav a { color: #ccd6f6; text-decoration: none; font-weight: 600; }
        nav a:hover { color: #64ffda; }
        main { max-width: 1000px; margin: 24px auto; padding: 0 16px; }
        table { width: 100%; border-collapse: collapse; background: #fff; margin-bottom: 24px; }
        th, td { padding: 8px 10px; border-bottom: 1px solid #e4e7eb; text-align: left; }
        tr.expired td { background: #ffe3e3; }
        tr.soon td { background: #fff3c4; }
        form.inline { display: inline; }
        fieldset { border: 1px solid #d9e2ec; background: #fff; padding: 16px; margin-bottom: 24px; }
        label { display: inline-block; margin: 4px 12px 4px 0; }
        button { cursor: pointer; }
        .notice { padding: 12px; border-radius: 6px; margin-bottom: 16px; }
        .notice.success { background: #e3f9e5; border: 1px solid #31b237; }
        .notice.info { background: #e6f6ff; border: 1px solid #2680c2; }
        .notice.error { background: #ffe3e3; border: 1px solid #e12d39; }
        .trend-up { color: #e12d39; }
        .trend-down { color: #31b237; }
        .card { background: #fff; border: 1px solid #d9e2ec; padding: 12px; margin-bottom: 16px; }
        .empty { color: #7b8794; font-style: italic; }
"#;

/// Escape text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(title: &str, notice: Option<&Notice>, body: &str) -> Html<String> {
    let notice = notice
        .map(|n| {
            format!(
                r#"<div class="notice {}">{}</div>"#,
                n.level.as_str(),
                escape(&n.message)
            )
        })
        .unwrap_or_default();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Larder</title>
    <style>{STYLE}</style>
</head>
<body>
    <nav>
        <a href="/">Fridge</a>
        <a href="/bulk-add">Bulk Add</a>
        <a href="/shopping-list">Shopping List</a>
        <a href="/price-history">Price History</a>
        <a href="/recipes">Recipes</a>
        <a href="/about">About</a>
    </nav>
    <main>
        {notice}
        <h1>{title}</h1>
        {body}
    </main>
</body>
</html>"#,
        title = escape(title),
        notice = notice,
        body = body,
    ))
}

fn price_cell(price: Option<f64>, store: Option<&str>) -> String {
    match (price, store) {
        (Some(p), Some(s)) => format!("${:.2} @ {}", p, escape(s)),
        (Some(p), None) => format!("${:.2}", p),
        (None, Some(s)) => escape(s),
        (None, None) => String::new(),
    }
}

fn days_left_cell(days: i64, freshness: Freshness) -> String {
    match (freshness, days) {
        (Freshness::Unknown, _) => "?".to_string(),
        (_, d) if d < 0 => format!("expired {} day(s) ago", -d),
        (_, 0) => "today".to_string(),
        (_, d) => format!("{} day(s)", d),
    }
}

fn action_button(action: &str, id: i64, label: &str, return_to: ReturnTo) -> String {
    format!(
        r#"<form class="inline" method="post" action="/{action}/{id}"><input type="hidden" name="return_to" value="{ret}"><button type="submit">{label}</button></form>"#,
        action = action,
        id = id,
        ret = return_to.as_str(),
        label = label,
    )
}

// -----------------------------------------------------------------------------
// 2. Fridge
// -----------------------------------------------------------------------------

pub fn home(items: &[ListedItem], default_expiration: NaiveDate, notice: Option<&Notice>) -> Html<String> {
    let mut body = String::new();

    if items.is_empty() {
        body.push_str(r#"<p class="empty">Your fridge is empty. Add something below.</p>"#);
    } else {
        body.push_str(
            "<table><thead><tr><th>Item</th><th>Qty</th><th>Category</th><th>Location</th>\
             <th>Expires</th><th>Days left</th><th>Price</th><th></th></tr></thead><tbody>",
        );
        for listed in items {
            let item = &listed.item;
            let _ = write!(
                body,
                r#"<tr class="{class}"><td>{name}</td><td>{qty}</td><td>{category}</td><td>{location}</td><td>{expiration}</td><td>{days}</td><td>{price}</td><td><a href="/edit/{id}?return_to=home">Edit</a> {move_btn} {delete_btn}</td></tr>"#,
                class = listed.freshness.css_class(),
                name = escape(&item.name),
                qty = item.quantity,
                category = escape(&item.category),
                location = escape(&item.location),
                expiration = escape(&item.expiration),
                days = days_left_cell(listed.days_left, listed.freshness),
                price = price_cell(item.price, item.store.as_deref()),
                id = item.id,
                move_btn = action_button("move-to-shopping", item.id, "To shopping list", ReturnTo::Home),
                delete_btn = action_button("delete", item.id, "Delete", ReturnTo::Home),
            );
        }
        body.push_str("</tbody></table>");
    }

    let _ = write!(
        body,
        r#"<form method="post" action="/add"><fieldset><legend>Add an item</legend>
            <label>Name <input name="item_name" required></label>
            <label>Quantity <input name="quantity" type="number" min="0" value="1" required></label>
            <label>Category <input name="category" value="Other" required></label>
            <label>Expires <input name="expiration_date" type="date" value="{default_expiration}" required></label>
            <label>Location <input name="location" value="Fridge" required></label>
            <label>Price <input name="price" type="number" step="0.01" min="0"></label>
            <label>Store <input name="store"></label>
            <button type="submit">Add</button>
        </fieldset></form>"#,
        default_expiration = default_expiration.format("%Y-%m-%d"),
    );

    layout("My Fridge", notice, &body)
}

pub fn edit_item(item: &InventoryItem, return_to: ReturnTo, notice: Option<&Notice>) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/edit/{id}"><fieldset>
            <input type="hidden" name="return_to" value="{ret}">
            <label>Name <input name="item_name" value="{name}" required></label>
            <label>Quantity <input name="quantity" type="number" min="0" value="{qty}" required></label>
            <label>Category <input name="category" value="{category}" required></label>
            <label>Expires <input name="expiration_date" type="date" value="{expiration}" required></label>
            <label>Location <input name="location" value="{location}" required></label>
            <label>Price <input name="price" type="number" step="0.01" min="0" value="{price}"></label>
            <label>Store <input name="store" value="{store}"></label>
            <button type="submit">Save</button>
            <a href="{back}">Cancel</a>
        </fieldset></form>"#,
        id = item.id,
        ret = return_to.as_str(),
        name = escape(&item.name),
        qty = item.quantity,
        category = escape(&item.category),
        expiration = escape(&item.expiration),
        location = escape(&item.location),
        price = item.price.map(|p| format!("{:.2}", p)).unwrap_or_default(),
        store = escape(item.store.as_deref().unwrap_or_default()),
        back = return_to.path(),
    );

    layout(&format!("Edit {}", item.name), notice, &body)
}

pub fn bulk_add(rows: usize, default_expiration: NaiveDate, notice: Option<&Notice>) -> Html<String> {
    let expiration = default_expiration.format("%Y-%m-%d");
    let mut body = format!(
        r#"<form method="post" action="/bulk-add"><input type="hidden" name="item_count" value="{rows}">
        <table><thead><tr><th>Name</th><th>Qty</th><th>Category</th><th>Expires</th><th>Location</th><th>Price</th><th>Store</th></tr></thead><tbody>"#,
    );
    for i in 0..rows {
        let _ = write!(
            body,
            r#"<tr><td><input name="item_name_{i}"></td><td><input name="quantity_{i}" type="number" min="0" value="1"></td><td><input name="category_{i}" value="Other"></td><td><input name="expiration_{i}" type="date" value="{expiration}"></td><td><input name="location_{i}" value="Fridge"></td><td><input name="price_{i}" type="number" step="0.01" min="0"></td><td><input name="store_{i}"></td></tr>"#,
        );
    }
    let _ = write!(
        body,
        r#"</tbody></table><p>Rows without a name are skipped. <a href="/bulk-add?rows={more}">More rows</a></p><button type="submit">Add all</button></form>"#,
        more = rows + 5,
    );

    layout("Bulk Add", notice, &body)
}

// -----------------------------------------------------------------------------
// 3. Shopping List
// -----------------------------------------------------------------------------

pub fn shopping_list(items: &[InventoryItem], policy: PurchasePolicy, notice: Option<&Notice>) -> Html<String> {
    let mut body = String::new();
    let hint = match policy {
        PurchasePolicy::Remove => "Marking an item purchased removes it from the list.",
        PurchasePolicy::Restock => "Marking an item purchased puts it back in the fridge.",
    };

    if items.is_empty() {
        body.push_str(r#"<p class="empty">Nothing to buy.</p>"#);
    } else {
        let _ = write!(body, "<p>{}</p>", hint);
        body.push_str("<table><thead><tr><th>Item</th><th>Qty</th><th>Category</th><th>Last price</th><th></th></tr></thead><tbody>");
        for item in items {
            let _ = write!(
                body,
                r#"<tr><td>{name}</td><td>{qty}</td><td>{category}</td><td>{price}</td><td>{bought} <a href="/edit/{id}?return_to=shopping_list">Edit</a> {delete}</td></tr>"#,
                name = escape(&item.name),
                qty = item.quantity,
                category = escape(&item.category),
                price = price_cell(item.price, item.store.as_deref()),
                bought = action_button("mark-purchased", item.id, "Purchased", ReturnTo::ShoppingList),
                id = item.id,
                delete = action_button("delete", item.id, "Delete", ReturnTo::ShoppingList),
            );
        }
        body.push_str("</tbody></table>");
    }

    layout("Shopping List", notice, &body)
}

// -----------------------------------------------------------------------------
// 4. Price History
// -----------------------------------------------------------------------------

fn trend_label(trend: PriceTrend) -> &'static str {
    match trend {
        PriceTrend::Up => "&#9650; up",
        PriceTrend::Down => "&#9660; down",
        PriceTrend::Stable => "&#9644; stable",
    }
}

pub fn price_history(overview: &PriceOverview, notice: Option<&Notice>) -> Html<String> {
    let mut body = String::new();

    if overview.summaries.is_empty() {
        body.push_str(r#"<p class="empty">No prices recorded yet. Add an item with a price and a store.</p>"#);
        return layout("Price History", notice, &body);
    }

    body.push_str("<h2>Trends</h2>");
    for summary in &overview.summaries {
        let series = summary
            .prices
            .iter()
            .map(|p| format!("{} ${:.2}", escape(&p.date_recorded), p.price))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = write!(
            body,
            r#"<div class="card"><strong>{name}</strong> at {store}: latest ${latest:.2}, average ${average:.2}, range ${min:.2} to ${max:.2} over {count} purchase(s) <span class="trend-{trend}">{label}</span><br><small>{series}</small></div>"#,
            name = escape(&summary.item_name),
            store = escape(&summary.store),
            latest = summary.latest,
            average = summary.average,
            min = summary.min,
            max = summary.max,
            count = summary.count,
            trend = summary.trend.as_str(),
            label = trend_label(summary.trend),
            series = series,
        );
    }

    body.push_str("<h2>All records</h2><table><thead><tr><th>Date</th><th>Item</th><th>Store</th><th>Price</th></tr></thead><tbody>");
    for record in &overview.history {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>${:.2}</td></tr>",
            escape(&record.date_recorded),
            escape(&record.item_name),
            escape(&record.store),
            record.price,
        );
    }
    body.push_str("</tbody></table>");

    layout("Price History", notice, &body)
}

// -----------------------------------------------------------------------------
// 5. Recipes
// -----------------------------------------------------------------------------

pub fn recipes(
    ingredients: &[String],
    recipes: &[Recipe],
    lookup_enabled: bool,
    notice: Option<&Notice>,
) -> Html<String> {
    let mut body = String::new();

    if ingredients.is_empty() {
        body.push_str(r#"<p class="empty">Add some items to your fridge to get recipe ideas.</p>"#);
        return layout("Recipe Ideas", notice, &body);
    }

    let listed = ingredients.iter().map(|i| escape(i)).collect::<Vec<_>>().join(", ");
    let _ = write!(body, "<p>Using: {}</p>", listed);

    if recipes.is_empty() {
        let message = if lookup_enabled {
            "No recipe suggestions right now. Try again later."
        } else {
            "Recipe suggestions are not configured."
        };
        let _ = write!(body, r#"<p class="empty">{}</p>"#, message);
        return layout("Recipe Ideas", notice, &body);
    }

    for recipe in recipes {
        let image = recipe
            .image
            .as_deref()
            .map(|src| format!(r#"<img src="{}" alt="" width="156"><br>"#, escape(src)))
            .unwrap_or_default();
        let _ = write!(
            body,
            r#"<div class="card">{image}<strong>{title}</strong><br>Uses {used} of your ingredients, missing {missed}."#,
            image = image,
            title = escape(&recipe.title),
            used = recipe.used_ingredient_count,
            missed = recipe.missed_ingredient_count,
        );

        let missing = recipe.missing_names();
        if !missing.is_empty() {
            body.push_str(r#"<form method="post" action="/add-missing-ingredients"><ul>"#);
            for name in missing {
                let _ = write!(
                    body,
                    r#"<li>{name}<input type="hidden" name="ingredients" value="{name}"></li>"#,
                    name = escape(name),
                );
            }
            body.push_str(r#"</ul><button type="submit">Add missing to shopping list</button></form>"#);
        }
        body.push_str("</div>");
    }

    layout("Recipe Ideas", notice, &body)
}

// -----------------------------------------------------------------------------
// 6. About
// -----------------------------------------------------------------------------

pub fn about() -> Html<String> {
    layout(
        "About",
        None,
        "<p>Larder keeps track of what is in your fridge, what is about to expire, \
         what you need to buy and what you paid for it last time.</p>\
         <p>Recipe ideas are powered by Spoonacular.</p>",
    )
}
