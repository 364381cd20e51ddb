use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::SignedCookieJar;
use tracing::{error, info};

use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::models::{new_item_id, now_iso, sort_newest_first, Item, ItemForm};
use crate::views;
use crate::AppState;

// ── List ──────────────────────────────────────────────────────────────────────

/// GET / — full listing, newest first. A store failure degrades to an
/// empty list with an error notice instead of failing the page.
pub async fn index(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Html<String>) {
    let (jar, mut notice) = flash::take(jar);
    let items = match state.store.scan_items().await {
        Ok(mut items) => {
            sort_newest_first(&mut items);
            items
        }
        Err(err) => {
            error!(error = %err, "Error loading items");
            notice = Some(Flash::error(format!("Error loading items: {err}")));
            Vec::new()
        }
    };
    (jar, views::index(&items, notice.as_ref()))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_form(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, notice) = flash::take(jar);
    (jar, views::create_form(&ItemForm::default(), notice.as_ref()))
}

pub async fn create_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<ItemForm>,
) -> Response {
    let name = form.name.clone().unwrap_or_default();
    if name.trim().is_empty() {
        // Invalid submissions are never persisted.
        return views::create_form(&form, Some(&Flash::error("Name is required"))).into_response();
    }

    let item = Item::create(
        new_item_id(),
        name,
        form.description.clone().unwrap_or_default(),
        form.status
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "active".to_string()),
    );

    match state.store.put(&item).await {
        Ok(()) => {
            info!(id = %item.id, "Item created");
            let jar = flash::set(jar, &Flash::success("Item created successfully!"));
            (jar, Redirect::to("/")).into_response()
        }
        Err(err) => {
            error!(error = %err, "Error creating item");
            views::create_form(&form, Some(&Flash::error(format!("Error creating item: {err}"))))
                .into_response()
        }
    }
}

// ── Edit ──────────────────────────────────────────────────────────────────────

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: SignedCookieJar,
) -> Response {
    match state.store.get(&id).await {
        Ok(item) => {
            let (jar, notice) = flash::take(jar);
            let form = ItemForm {
                name: Some(item.name),
                description: Some(item.description),
                status: Some(item.status),
            };
            (jar, views::edit_form(&id, &form, notice.as_ref())).into_response()
        }
        Err(AppError::NotFound) => {
            let jar = flash::set(jar, &Flash::error("Item not found"));
            (jar, Redirect::to("/")).into_response()
        }
        Err(err) => {
            error!(error = %err, "Error loading item");
            let jar = flash::set(jar, &Flash::error(format!("Error loading item: {err}")));
            (jar, Redirect::to("/")).into_response()
        }
    }
}

/// POST /edit/{id} — partial update: name/status only when non-empty,
/// description whenever the field was submitted (blank clears it).
pub async fn edit_submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: SignedCookieJar,
    Form(form): Form<ItemForm>,
) -> Response {
    let patch = form.clone().into_patch();
    match state.store.update(&id, &patch, &now_iso()).await {
        Ok(_) => {
            info!(id = %id, "Item updated");
            let jar = flash::set(jar, &Flash::success("Item updated successfully!"));
            (jar, Redirect::to("/")).into_response()
        }
        Err(err) => {
            error!(error = %err, "Error updating item");
            views::edit_form(
                &id,
                &form,
                Some(&Flash::error(format!("Error updating item: {err}"))),
            )
            .into_response()
        }
    }
}

// ── Delete ────────────────────────────────────────────────────────────────────

/// Idempotent: deleting an absent id still redirects with a success notice.
pub async fn delete_submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Redirect) {
    let jar = match state.store.delete(&id).await {
        Ok(()) => {
            info!(id = %id, "Item deleted");
            flash::set(jar, &Flash::success("Item deleted successfully!"))
        }
        Err(err) => {
            error!(error = %err, "Error deleting item");
            flash::set(jar, &Flash::error(format!("Error deleting item: {err}")))
        }
    };
    (jar, Redirect::to("/"))
}

// ── Info ──────────────────────────────────────────────────────────────────────

/// Operational metadata from configuration only; no store access.
pub async fn info(State(state): State<AppState>) -> Html<String> {
    views::info(&state.config, &now_iso())
}
