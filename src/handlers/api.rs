use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{new_item_id, now_iso, sort_newest_first, CreateItem, Item, UpdateItem};
use crate::AppState;

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let mut items = state.store.scan_items().await?;
    sort_newest_first(&mut items);
    Ok(Json(json!({ "count": items.len(), "items": items })))
}

// ── Get by id ─────────────────────────────────────────────────────────────────

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Item>> {
    let item = state.store.get(&id).await?;
    Ok(Json(item))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateItem>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let name = payload.name.unwrap_or_default();
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }

    let item = Item::create(
        payload.id.unwrap_or_else(new_item_id),
        name,
        payload.description.unwrap_or_default(),
        payload.status.unwrap_or_else(|| "active".to_string()),
    );
    state.store.put(&item).await?;

    info!(id = %item.id, name = %item.name, "Item created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Item created successfully", "item": item })),
    ))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateItem>,
) -> AppResult<Json<serde_json::Value>> {
    let patch = payload.into_patch();
    let item = state.store.update(&id, &patch, &now_iso()).await?;

    info!(id = %id, "Item updated");

    Ok(Json(json!({ "message": "Item updated successfully", "item": item })))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    state.store.delete(&id).await?;

    info!(id = %id, "Item deleted");

    Ok(Json(json!({ "message": "Item deleted successfully" })))
}
