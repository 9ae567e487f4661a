// Paralympics web app: HTML pages for events, JSON CRUD for regions.

use super::event::{get_event, get_events};
use super::pages::{render_event, render_index};
use super::region::{delete_region, get_all_regions, get_region, insert_region, update_region};
use super::schema::RegionSchema;
use crate::error::{AppError, Result};
use crate::web::{lock_db, shared_db, SharedDb};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use rusqlite::Connection;
use serde_json::Value;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: SharedDb,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self { db: shared_db(conn) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/display_event/:event_id", get(display_event))
        .route("/noc", get(list_regions).post(create_region))
        .route(
            "/noc/:code",
            get(show_region).patch(patch_region).delete(remove_region),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Pages
// ============================================================================

/// GET / - Home page listing all events
async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let conn = lock_db(&state.db)?;
    let events = get_events(&conn)?;
    Ok(Html(render_index(&events)))
}

/// GET /display_event/:event_id - Event detail page
async fn display_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Html<String>> {
    let not_found = || AppError::NotFound(format!("Event '{}'", event_id));

    let id: i64 = event_id.parse().map_err(|_| not_found())?;
    let conn = lock_db(&state.db)?;
    let event = get_event(&conn, id)?.ok_or_else(not_found)?;

    Ok(Html(render_event(&event)))
}

// ============================================================================
// Region API
// ============================================================================

/// GET /noc - All regions
async fn list_regions(State(state): State<AppState>) -> Result<Json<Value>> {
    let conn = lock_db(&state.db)?;
    let regions = get_all_regions(&conn)?;
    Ok(Json(RegionSchema.dump_many(&regions)))
}

/// POST /noc - Validate and insert a new region
async fn create_region(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let region = RegionSchema.load(payload)?;

    let conn = lock_db(&state.db)?;
    insert_region(&conn, &region)?;
    tracing::info!(noc = %region.noc, "region created");

    Ok((StatusCode::CREATED, Json(RegionSchema.dump(&region))))
}

/// GET /noc/:code - One region
async fn show_region(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Value>> {
    let conn = lock_db(&state.db)?;
    let region = get_region(&conn, &code)?
        .ok_or_else(|| AppError::NotFound(format!("Region '{}'", code)))?;
    Ok(Json(RegionSchema.dump(&region)))
}

/// PATCH /noc/:code - Change name and/or notes
async fn patch_region(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(payload) = payload?;
    let patch = RegionSchema.load_patch(payload)?;

    let conn = lock_db(&state.db)?;
    let mut region = get_region(&conn, &code)?
        .ok_or_else(|| AppError::NotFound(format!("Region '{}'", code)))?;
    patch.apply(&mut region);
    update_region(&conn, &region)?;
    tracing::info!(noc = %region.noc, "region updated");

    Ok(Json(RegionSchema.dump(&region)))
}

/// DELETE /noc/:code
async fn remove_region(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode> {
    let conn = lock_db(&state.db)?;
    delete_region(&conn, &code)?;
    tracing::info!(noc = %code, "region deleted");
    Ok(StatusCode::NO_CONTENT)
}
