//! Club events: public listing, admin create/delete.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson, AppPath},
    middleware::auth::{authenticate, require_admin},
    routes::Envelope,
};
use axum::{
    extract::State,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use techclub_shared::models::event::{CreateEvent, Event};

pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/", get(list_events));

    let admin = Router::new()
        .route("/", post(create_event))
        .route("/:id", delete(delete_event))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, authenticate));

    public.merge(admin)
}

/// Upcoming events first, then past ones
pub async fn list_events(State(state): State<AppState>) -> ApiResult<Json<Envelope<Vec<Event>>>> {
    Ok(Json(Envelope::data(Event::list(&state.db).await?)))
}

pub async fn create_event(
    State(state): State<AppState>,
    AppJson(data): AppJson<CreateEvent>,
) -> ApiResult<(StatusCode, Json<Envelope<Event>>)> {
    if data.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Event name is required".to_string()));
    }

    let event = Event::create(&state.db, data).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message("Event created successfully", event)),
    ))
}

pub async fn delete_event(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> ApiResult<Json<Value>> {
    if !Event::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }

    Ok(Json(json!({ "success": true, "message": "Event deleted successfully" })))
}
