//! Sponsors: public listing, admin create.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson},
    middleware::auth::{authenticate, require_admin},
    routes::Envelope,
};
use axum::{
    extract::State,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use techclub_shared::models::sponsor::{CreateSponsor, Sponsor};

pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/", get(list_sponsors));

    let admin = Router::new()
        .route("/", post(create_sponsor))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, authenticate));

    public.merge(admin)
}

pub async fn list_sponsors(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<Sponsor>>>> {
    Ok(Json(Envelope::data(Sponsor::list(&state.db).await?)))
}

pub async fn create_sponsor(
    State(state): State<AppState>,
    AppJson(data): AppJson<CreateSponsor>,
) -> ApiResult<(StatusCode, Json<Envelope<Sponsor>>)> {
    if data.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Sponsor name is required".to_string()));
    }

    let sponsor = Sponsor::create(&state.db, data).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message("Sponsor added successfully", sponsor)),
    ))
}
