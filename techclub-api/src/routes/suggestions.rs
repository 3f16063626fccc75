//! Member suggestion box.
//!
//! Any logged-in user may post; board members and admins read them. The
//! author of an anonymous suggestion is not included in the listing.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson},
    middleware::auth::{authenticate, require_reviewer},
    routes::{non_blank, Envelope},
};
use axum::{
    extract::State,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use techclub_shared::models::{
    lenient,
    suggestion::{Suggestion, SuggestionView},
};

pub fn router(state: AppState) -> Router<AppState> {
    let authors = Router::new()
        .route("/", post(create_suggestion))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let readers = Router::new()
        .route("/", get(list_suggestions))
        .route_layer(from_fn(require_reviewer))
        .route_layer(from_fn_with_state(state, authenticate));

    authors.merge(readers)
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionRequest {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub member_id: Option<i32>,

    #[serde(default)]
    pub suggestion: Option<String>,

    #[serde(default)]
    pub anonymous: bool,
}

pub async fn create_suggestion(
    State(state): State<AppState>,
    AppJson(req): AppJson<SuggestionRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<SuggestionView>>)> {
    let (Some(member_id), Some(text)) = (req.member_id, non_blank(&req.suggestion)) else {
        return Err(ApiError::BadRequest(
            "Member ID and suggestion are required".to_string(),
        ));
    };

    let suggestion = Suggestion::create(&state.db, member_id, text, req.anonymous).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Suggestion submitted successfully",
            SuggestionView::from(suggestion),
        )),
    ))
}

pub async fn list_suggestions(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<SuggestionView>>>> {
    Ok(Json(Envelope::data(Suggestion::list(&state.db).await?)))
}
