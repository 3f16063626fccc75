/// Workshop sessions and attendance
///
/// # Endpoints
///
/// - `GET  /api/sessions` - List sessions (authenticated)
/// - `POST /api/sessions` - Create a session (admin)
/// - `GET  /api/sessions/:id/attendance` - Attendance sheet (board/admin)
/// - `POST /api/sessions/:id/attendance` - Mark a member present/absent (board/admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson, AppPath},
    middleware::auth::{authenticate, require_admin, require_reviewer},
    routes::Envelope,
};
use axum::{
    extract::State,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use techclub_shared::models::{
    attendance::{Attendance, AttendanceEntry},
    lenient,
    session::{CreateSession, Session},
};

pub fn router(state: AppState) -> Router<AppState> {
    let members = Router::new()
        .route("/", get(list_sessions))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let admin = Router::new()
        .route("/", axum::routing::post(create_session))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let reviewers = Router::new()
        .route("/:id/attendance", get(list_attendance).post(mark_attendance))
        .route_layer(from_fn(require_reviewer))
        .route_layer(from_fn_with_state(state, authenticate));

    members.merge(admin).merge(reviewers)
}

pub async fn list_sessions(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<Session>>>> {
    Ok(Json(Envelope::data(Session::list(&state.db).await?)))
}

pub async fn create_session(
    State(state): State<AppState>,
    AppJson(data): AppJson<CreateSession>,
) -> ApiResult<(StatusCode, Json<Envelope<Session>>)> {
    if data.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Session title is required".to_string()));
    }

    let session = Session::create(&state.db, data).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message("Session created successfully", session)),
    ))
}

async fn require_session(state: &AppState, id: i32) -> ApiResult<Session> {
    Session::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))
}

pub async fn list_attendance(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> ApiResult<Json<Envelope<Vec<AttendanceEntry>>>> {
    require_session(&state, id).await?;
    Ok(Json(Envelope::data(
        Attendance::list_for_session(&state.db, id).await?,
    )))
}

#[derive(Debug, Default, Deserialize)]
pub struct AttendanceRequest {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub member_id: Option<i32>,

    /// Defaults to present
    #[serde(default, deserialize_with = "lenient::opt")]
    pub attended: Option<bool>,
}

/// Records attendance; marking the same member again overwrites the flag
pub async fn mark_attendance(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(req): AppJson<AttendanceRequest>,
) -> ApiResult<Json<Envelope<Attendance>>> {
    let member_id = req
        .member_id
        .ok_or_else(|| ApiError::BadRequest("Member ID is required".to_string()))?;

    require_session(&state, id).await?;

    let record = Attendance::mark(&state.db, id, member_id, req.attended.unwrap_or(true)).await?;
    Ok(Json(Envelope::with_message("Attendance recorded", record)))
}
