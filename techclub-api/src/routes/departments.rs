//! `GET /api/departments` (public)

use crate::{app::AppState, error::ApiResult, routes::Envelope};
use axum::{extract::State, routing::get, Json, Router};
use techclub_shared::models::department::Department;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_departments))
}

/// All departments, by id
pub async fn list_departments(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<Department>>>> {
    let departments = Department::list(&state.db).await?;
    Ok(Json(Envelope::data(departments)))
}
