//! Board roster.
//!
//! `GET /api/board?department_id=3` (public). Rows come back ordered by
//! position rank: President, Vice President, Founder, Head, Co-Head.

use crate::{
    app::AppState,
    error::{ApiResult, AppQuery},
    routes::Envelope,
};
use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;
use techclub_shared::models::{board::BoardMember, lenient};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_board))
}

#[derive(Debug, Default, Deserialize)]
pub struct DepartmentQuery {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub department_id: Option<i32>,
}

pub async fn list_board(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DepartmentQuery>,
) -> ApiResult<Json<Envelope<Vec<BoardMember>>>> {
    let board = BoardMember::list(&state.db, query.department_id).await?;
    Ok(Json(Envelope::data(board)))
}
