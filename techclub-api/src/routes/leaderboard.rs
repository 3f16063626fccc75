/// Leaderboard endpoints
///
/// - `GET  /api/leaderboard` - Standings, most points first (public)
/// - `POST /api/leaderboard` - Award points to a member (admin)
///
/// Awards add to the member's running total; a negative award corrects it.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson},
    middleware::auth::{authenticate, require_admin},
    routes::Envelope,
};
use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use techclub_shared::models::{
    leaderboard::{LeaderboardEntry, LeaderboardStanding},
    lenient,
};

pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/", get(standings));

    let admin = Router::new()
        .route("/", post(award_points))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, authenticate));

    public.merge(admin)
}

pub async fn standings(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<LeaderboardStanding>>>> {
    Ok(Json(Envelope::data(LeaderboardEntry::standings(&state.db).await?)))
}

#[derive(Debug, Default, Deserialize)]
pub struct AwardRequest {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub member_id: Option<i32>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub points: Option<i32>,
}

/// Adds points to a member's leaderboard entry, creating it if needed
///
/// # Errors
///
/// - `400 Bad Request`: missing fields or unknown member
pub async fn award_points(
    State(state): State<AppState>,
    AppJson(req): AppJson<AwardRequest>,
) -> ApiResult<Json<Envelope<LeaderboardEntry>>> {
    let (Some(member_id), Some(points)) = (req.member_id, req.points) else {
        return Err(ApiError::BadRequest(
            "Member ID and points are required".to_string(),
        ));
    };

    let entry = LeaderboardEntry::award(&state.db, member_id, points).await?;
    tracing::info!(member_id, points, total = entry.points, "Leaderboard points awarded");

    Ok(Json(Envelope::with_message("Points awarded successfully", entry)))
}
