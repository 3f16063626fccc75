/// Club member endpoints
///
/// # Endpoints
///
/// - `GET  /api/members?department_id=` - List members (board/admin)
/// - `POST /api/members/promote` - Turn approved applications into members (admin)

use crate::{
    app::AppState,
    error::{ApiResult, AppQuery},
    middleware::auth::{authenticate, require_admin, require_reviewer, ClientMeta, CurrentUser},
    routes::{board::DepartmentQuery, Envelope},
};
use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use techclub_shared::{
    audit::{audit_event, AuditEvent},
    models::member::{Member, PromotionReport},
};

pub fn router(state: AppState) -> Router<AppState> {
    let reviewers = Router::new()
        .route("/", get(list_members))
        .route_layer(from_fn(require_reviewer))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let admin = Router::new()
        .route("/promote", post(promote_members))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, authenticate));

    reviewers.merge(admin)
}

pub async fn list_members(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DepartmentQuery>,
) -> ApiResult<Json<Envelope<Vec<Member>>>> {
    let members = Member::list(&state.db, query.department_id).await?;
    Ok(Json(Envelope::data(members)))
}

/// Promote every approved application that isn't already a member
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Promotion complete",
///   "data": { "total": 5, "created": 3, "skipped": 1, "errors": [ ... ] }
/// }
/// ```
///
/// Per-application problems are reported in `errors`; they don't fail the request.
pub async fn promote_members(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ClientMeta(meta): ClientMeta,
) -> ApiResult<Json<Envelope<PromotionReport>>> {
    let report = Member::promote_approved_applications(&state.db).await?;

    audit_event(
        AuditEvent::MembersPromoted,
        &meta,
        json!({
            "user_id": admin.user_id,
            "total": report.total,
            "created": report.created,
            "skipped": report.skipped,
            "errors": report.errors.len(),
        }),
    );

    Ok(Json(Envelope::with_message("Promotion complete", report)))
}
