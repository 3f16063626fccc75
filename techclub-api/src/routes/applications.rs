/// Membership application endpoints
///
/// The intake form posts here anonymously; everything else backs the review
/// dashboard and requires a board member or admin.
///
/// # Endpoints
///
/// - `POST   /api/applications` - Submit an application (public)
/// - `GET    /api/applications` - List with filters and search
/// - `GET    /api/applications/stats` - Counts per status and department
/// - `GET    /api/applications/:id` - Fetch one
/// - `PUT    /api/applications/:id/status` - Change status (review passphrase)
/// - `PUT    /api/applications/:id/comment` - Set or clear reviewer comment
/// - `DELETE /api/applications/:id` - Delete

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson, AppPath, AppQuery},
    middleware::auth::{authenticate, optional_auth, require_reviewer, ClientMeta, CurrentUser},
    routes::{non_blank, Envelope},
};
use axum::{
    extract::State,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use techclub_shared::{
    audit::{audit_event, security_event, AuditEvent, SecurityEvent},
    models::application::{
        Application, ApplicationFilter, ApplicationStatus, ApplicationSubmission,
        DepartmentDemand, StatusCounts,
    },
};

pub fn router(state: AppState) -> Router<AppState> {
    let intake = Router::new()
        .route("/", post(create_application))
        .route_layer(from_fn_with_state(state.clone(), optional_auth));

    let review = Router::new()
        .route("/", get(list_applications))
        .route("/stats", get(application_stats))
        .route("/:id", get(get_application).delete(delete_application))
        .route("/:id/status", put(update_status))
        .route("/:id/comment", put(update_comment))
        .route_layer(from_fn(require_reviewer))
        .route_layer(from_fn_with_state(state, authenticate));

    intake.merge(review)
}

/// Summary returned after a successful submission
#[derive(Debug, Serialize)]
pub struct CreatedApplication {
    pub application_id: i32,
    pub university_id: String,
    pub status: ApplicationStatus,
}

/// Submit a membership application
///
/// # Endpoint
///
/// ```text
/// POST /api/applications
/// Content-Type: application/json
///
/// {
///   "university_id": "2023/00042",
///   "full_name": "Sara Ali",
///   "email": "sara@uni.edu",
///   "faculty": "Computer Science",
///   "year": "2",
///   "phone_number": "0791234567",
///   "first_choice": 1,
///   "second_choice": 0,
///   "skills": "Rust, SQL",
///   "motivation": "...",
///   "interview": "Online"
/// }
/// ```
///
/// Numbers may be sent as strings. A `second_choice` of `0` means none.
///
/// # Response (201)
///
/// ```json
/// {
///   "success": true,
///   "message": "Application submitted successfully",
///   "data": { "application_id": 12, "university_id": "2023/00042", "status": "pending" }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: a required field is missing or blank
/// - `409 Conflict`: an application with this university ID exists
pub async fn create_application(
    State(state): State<AppState>,
    submitter: Option<CurrentUser>,
    AppJson(submission): AppJson<ApplicationSubmission>,
) -> ApiResult<(StatusCode, Json<Envelope<CreatedApplication>>)> {
    let new = submission.into_new().map_err(|missing| {
        tracing::debug!(?missing, "Rejected incomplete application");
        ApiError::BadRequest("All required fields must be provided".to_string())
    })?;

    let duplicate =
        || ApiError::Conflict("Application with this university ID already exists".to_string());

    if Application::find_by_university_id(&state.db, &new.university_id)
        .await?
        .is_some()
    {
        return Err(duplicate());
    }

    let application = Application::create(&state.db, new)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => duplicate(),
            other => other.into(),
        })?;

    tracing::info!(
        application_id = application.application_id,
        submitted_by = submitter.as_ref().map(CurrentUser::id),
        "Application submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Application submitted successfully",
            CreatedApplication {
                application_id: application.application_id,
                university_id: application.university_id,
                status: application.status,
            },
        )),
    ))
}

/// List response: rows plus an echo of the applied filters
#[derive(Debug, Serialize)]
pub struct ApplicationList {
    pub success: bool,
    pub data: Vec<Application>,
    pub count: usize,
    pub filters: ApplicationFilter,
}

/// List applications, newest first
///
/// # Endpoint
///
/// ```text
/// GET /api/applications?status=approved&faculty=Computer%20Science&search=rust
/// ```
///
/// `first_choice`, `second_choice`, `status`, `faculty` and `year` match
/// exactly; `search` is a case-insensitive substring match over university
/// ID, name, email, phone, skills and motivation.
pub async fn list_applications(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<ApplicationFilter>,
) -> ApiResult<Json<ApplicationList>> {
    let data = Application::list(&state.db, &filter).await?;

    Ok(Json(ApplicationList {
        success: true,
        count: data.len(),
        data,
        filters: filter,
    }))
}

/// Dashboard statistics
#[derive(Debug, Serialize)]
pub struct ApplicationStats {
    pub status: StatusCounts,
    pub departments: Vec<DepartmentDemand>,
}

/// Counts per status and per first-choice department
pub async fn application_stats(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<ApplicationStats>>> {
    let status = Application::status_counts(&state.db).await?;
    let departments = Application::demand_by_department(&state.db).await?;

    Ok(Json(Envelope::data(ApplicationStats {
        status,
        departments,
    })))
}

fn not_found() -> ApiError {
    ApiError::NotFound("Application not found".to_string())
}

/// Fetch a single application
pub async fn get_application(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> ApiResult<Json<Envelope<Application>>> {
    let application = Application::find_by_id(&state.db, id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(Envelope::data(application)))
}

/// Status change request
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: Option<String>,

    /// Shared review passphrase
    #[serde(default)]
    pub password: Option<String>,
}

/// Change an application's review status
///
/// # Endpoint
///
/// ```text
/// PUT /api/applications/12/status
///
/// { "status": "approved", "password": "<review passphrase>" }
/// ```
///
/// Any status may move to any other.
///
/// # Errors
///
/// Checked in this order:
///
/// - `404 Not Found`: unknown application
/// - `400 Bad Request`: no passphrase
/// - `401 Unauthorized`: passphrase doesn't match; nothing is changed
/// - `400 Bad Request`: unknown status
pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(reviewer): CurrentUser,
    ClientMeta(meta): ClientMeta,
    AppPath(id): AppPath<i32>,
    AppJson(req): AppJson<StatusRequest>,
) -> ApiResult<Json<Envelope<Value>>> {
    let current = Application::find_by_id(&state.db, id)
        .await?
        .ok_or_else(not_found)?;

    let password = non_blank(&req.password)
        .ok_or_else(|| ApiError::BadRequest("Password required for status change".to_string()))?;

    if !state.config.review_passphrases.verify(password) {
        security_event(
            SecurityEvent::InvalidReviewPassphrase,
            &meta,
            json!({ "application_id": id, "user_id": reviewer.user_id }),
        );
        return Err(ApiError::Unauthorized("Incorrect password".to_string()));
    }

    let status: ApplicationStatus = req
        .status
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| {
            ApiError::BadRequest(
                "Invalid status. Must be one of: pending, approved, rejected".to_string(),
            )
        })?;

    let updated = Application::update_status(&state.db, id, status)
        .await?
        .ok_or_else(not_found)?;

    audit_event(
        AuditEvent::ApplicationStatusChanged,
        &meta,
        json!({
            "application_id": id,
            "from": current.status,
            "to": updated.status,
            "user_id": reviewer.user_id,
        }),
    );

    Ok(Json(Envelope::with_message(
        format!("Application {} successfully", updated.status),
        json!({
            "application_id": updated.application_id,
            "status": updated.status,
        }),
    )))
}

/// Comment update request; `null` or an absent field clears the comment
#[derive(Debug, Default, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub comment: Option<String>,
}

/// Set or clear the reviewer comment
pub async fn update_comment(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(req): AppJson<CommentRequest>,
) -> ApiResult<Json<Envelope<Value>>> {
    let updated = Application::update_comment(&state.db, id, req.comment)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(Envelope::with_message(
        "Comment updated successfully",
        json!({
            "application_id": updated.application_id,
            "comment": updated.comment,
        }),
    )))
}

/// Permanently delete an application
pub async fn delete_application(
    State(state): State<AppState>,
    CurrentUser(reviewer): CurrentUser,
    ClientMeta(meta): ClientMeta,
    AppPath(id): AppPath<i32>,
) -> ApiResult<Json<Value>> {
    if !Application::delete(&state.db, id).await? {
        return Err(not_found());
    }

    audit_event(
        AuditEvent::ApplicationDeleted,
        &meta,
        json!({ "application_id": id, "user_id": reviewer.user_id }),
    );

    Ok(Json(json!({
        "success": true,
        "message": "Application deleted successfully",
    })))
}
