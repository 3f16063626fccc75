/// User account endpoints
///
/// # Endpoints
///
/// - `POST /api/users/register` - Invite-style registration (active immediately)
/// - `POST /api/users/login` - Log in
/// - `POST /api/users/logout` - Log out (authenticated)
/// - `GET  /api/users/profile` - Own profile (authenticated)
/// - `PUT  /api/users/profile` - Update own profile, JSON or multipart (authenticated)
/// - `POST /api/users/score` - Add leaderboard points to a user (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson},
    middleware::auth::{authenticate, require_admin, ClientMeta, CurrentUser},
    routes::{
        auth::{check_credentials, issue_token, AuthResponse, LoginFailure, LoginRequest},
        non_blank, validation_error,
    },
};
use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use techclub_shared::{
    audit::{audit_event, AuditEvent},
    auth::password,
    models::{
        lenient,
        user::{CreateUser, UpdateProfile, User, UserRole},
    },
};
use validator::Validate;

/// Largest accepted profile update body
pub const MAX_PROFILE_BODY: usize = 5 * 1024 * 1024;

/// Accepted profile picture extensions
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    let authenticated = Router::new()
        .route("/logout", post(logout))
        .route(
            "/profile",
            get(get_profile)
                .put(update_profile)
                .layer(DefaultBodyLimit::max(MAX_PROFILE_BODY)),
        )
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let admin = Router::new()
        .route("/score", post(add_score))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, authenticate));

    public.merge(authenticated).merge(admin)
}

/// Invite registration request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[serde(default)]
    pub full_name: Option<String>,

    #[serde(default)]
    pub university_id: Option<String>,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: Option<String>,
}

/// Register an active member account
///
/// # Endpoint
///
/// ```text
/// POST /api/users/register
///
/// { "full_name": "Sara Ali", "university_id": "2023/00042", "email": "sara@uni.edu", "password": "..." }
/// ```
///
/// # Response (201)
///
/// ```json
/// { "success": true, "message": "User registered successfully", "user_id": 7 }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing fields, invalid email, or short password
/// - `409 Conflict`: email or university ID already registered
pub async fn register(
    State(state): State<AppState>,
    ClientMeta(meta): ClientMeta,
    AppJson(req): AppJson<RegisterUserRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let (Some(full_name), Some(university_id), Some(email), Some(plain)) = (
        non_blank(&req.full_name),
        non_blank(&req.university_id),
        non_blank(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("All fields are required".to_string()));
    };

    req.validate().map_err(validation_error)?;

    let conflict =
        || ApiError::Conflict("User with this email or university ID already exists".to_string());

    if User::email_or_university_id_taken(&state.db, email, university_id).await? {
        return Err(conflict());
    }

    let user = User::create(
        &state.db,
        CreateUser {
            email: email.to_string(),
            password_hash: Some(password::hash_password(plain)?),
            full_name: Some(full_name.to_string()),
            university_id: Some(university_id.to_string()),
            role: UserRole::Member,
            is_active: true,
        },
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => conflict(),
        other => other.into(),
    })?;

    audit_event(
        AuditEvent::Registration,
        &meta,
        json!({ "user_id": user.user_id, "university_id": university_id, "invited": true }),
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "user_id": user.user_id,
        })),
    ))
}

/// Log in with university ID and password
///
/// # Errors
///
/// - `400 Bad Request`: missing fields
/// - `404 Not Found`: no account with this university ID
/// - `403 Forbidden`: account inactive
/// - `401 Unauthorized`: no password set, or wrong password
pub async fn login(
    State(state): State<AppState>,
    ClientMeta(meta): ClientMeta,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (Some(university_id), Some(candidate)) = (
        non_blank(&req.university_id),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "University ID and password are required".to_string(),
        ));
    };

    let user = match check_credentials(&state, &meta, university_id, candidate).await? {
        Ok(user) => user,
        Err(LoginFailure::UnknownUser) => {
            return Err(ApiError::NotFound("User not found".to_string()))
        }
        Err(LoginFailure::Inactive) => {
            return Err(ApiError::Forbidden("Account is inactive".to_string()))
        }
        Err(LoginFailure::NoPassword) => {
            return Err(ApiError::Unauthorized(
                "Password not set for this account".to_string(),
            ))
        }
        Err(LoginFailure::WrongPassword) => {
            return Err(ApiError::Unauthorized("Invalid password".to_string()))
        }
    };

    let token = issue_token(&state, &user)?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: user.summary(),
    }))
}

/// Log out
pub async fn logout(
    CurrentUser(user): CurrentUser,
    ClientMeta(meta): ClientMeta,
) -> Json<Value> {
    audit_event(AuditEvent::Logout, &meta, json!({ "user_id": user.user_id }));

    Json(json!({ "success": true, "message": "Logged out successfully" }))
}

/// Profile view: the user plus a URL for the picture
#[derive(Debug, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,

    /// `/uploads/<file>` when a picture is set
    pub profile_picture_url: Option<String>,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        let profile_picture_url = user
            .profile_picture
            .as_ref()
            .map(|file| format!("/uploads/{}", file));

        Self {
            user,
            profile_picture_url,
        }
    }
}

/// Own profile
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let user = User::find_by_id(&state.db, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": Profile::from(user) })))
}

/// JSON profile update
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub full_name: Option<String>,

    /// A JSON object, or a string holding one
    #[serde(default)]
    pub schedule: Option<Value>,
}

/// Accepts a schedule as a JSON object/array or as a string containing one
pub(crate) fn parse_schedule(raw: Value) -> ApiResult<Value> {
    let invalid = || ApiError::BadRequest("Invalid schedule format".to_string());

    let value = match raw {
        Value::String(text) => serde_json::from_str(&text).map_err(|_| invalid())?,
        other => other,
    };

    match value {
        Value::Object(_) | Value::Array(_) => Ok(value),
        _ => Err(invalid()),
    }
}

/// Lower-cased extension of an uploaded file name, if it is an accepted image type
pub(crate) fn image_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();

    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Resolves a stored picture name inside the uploads directory
fn upload_path(uploads_dir: &Path, file: &str) -> Option<PathBuf> {
    Path::new(file).file_name().map(|name| uploads_dir.join(name))
}

async fn remove_upload(uploads_dir: &Path, file: &str) {
    if let Some(path) = upload_path(uploads_dir, file) {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove upload");
            }
        }
    }
}

/// A picture upload held in memory until the rest of the form is valid
pub(crate) struct PendingPicture {
    ext: String,
    bytes: axum::body::Bytes,
}

/// Reads a multipart profile form without touching the disk
///
/// A repeated `profile_picture` field replaces the earlier one.
pub(crate) async fn read_multipart(
    mut multipart: Multipart,
) -> ApiResult<(UpdateProfile, Option<PendingPicture>)> {
    let mut update = UpdateProfile::default();
    let mut picture = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("full_name") => {
                let text = field.text().await?;
                update.full_name = Some(text.trim().to_string()).filter(|t| !t.is_empty());
            }
            Some("schedule") => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    update.schedule = Some(parse_schedule(Value::String(text))?);
                }
            }
            Some("profile_picture") => {
                let ext = field
                    .file_name()
                    .and_then(image_extension)
                    .ok_or_else(|| {
                        ApiError::BadRequest(
                            "Only image files are allowed (jpg, jpeg, png, gif, webp)".to_string(),
                        )
                    })?;

                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    picture = Some(PendingPicture { ext, bytes });
                }
            }
            _ => {}
        }
    }

    Ok((update, picture))
}

/// Writes an accepted picture and returns its stored file name
async fn store_picture(uploads_dir: &Path, picture: PendingPicture) -> ApiResult<String> {
    tokio::fs::create_dir_all(uploads_dir).await?;

    let file_name = format!("profile-{}.{}", uuid::Uuid::new_v4(), picture.ext);
    tokio::fs::write(uploads_dir.join(&file_name), &picture.bytes).await?;
    tracing::debug!(file = %file_name, size = picture.bytes.len(), "Stored profile picture");

    Ok(file_name)
}

/// Update own profile
///
/// # Endpoint
///
/// ```text
/// PUT /api/users/profile
/// Content-Type: application/json
///
/// { "full_name": "Sara Ali", "schedule": { "sun": ["10:00-12:00"] } }
/// ```
///
/// or `multipart/form-data` with fields `full_name`, `schedule` and the file
/// `profile_picture`. A new picture replaces (and deletes) the previous one.
///
/// # Errors
///
/// - `400 Bad Request`: invalid schedule, non-image upload, or malformed body
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    request: Request,
) -> ApiResult<Json<Value>> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let uploads_dir = state.config.storage.uploads_dir.clone();

    let update = if is_multipart {
        let multipart = Multipart::from_request(request, &state).await?;
        let (mut update, picture) = read_multipart(multipart).await?;
        if let Some(picture) = picture {
            update.profile_picture = Some(store_picture(&uploads_dir, picture).await?);
        }
        update
    } else {
        let AppJson(req) = AppJson::<ProfileUpdateRequest>::from_request(request, &state).await?;
        UpdateProfile {
            full_name: non_blank(&req.full_name).map(str::to_string),
            schedule: req.schedule.map(parse_schedule).transpose()?,
            profile_picture: None,
        }
    };

    let new_picture = update.profile_picture.clone();

    let updated = match User::update_profile(&state.db, user.user_id, update).await {
        Ok(Some(updated)) => updated,
        result => {
            if let Some(file) = &new_picture {
                remove_upload(&uploads_dir, file).await;
            }
            return match result {
                Err(e) => Err(e.into()),
                _ => Err(ApiError::NotFound("User not found".to_string())),
            };
        }
    };

    if let (Some(old), Some(new)) = (&user.profile_picture, &new_picture) {
        if old != new {
            remove_upload(&uploads_dir, old).await;
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "data": Profile::from(updated),
    })))
}

/// Score adjustment request
#[derive(Debug, Default, Deserialize)]
pub struct ScoreRequest {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub user_id: Option<i32>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub points: Option<i32>,
}

/// Add points to a user's score
///
/// # Endpoint
///
/// ```text
/// POST /api/users/score
///
/// { "user_id": 7, "points": 10 }
/// ```
///
/// # Response
///
/// ```json
/// { "success": true, "message": "Score updated successfully", "new_score": 25 }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing fields, or negative / non-numeric points
/// - `403 Forbidden`: caller is not an admin
/// - `404 Not Found`: unknown user
pub async fn add_score(
    State(state): State<AppState>,
    AppJson(req): AppJson<ScoreRequest>,
) -> ApiResult<Json<Value>> {
    let (Some(user_id), Some(points)) = (req.user_id, req.points) else {
        return Err(ApiError::BadRequest(
            "User ID and points are required".to_string(),
        ));
    };

    if points < 0 {
        return Err(ApiError::BadRequest(
            "Points must be a non-negative number".to_string(),
        ));
    }

    let new_score = User::add_score(&state.db, user_id, points)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id, points, new_score, "Score updated");

    Ok(Json(json!({
        "success": true,
        "message": "Score updated successfully",
        "new_score": new_score,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_parse_schedule() {
        let obj = json!({ "sun": ["10:00-12:00"] });
        assert_eq!(parse_schedule(obj.clone()).unwrap(), obj);
        assert_eq!(
            parse_schedule(Value::String(r#"{"mon": []}"#.to_string())).unwrap(),
            json!({ "mon": [] })
        );
        assert!(parse_schedule(Value::String("not json".to_string())).is_err());
        assert!(parse_schedule(json!(42)).is_err());
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("me.JPG").as_deref(), Some("jpg"));
        assert_eq!(image_extension("avatar.webp").as_deref(), Some("webp"));
        assert_eq!(image_extension("script.js"), None);
        assert_eq!(image_extension("no-extension"), None);
    }

    #[test]
    fn test_upload_path_stays_in_directory() {
        let dir = Path::new("/srv/uploads");
        assert_eq!(
            upload_path(dir, "../../etc/passwd"),
            Some(PathBuf::from("/srv/uploads/passwd"))
        );
        assert_eq!(upload_path(dir, ".."), None);
    }

    #[test]
    fn test_profile_picture_url() {
        let user = User {
            user_id: 1,
            full_name: None,
            university_id: None,
            profile_picture: Some("profile-abc.png".to_string()),
            schedule: None,
            department_id: None,
            score: 0,
            email: "a@uni.edu".to_string(),
            password_hash: Some("hash".to_string()),
            role: UserRole::Member,
            is_active: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(Profile::from(user)).unwrap();
        assert_eq!(json["profile_picture_url"], "/uploads/profile-abc.png");
        assert_eq!(json["email"], "a@uni.edu");
        assert!(json.get("password_hash").is_none());
    }

    const BOUNDARY: &str = "techclub-form";

    /// Builds a multipart body from `(name, file_name, content)` parts
    async fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Multipart {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    name, file
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        let request = Request::builder()
            .method("PUT")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(axum::body::Body::from(body))
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_multipart_form_is_parsed_before_storing() {
        let form = multipart(&[
            ("full_name", None, " Sara Ali "),
            ("profile_picture", Some("first.png"), "one"),
            ("profile_picture", Some("second.JPG"), "two"),
            ("schedule", None, r#"{"sun": ["10:00-12:00"]}"#),
        ])
        .await;

        let (update, picture) = read_multipart(form).await.unwrap();
        assert_eq!(update.full_name.as_deref(), Some("Sara Ali"));
        assert_eq!(update.schedule, Some(json!({ "sun": ["10:00-12:00"] })));
        assert_eq!(update.profile_picture, None);

        let picture = picture.unwrap();
        assert_eq!(picture.ext, "jpg");
        assert_eq!(&picture.bytes[..], b"two");
    }

    #[tokio::test]
    async fn test_bad_field_after_picture_fails_whole_form() {
        let form = multipart(&[
            ("profile_picture", Some("me.png"), "image"),
            ("schedule", None, "not json"),
        ])
        .await;
        assert!(matches!(read_multipart(form).await, Err(ApiError::BadRequest(_))));

        let form = multipart(&[
            ("profile_picture", Some("me.png"), "image"),
            ("profile_picture", Some("run.sh"), "echo"),
        ])
        .await;
        assert!(matches!(read_multipart(form).await, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_store_picture_writes_into_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let picture = PendingPicture {
            ext: "png".to_string(),
            bytes: axum::body::Bytes::from_static(b"png-bytes"),
        };

        let name = store_picture(dir.path(), picture).await.unwrap();
        assert!(name.starts_with("profile-") && name.ends_with(".png"));
        assert_eq!(std::fs::read(dir.path().join(&name)).unwrap(), b"png-bytes");
    }

    #[test]
    fn test_score_request_accepts_strings() {
        let req: ScoreRequest = serde_json::from_str(r#"{"user_id": "7", "points": 5}"#).unwrap();
        assert_eq!(req.user_id, Some(7));
        assert_eq!(req.points, Some(5));

        assert!(serde_json::from_str::<ScoreRequest>(r#"{"user_id": 7, "points": "ten"}"#).is_err());
    }
}
