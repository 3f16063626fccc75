/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/login` - Log in with university ID and password
/// - `POST /api/auth/register` - Self-registration (inactive until approved)
/// - `POST /api/auth/logout` - Log out (authenticated)
/// - `POST /api/auth/change-password` - Change password (authenticated)
/// - `GET  /api/auth/verify` - Check a token (authenticated)
/// - `GET  /api/auth/me` - Current user, fresh from the database (authenticated)
///
/// Tokens are stateless JWTs; logout only records the event.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson},
    middleware::auth::{authenticate, ClientMeta, CurrentUser},
    routes::{non_blank, validation_error},
};
use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use techclub_shared::{
    audit::{audit_event, security_event, AuditEvent, RequestMeta, SecurityEvent},
    auth::{identity, jwt, password},
    models::user::{CreateUser, User, UserRole, UserSummary},
};
use validator::Validate;

pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(login))
        .route("/register", post(register));

    let authenticated = Router::new()
        .route("/logout", post(logout))
        .route("/change-password", post(change_password))
        .route("/verify", get(verify_token))
        .route("/me", get(me))
        .route_layer(from_fn_with_state(state, authenticate));

    public.merge(authenticated)
}

/// Signs a token for `user` with the configured expiry
pub(crate) fn issue_token(state: &AppState, user: &User) -> ApiResult<String> {
    let claims = jwt::Claims::new(
        user.user_id,
        user.role,
        user.department_id,
        state.config.jwt.expires_in,
    );
    Ok(jwt::create_token(&claims, &state.config.jwt.secret)?)
}

/// Token plus the public view of the user
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

/// Login request
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub university_id: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// How a password login ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoginFailure {
    UnknownUser,
    Inactive,
    NoPassword,
    WrongPassword,
}

impl LoginFailure {
    fn reason(&self) -> &'static str {
        match self {
            LoginFailure::UnknownUser => "user_not_found",
            LoginFailure::Inactive => "account_inactive",
            LoginFailure::NoPassword => "password_not_set",
            LoginFailure::WrongPassword => "invalid_password",
        }
    }
}

/// Checks a university ID and password, logging the outcome
///
/// Inactive accounts are rejected before the password is looked at.
pub(crate) async fn check_credentials(
    state: &AppState,
    meta: &RequestMeta,
    university_id: &str,
    candidate: &str,
) -> ApiResult<Result<User, LoginFailure>> {
    let failure = |reason: LoginFailure| {
        audit_event(
            AuditEvent::LoginFailure,
            meta,
            json!({ "university_id": university_id, "reason": reason.reason() }),
        );
        Ok(Err(reason))
    };

    let Some(user) = User::find_by_university_id(&state.db, university_id).await? else {
        return failure(LoginFailure::UnknownUser);
    };

    if !user.is_active {
        security_event(
            SecurityEvent::InactiveLoginAttempt,
            meta,
            json!({ "university_id": university_id, "user_id": user.user_id }),
        );
        return failure(LoginFailure::Inactive);
    }

    let Some(hash) = user.password_hash.as_deref() else {
        return failure(LoginFailure::NoPassword);
    };

    if !password::verify_password(candidate, hash)? {
        return failure(LoginFailure::WrongPassword);
    }

    audit_event(
        AuditEvent::LoginSuccess,
        meta,
        json!({ "university_id": university_id, "user_id": user.user_id }),
    );
    Ok(Ok(user))
}

/// Log in
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
///
/// { "university_id": "2023/00042", "password": "..." }
/// ```
///
/// # Response
///
/// ```json
/// { "success": true, "message": "Login successful", "token": "eyJ...", "user": { ... } }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing fields, or university ID not `YYYY/NNNNN`
/// - `401 Unauthorized`: unknown user, no password set, or wrong password
/// - `403 Forbidden`: account inactive (whatever the password)
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

    if !identity::is_valid_university_id(university_id) {
        return Err(ApiError::BadRequest(
            "Invalid university ID format. Expected YYYY/NNNNN".to_string(),
        ));
    }

    let user = match check_credentials(&state, &meta, university_id, candidate).await? {
        Ok(user) => user,
        Err(LoginFailure::Inactive) => {
            return Err(ApiError::Forbidden(
                "Account is inactive. Please contact an administrator.".to_string(),
            ))
        }
        Err(LoginFailure::NoPassword) => {
            return Err(ApiError::Unauthorized(
                "Password not set for this account".to_string(),
            ))
        }
        Err(LoginFailure::UnknownUser | LoginFailure::WrongPassword) => {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()))
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

/// Self-registration request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: Option<String>,

    /// `member`, `board` or `admin`; anything else becomes `member`
    #[serde(default)]
    pub role: Option<String>,
}

/// Register an account
///
/// The account starts inactive and cannot log in until an admin enables it.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
///
/// { "email": "sara@uni.edu", "password": "...", "role": "member" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing fields, invalid email, or short password
/// - `409 Conflict`: email already registered
pub async fn register(
    State(state): State<AppState>,
    ClientMeta(meta): ClientMeta,
    AppJson(req): AppJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let (Some(email), Some(plain)) = (
        non_blank(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("Email and password are required".to_string()));
    };

    req.validate().map_err(validation_error)?;

    let conflict = || ApiError::Conflict("User with this email already exists".to_string());

    if User::find_by_email(&state.db, email).await?.is_some() {
        return Err(conflict());
    }

    let role = UserRole::parse_or_member(req.role.as_deref());
    let password_hash = password::hash_password(plain)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: email.to_string(),
            password_hash: Some(password_hash),
            full_name: None,
            university_id: None,
            role,
            is_active: false,
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
        json!({ "user_id": user.user_id, "email": user.email, "role": user.role }),
    );

    let token = issue_token(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully. Account pending activation.".to_string(),
            token,
            user: user.summary(),
        }),
    ))
}

/// Log out
///
/// Tokens are not revoked server-side; clients drop theirs.
pub async fn logout(
    CurrentUser(user): CurrentUser,
    ClientMeta(meta): ClientMeta,
) -> Json<Value> {
    audit_event(AuditEvent::Logout, &meta, json!({ "user_id": user.user_id }));

    Json(json!({ "success": true, "message": "Logged out successfully" }))
}

/// Password change request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

/// Change the caller's password
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/change-password
///
/// { "currentPassword": "...", "newPassword": "..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing fields or new password too short
/// - `401 Unauthorized`: current password is wrong
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ClientMeta(meta): ClientMeta,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> ApiResult<Json<Value>> {
    let (Some(current), Some(new)) = (
        req.current_password.as_deref().filter(|p| !p.is_empty()),
        req.new_password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "Current password and new password are required".to_string(),
        ));
    };

    password::validate_password_length(new).map_err(ApiError::BadRequest)?;

    // CurrentUser carries no hash
    let stored = User::find_by_id(&state.db, user.user_id)
        .await?
        .and_then(|u| u.password_hash)
        .ok_or_else(|| ApiError::Unauthorized("Current password is incorrect".to_string()))?;

    if !password::verify_password(current, &stored)? {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let hash = password::hash_password(new)?;
    User::update_password(&state.db, user.user_id, &hash).await?;

    audit_event(
        AuditEvent::PasswordChanged,
        &meta,
        json!({ "user_id": user.user_id }),
    );

    Ok(Json(json!({ "success": true, "message": "Password changed successfully" })))
}

/// Echo the authenticated user
pub async fn verify_token(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Token is valid",
        "user": user.summary(),
    }))
}

/// Current user, reloaded from the database
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let user = User::find_by_id(&state.db, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": user })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_password_field_names() {
        let req: ChangePasswordRequest = serde_json::from_str(
            r#"{"currentPassword": "old-secret", "newPassword": "new-secret"}"#,
        )
        .unwrap();
        assert_eq!(req.current_password.as_deref(), Some("old-secret"));
        assert_eq!(req.new_password.as_deref(), Some("new-secret"));
    }

    #[test]
    fn test_register_validation() {
        let req = RegisterRequest {
            email: Some("sara@uni.edu".to_string()),
            password: Some("123456".to_string()),
            role: None,
        };
        assert!(req.validate().is_ok());

        let req = RegisterRequest {
            email: Some("not-an-email".to_string()),
            password: Some("12345".to_string()),
            role: Some("superuser".to_string()),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_failure_reasons() {
        assert_eq!(LoginFailure::Inactive.reason(), "account_inactive");
        assert_eq!(LoginFailure::WrongPassword.reason(), "invalid_password");
    }
}
