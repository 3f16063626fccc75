/// Authentication and role middleware
///
/// - [`authenticate`]: requires a valid bearer token for an existing, active
///   user and attaches [`CurrentUser`] to the request.
/// - [`optional_auth`]: same decode path, never rejects.
/// - [`require_reviewer`] / [`require_admin`]: role allow-lists, layered
///   inside `authenticate`.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use techclub_api::app::AppState;
/// use techclub_api::middleware::auth::{authenticate, require_admin, CurrentUser};
///
/// async fn whoami(CurrentUser(user): CurrentUser) -> String {
///     user.email
/// }
///
/// fn routes(state: AppState) -> Router<AppState> {
///     Router::new()
///         .route("/whoami", get(whoami))
///         .route_layer(middleware::from_fn(require_admin))
///         .route_layer(middleware::from_fn_with_state(state, authenticate))
/// }
/// ```

use crate::{app::AppState, error::ApiError};
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use techclub_shared::{
    audit::{security_event, RequestMeta, SecurityEvent},
    auth::{
        authorization::{require_roles, ADMINS, REVIEWERS},
        jwt,
    },
    models::user::{User, UserRole},
};

/// The authenticated user, without its password hash
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0.user_id
    }

    pub fn role(&self) -> UserRole {
        self.0.role
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

/// Client IP and user agent for audit logging
#[derive(Debug, Clone)]
pub struct ClientMeta(pub RequestMeta);

#[async_trait]
impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientMeta(request_meta(&parts.headers, &parts.extensions)))
    }
}

/// Builds [`RequestMeta`] from `X-Forwarded-For`, the peer address, and `User-Agent`
pub fn request_meta(headers: &HeaderMap, extensions: &axum::http::Extensions) -> RequestMeta {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());

    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    RequestMeta::new(forwarded.or(peer), user_agent)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves a token to an active user
async fn resolve_user(state: &AppState, token: &str) -> Result<User, ApiError> {
    let claims = jwt::validate_token(token, &state.config.jwt.secret)?;

    let mut user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Forbidden("User account is inactive".to_string()));
    }

    user.password_hash = None;
    Ok(user)
}

/// Requires `Authorization: Bearer <jwt>` for an existing, active user
///
/// # Errors
///
/// - `401`: no token, or the user no longer exists
/// - `403`: invalid or expired token, or inactive account
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("Access token required".to_string()))?;

    let user = resolve_user(&state, token).await?;
    tracing::debug!(user_id = user.user_id, role = %user.role, "Authenticated request");

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Attaches [`CurrentUser`] when a valid token for an active user is present
pub async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(req.headers()) {
        match resolve_user(&state, token).await {
            Ok(user) => {
                req.extensions_mut().insert(CurrentUser(user));
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring unusable token"),
        }
    }

    next.run(req).await
}

async fn require(allowed: &[UserRole], req: Request, next: Next) -> Result<Response, ApiError> {
    let role = req.extensions().get::<CurrentUser>().map(CurrentUser::role);

    if let Err(e) = require_roles(role, allowed) {
        if role.is_some() {
            security_event(
                SecurityEvent::InsufficientRole,
                &request_meta(req.headers(), req.extensions()),
                json!({
                    "path": req.uri().path(),
                    "role": role.map(|r| r.as_str()),
                    "required": allowed.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
                }),
            );
        }
        return Err(e.into());
    }

    Ok(next.run(req).await)
}

/// Board members and admins
pub async fn require_reviewer(req: Request, next: Next) -> Result<Response, ApiError> {
    require(REVIEWERS, req, next).await
}

/// Admins only
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    require(ADMINS, req, next).await
}
