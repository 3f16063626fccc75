/// API route handlers
///
/// Each resource module exposes a `router(state)` that is nested under `/api`
/// by [`crate::app::build_router`]:
///
/// - `applications`: intake form and review dashboard
/// - `auth`: login, registration, password change, token checks
/// - `users`: invite registration, profiles, scores
/// - `departments`, `board`, `members`, `events`, `sponsors`, `leaderboard`,
///   `sessions`, `suggestions`: club data
/// - `health`: liveness and database connectivity (mounted at `/health`)

pub mod applications;
pub mod auth;
pub mod board;
pub mod departments;
pub mod events;
pub mod health;
pub mod leaderboard;
pub mod members;
pub mod sessions;
pub mod sponsors;
pub mod suggestions;
pub mod users;

use crate::error::{ApiError, FieldError};
use serde::Serialize;

/// Standard success body: `{ "success": true, "message"?: ..., "data": ... }`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub data: T,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// Converts `validator` failures into a 400 with per-field details
pub(crate) fn validation_error(errors: validator::ValidationErrors) -> ApiError {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                FieldError::new(
                    field.to_string(),
                    error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                )
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field));
    ApiError::Validation(details)
}

/// Treats `None` and blank strings alike
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
        password: String,
    }

    #[test]
    fn test_validation_error_details() {
        let form = Form {
            email: "not-an-email".to_string(),
            password: "123".to_string(),
        };

        match validation_error(form.validate().unwrap_err()) {
            ApiError::Validation(details) => {
                assert_eq!(details.len(), 2);
                assert_eq!(details[0], FieldError::new("email", "Invalid email format"));
                assert_eq!(details[1].field, "password");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(&None), None);
        assert_eq!(non_blank(&Some("   ".to_string())), None);
        assert_eq!(non_blank(&Some(" x ".to_string())), Some("x"));
    }

    #[test]
    fn test_envelope_omits_missing_message() {
        let body = serde_json::to_value(Envelope::data(3)).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "data": 3 }));
    }
}
