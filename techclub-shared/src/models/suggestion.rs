//! Member suggestions box.
//!
//! Anonymous suggestions still record the author but never expose it when listed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Suggestion {
    pub suggestion_id: i32,
    pub member_id: i32,
    pub suggestion: String,
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

/// A suggestion as shown to the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionView {
    pub suggestion_id: i32,

    /// `None` for anonymous suggestions
    pub member_id: Option<i32>,

    pub suggestion: String,
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Suggestion> for SuggestionView {
    fn from(s: Suggestion) -> Self {
        SuggestionView {
            suggestion_id: s.suggestion_id,
            member_id: (!s.anonymous).then_some(s.member_id),
            suggestion: s.suggestion,
            anonymous: s.anonymous,
            created_at: s.created_at,
        }
    }
}

impl Suggestion {
    pub async fn create(
        pool: &PgPool,
        member_id: i32,
        suggestion: &str,
        anonymous: bool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Suggestion>(
            r#"
            INSERT INTO suggestions (member_id, suggestion, anonymous)
            VALUES ($1, $2, $3)
            RETURNING suggestion_id, member_id, suggestion, anonymous, created_at
            "#,
        )
        .bind(member_id)
        .bind(suggestion)
        .bind(anonymous)
        .fetch_one(pool)
        .await
    }

    /// Lists suggestions newest first, with anonymous authors hidden
    pub async fn list(pool: &PgPool) -> Result<Vec<SuggestionView>, sqlx::Error> {
        let rows = sqlx::query_as::<_, Suggestion>(
            r#"
            SELECT suggestion_id, member_id, suggestion, anonymous, created_at
            FROM suggestions
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(SuggestionView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(anonymous: bool) -> Suggestion {
        Suggestion {
            suggestion_id: 1,
            member_id: 12,
            suggestion: "More Rust workshops".to_string(),
            anonymous,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_anonymous_hides_member() {
        let view = SuggestionView::from(suggestion(true));
        assert_eq!(view.member_id, None);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json["member_id"].is_null());
    }

    #[test]
    fn test_named_keeps_member() {
        let view = SuggestionView::from(suggestion(false));
        assert_eq!(view.member_id, Some(12));
    }
}
