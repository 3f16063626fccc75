//! Workshop and talk sessions.
//!
//! Attendance for a session lives in [`super::attendance`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

const COLUMNS: &str = "session_id, title, speaker, location, description, date, created_at";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub session_id: i32,
    pub title: String,
    pub speaker: String,
    pub location: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSession {
    pub title: String,
    pub speaker: String,
    pub location: String,
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl Session {
    pub async fn create(pool: &PgPool, data: CreateSession) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (title, speaker, location, description, date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(data.title)
            .bind(data.speaker)
            .bind(data.location)
            .bind(data.description)
            .bind(data.date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE session_id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists sessions, most recent first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions ORDER BY date DESC, session_id DESC");
        sqlx::query_as::<_, Session>(&query).fetch_all(pool).await
    }
}
