//! Public club events.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub event_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub name: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
}

impl Event {
    pub async fn create(pool: &PgPool, data: CreateEvent) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (name, description, event_date)
            VALUES ($1, $2, $3)
            RETURNING event_id, name, description, event_date, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.event_date)
        .fetch_one(pool)
        .await
    }

    /// Lists events with upcoming ones first (soonest first), then past events (most recent first)
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT event_id, name, description, event_date, created_at
            FROM events
            ORDER BY (event_date < CURRENT_DATE),
                     CASE WHEN event_date >= CURRENT_DATE THEN event_date END ASC,
                     event_date DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
