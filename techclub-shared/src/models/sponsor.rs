//! Club sponsors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sponsor {
    pub sponsor_id: i32,
    pub name: String,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSponsor {
    pub name: String,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
}

impl Sponsor {
    pub async fn create(pool: &PgPool, data: CreateSponsor) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Sponsor>(
            r#"
            INSERT INTO sponsors (name, logo_url, website_url)
            VALUES ($1, $2, $3)
            RETURNING sponsor_id, name, logo_url, website_url, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.logo_url)
        .bind(data.website_url)
        .fetch_one(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Sponsor>(
            "SELECT sponsor_id, name, logo_url, website_url, created_at FROM sponsors ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }
}
