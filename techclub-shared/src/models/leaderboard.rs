//! Member points leaderboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub leaderboard_id: i32,
    pub member_id: i32,
    pub points: i32,
    pub last_updated: DateTime<Utc>,
}

/// Ranked leaderboard row with the member's name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaderboardStanding {
    pub member_id: i32,
    pub full_name: String,
    pub department_id: i32,
    pub points: i32,
    pub last_updated: DateTime<Utc>,
}

impl LeaderboardEntry {
    /// Adds points to a member, creating their row on first award
    pub async fn award(pool: &PgPool, member_id: i32, points: i32) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            INSERT INTO leaderboard (member_id, points)
            VALUES ($1, $2)
            ON CONFLICT (member_id) DO UPDATE
                SET points = leaderboard.points + EXCLUDED.points,
                    last_updated = NOW()
            RETURNING leaderboard_id, member_id, points, last_updated
            "#,
        )
        .bind(member_id)
        .bind(points)
        .fetch_one(pool)
        .await
    }

    /// Standings, highest points first
    pub async fn standings(pool: &PgPool) -> Result<Vec<LeaderboardStanding>, sqlx::Error> {
        sqlx::query_as::<_, LeaderboardStanding>(
            r#"
            SELECT l.member_id, m.full_name, m.department_id, l.points, l.last_updated
            FROM leaderboard l
            JOIN members m ON m.member_id = l.member_id
            ORDER BY l.points DESC, m.full_name
            "#,
        )
        .fetch_all(pool)
        .await
    }
}
