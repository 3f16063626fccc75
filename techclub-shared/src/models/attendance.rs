//! Session attendance records.
//!
//! One row per (session, member); marking attendance again overwrites it.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendance {
    pub attendance_id: i32,
    pub session_id: i32,
    pub member_id: i32,
    pub attended: bool,
}

/// Attendance row with the member's name, for the session roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceEntry {
    pub member_id: i32,
    pub full_name: String,
    pub attended: bool,
}

impl Attendance {
    /// Inserts or updates the attendance of a member at a session
    pub async fn mark(
        pool: &PgPool,
        session_id: i32,
        member_id: i32,
        attended: bool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(
            r#"
            INSERT INTO attendance (session_id, member_id, attended)
            VALUES ($1, $2, $3)
            ON CONFLICT (session_id, member_id) DO UPDATE SET attended = EXCLUDED.attended
            RETURNING attendance_id, session_id, member_id, attended
            "#,
        )
        .bind(session_id)
        .bind(member_id)
        .bind(attended)
        .fetch_one(pool)
        .await
    }

    pub async fn list_for_session(
        pool: &PgPool,
        session_id: i32,
    ) -> Result<Vec<AttendanceEntry>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceEntry>(
            r#"
            SELECT a.member_id, m.full_name, a.attended
            FROM attendance a
            JOIN members m ON m.member_id = a.member_id
            WHERE a.session_id = $1
            ORDER BY m.full_name
            "#,
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
    }
}
