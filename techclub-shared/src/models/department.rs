//! Club departments.
//!
//! Departments are static seed data (see the `create_departments` migration).
//! Applications, members, board seats and users all reference them by id.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// A club department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Department {
    pub department_id: i32,
    pub name: String,
}

impl Department {
    /// Lists all departments ordered by id
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Department>(
            "SELECT department_id, name FROM departments ORDER BY department_id",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Department>(
            "SELECT department_id, name FROM departments WHERE department_id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
