/// User model and database operations
///
/// Users are the accounts that log in to the club platform. Applicants don't
/// need an account; members and board members get one either by
/// self-registration (inactive until an admin enables it) or by invite-style
/// registration (active immediately).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('member', 'board', 'admin');
///
/// CREATE TABLE users (
///     user_id SERIAL PRIMARY KEY,
///     full_name VARCHAR(100),
///     university_id VARCHAR(20) UNIQUE,
///     profile_picture VARCHAR(255),
///     schedule JSONB,
///     department_id INTEGER REFERENCES departments(department_id),
///     score INTEGER NOT NULL DEFAULT 0,
///     email VARCHAR(150) NOT NULL UNIQUE,
///     password_hash VARCHAR(255),
///     role user_role NOT NULL DEFAULT 'member',
///     is_active BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use techclub_shared::models::user::{User, CreateUser, UserRole};
/// use techclub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     email: "member@uni.edu".to_string(),
///     password_hash: Some("$argon2id$...".to_string()),
///     full_name: Some("Sara Ali".to_string()),
///     university_id: Some("2023/00042".to_string()),
///     role: UserRole::Member,
///     is_active: true,
/// }).await?;
///
/// let found = User::find_by_university_id(&pool, "2023/00042").await?;
/// assert_eq!(found.map(|u| u.user_id), Some(user.user_id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

const COLUMNS: &str = "user_id, full_name, university_id, profile_picture, schedule, \
    department_id, score, email, password_hash, role, is_active, created_at";

/// Account role, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular club member
    Member,

    /// Board member: reviews applications, reads suggestions
    Board,

    /// Full control
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Board => "board",
            UserRole::Admin => "admin",
        }
    }

    /// Parses a requested role, falling back to `Member` for anything unknown
    pub fn parse_or_member(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or(UserRole::Member)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(UserRole::Member),
            "board" => Ok(UserRole::Board),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// User account
///
/// `password_hash` is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub user_id: i32,
    pub full_name: Option<String>,

    /// University ID, `YYYY/NNNNN`. Used as the login handle.
    pub university_id: Option<String>,

    /// File name under the uploads directory
    pub profile_picture: Option<String>,

    /// Free-form weekly availability
    pub schedule: Option<serde_json::Value>,

    pub department_id: Option<i32>,

    /// Leaderboard score
    pub score: i32,

    pub email: String,

    /// Argon2id (or legacy bcrypt) hash. `None` for invited accounts that haven't set one.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    pub role: UserRole,

    /// Inactive accounts cannot log in
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Condensed view returned alongside tokens
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            user_id: self.user_id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            university_id: self.university_id.clone(),
            role: self.role,
            department_id: self.department_id,
            is_active: self.is_active,
        }
    }
}

/// Public subset of a user returned by login and registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: i32,
    pub email: String,
    pub full_name: Option<String>,
    pub university_id: Option<String>,
    pub role: UserRole,
    pub department_id: Option<i32>,
    pub is_active: bool,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,

    /// Already-hashed password (never plaintext)
    pub password_hash: Option<String>,

    pub full_name: Option<String>,
    pub university_id: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
}

/// Profile fields a user may change about themselves
///
/// `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub schedule: Option<serde_json::Value>,
    pub profile_picture: Option<String>,
}

impl UpdateProfile {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.schedule.is_none() && self.profile_picture.is_none()
    }
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns a unique-violation error if the email or university ID is taken.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO users (email, password_hash, full_name, university_id, role, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.full_name)
            .bind(data.university_id)
            .bind(data.role)
            .bind(data.is_active)
            .fetch_one(pool)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE user_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by university ID
    pub async fn find_by_university_id(
        pool: &PgPool,
        university_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE university_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(university_id)
            .fetch_optional(pool)
            .await
    }

    /// True if any account already uses this email or university ID
    pub async fn email_or_university_id_taken(
        pool: &PgPool,
        email: &str,
        university_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let (taken,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 OR university_id = $2)",
        )
        .bind(email)
        .bind(university_id)
        .fetch_one(pool)
        .await?;

        Ok(taken)
    }

    /// Replaces the password hash
    pub async fn update_password(
        pool: &PgPool,
        id: i32,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE user_id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Updates the profile fields that are set in `data`
    ///
    /// Returns the updated user, or `None` if it doesn't exist.
    pub async fn update_profile(
        pool: &PgPool,
        id: i32,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                schedule = COALESCE($3, schedule),
                profile_picture = COALESCE($4, profile_picture)
            WHERE user_id = $1
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(data.full_name)
            .bind(data.schedule)
            .bind(data.profile_picture)
            .fetch_optional(pool)
            .await
    }

    /// Adds `points` to the user's score and returns the new total
    pub async fn add_score(pool: &PgPool, id: i32, points: i32) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "UPDATE users SET score = score + $2 WHERE user_id = $1 RETURNING score",
        )
        .bind(id)
        .bind(points)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|(score,)| score))
    }

    /// Activates or deactivates an account
    pub async fn set_active(pool: &PgPool, id: i32, active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET is_active = $2 WHERE user_id = $1")
            .bind(id)
            .bind(active)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
