/// Member model and the application promotion operation
///
/// A member is an accepted applicant. Members are created from approved
/// applications by [`Member::promote_approved_applications`] and are assigned
/// to the department the applicant chose first.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE members (
///     member_id SERIAL PRIMARY KEY,
///     university_id VARCHAR(20) NOT NULL UNIQUE,
///     full_name VARCHAR(100) NOT NULL,
///     email VARCHAR(150) NOT NULL,
///     faculty VARCHAR(100) NOT NULL,
///     year INTEGER NOT NULL CHECK (year BETWEEN 1 AND 5),
///     phone_number VARCHAR(20) NOT NULL,
///     department_id INTEGER NOT NULL REFERENCES departments(department_id),
///     user_id INTEGER REFERENCES users(user_id) ON DELETE SET NULL,
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     schedule JSONB
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::application::{Application, ApplicationStatus};
use super::department::Department;

const COLUMNS: &str = "member_id, university_id, full_name, email, faculty, year, \
    phone_number, department_id, user_id, joined_at, schedule";

/// An accepted club member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub member_id: i32,
    pub university_id: String,
    pub full_name: String,
    pub email: String,
    pub faculty: String,

    /// Study year, 1 to 5
    pub year: i32,

    pub phone_number: String,
    pub department_id: i32,

    /// Linked account, once the member registers
    pub user_id: Option<i32>,

    pub joined_at: DateTime<Utc>,
    pub schedule: Option<serde_json::Value>,
}

/// Input for creating a member
#[derive(Debug, Clone)]
pub struct CreateMember {
    pub university_id: String,
    pub full_name: String,
    pub email: String,
    pub faculty: String,
    pub year: i32,
    pub phone_number: String,
    pub department_id: i32,
}

impl From<&Application> for CreateMember {
    fn from(app: &Application) -> Self {
        CreateMember {
            university_id: app.university_id.clone(),
            full_name: app.full_name.clone(),
            email: app.email.clone(),
            faculty: app.faculty.clone(),
            year: app.year,
            phone_number: app.phone_number.clone(),
            department_id: app.first_choice,
        }
    }
}

/// Why an approved application could not be promoted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionError {
    pub application_id: i32,
    pub university_id: String,
    pub full_name: String,
    pub error: String,
}

/// Outcome of a promotion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionReport {
    /// Approved applications considered
    pub total: usize,

    /// Members created
    pub created: usize,

    /// Skipped because a member with the same university ID already exists
    pub skipped: usize,

    pub errors: Vec<PromotionError>,
}

impl PromotionReport {
    fn fail(&mut self, app: &Application, error: impl Into<String>) {
        self.errors.push(PromotionError {
            application_id: app.application_id,
            university_id: app.university_id.clone(),
            full_name: app.full_name.clone(),
            error: error.into(),
        });
    }
}

impl Member {
    pub async fn create(pool: &PgPool, data: CreateMember) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO members (
                university_id, full_name, email, faculty, year, phone_number, department_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, Member>(&query)
            .bind(data.university_id)
            .bind(data.full_name)
            .bind(data.email)
            .bind(data.faculty)
            .bind(data.year)
            .bind(data.phone_number)
            .bind(data.department_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM members WHERE member_id = $1");
        sqlx::query_as::<_, Member>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_university_id(
        pool: &PgPool,
        university_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM members WHERE university_id = $1");
        sqlx::query_as::<_, Member>(&query)
            .bind(university_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists members, optionally restricted to one department, by name
    pub async fn list(pool: &PgPool, department_id: Option<i32>) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM members \
             WHERE ($1::INTEGER IS NULL OR department_id = $1) \
             ORDER BY full_name"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(department_id)
            .fetch_all(pool)
            .await
    }

    /// Creates a member for every approved application that isn't one yet
    ///
    /// Each application is handled independently: an application whose
    /// university ID already belongs to a member is skipped, one whose first
    /// choice is not an existing department is reported as an error, and a
    /// failed insert is reported without aborting the run.
    ///
    /// # Errors
    ///
    /// Only fails if the approved applications can't be loaded.
    pub async fn promote_approved_applications(
        pool: &PgPool,
    ) -> Result<PromotionReport, sqlx::Error> {
        let approved = Application::list_by_status(pool, ApplicationStatus::Approved).await?;

        let mut report = PromotionReport {
            total: approved.len(),
            ..Default::default()
        };

        for app in &approved {
            match Self::promote_one(pool, app).await {
                Ok(Promotion::Created(member)) => {
                    tracing::info!(
                        member_id = member.member_id,
                        university_id = %member.university_id,
                        department_id = member.department_id,
                        "Promoted application to member"
                    );
                    report.created += 1;
                }
                Ok(Promotion::AlreadyMember) => {
                    tracing::debug!(university_id = %app.university_id, "Member already exists");
                    report.skipped += 1;
                }
                Ok(Promotion::InvalidDepartment) => {
                    tracing::warn!(
                        application_id = app.application_id,
                        first_choice = app.first_choice,
                        "Approved application has an invalid department"
                    );
                    report.fail(app, format!("Invalid department_id: {}", app.first_choice));
                }
                Err(e) => {
                    tracing::error!(
                        application_id = app.application_id,
                        error = %e,
                        "Failed to promote application"
                    );
                    report.fail(app, e.to_string());
                }
            }
        }

        Ok(report)
    }

    async fn promote_one(pool: &PgPool, app: &Application) -> Result<Promotion, sqlx::Error> {
        if Self::find_by_university_id(pool, &app.university_id).await?.is_some() {
            return Ok(Promotion::AlreadyMember);
        }

        if Department::find_by_id(pool, app.first_choice).await?.is_none() {
            return Ok(Promotion::InvalidDepartment);
        }

        let member = Self::create(pool, CreateMember::from(app)).await?;
        Ok(Promotion::Created(member))
    }
}

enum Promotion {
    Created(Member),
    AlreadyMember,
    InvalidDepartment,
}
