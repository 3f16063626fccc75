/// Membership application model and review queries
///
/// Applications are submitted through the public intake form and reviewed by
/// the board. Reviewers filter and search the list, move applications between
/// statuses, and leave interview comments.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE application_status AS ENUM ('pending', 'approved', 'rejected');
///
/// CREATE TABLE applications (
///     application_id SERIAL PRIMARY KEY,
///     university_id VARCHAR(20) NOT NULL UNIQUE,
///     full_name VARCHAR(100) NOT NULL,
///     email VARCHAR(150) NOT NULL,
///     faculty VARCHAR(100) NOT NULL,
///     year INTEGER NOT NULL,
///     phone_number VARCHAR(20) NOT NULL,
///     first_choice INTEGER NOT NULL REFERENCES departments(department_id),
///     second_choice INTEGER REFERENCES departments(department_id),
///     skills TEXT NOT NULL,
///     motivation TEXT NOT NULL,
///     interview TEXT NOT NULL,
///     status application_status NOT NULL DEFAULT 'pending',
///     comment TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use techclub_shared::models::application::{Application, ApplicationFilter, ApplicationStatus};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let filter = ApplicationFilter {
///     status: Some(ApplicationStatus::Approved),
///     faculty: Some("Computer Science".to_string()),
///     ..Default::default()
/// };
///
/// for app in Application::list(&pool, &filter).await? {
///     println!("{} ({})", app.full_name, app.university_id);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::fmt;
use std::str::FromStr;

use super::lenient;

const COLUMNS: &str = "application_id, university_id, full_name, email, faculty, year, \
    phone_number, first_choice, second_choice, skills, motivation, interview, status, \
    comment, created_at";

/// Columns matched by the free-text `search` filter. Comments are never searched.
const SEARCH_COLUMNS: [&str; 6] = [
    "university_id",
    "full_name",
    "email",
    "phone_number",
    "skills",
    "motivation",
];

/// Review status of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Submitted and awaiting review
    Pending,

    /// Accepted; eligible for promotion to member
    Approved,

    /// Declined
    Rejected,
}

impl ApplicationStatus {
    /// All statuses, in review order
    pub const ALL: [ApplicationStatus; 3] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status '{0}': expected pending, approved, or rejected")]
pub struct InvalidStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }
}

/// A submitted membership application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub application_id: i32,

    /// University ID, `YYYY/NNNNN`. Unique across applications.
    pub university_id: String,

    pub full_name: String,
    pub email: String,
    pub faculty: String,
    pub year: i32,
    pub phone_number: String,

    /// Preferred department (FK `departments.department_id`)
    pub first_choice: i32,

    /// Fallback department, if any
    pub second_choice: Option<i32>,

    pub skills: String,
    pub motivation: String,

    /// Applicant's interview availability / answers
    pub interview: String,

    pub status: ApplicationStatus,

    /// Reviewer notes from the interview
    pub comment: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Application form payload as submitted by the intake form
///
/// Every field is optional at the wire level so that missing fields can be
/// reported together instead of failing deserialization on the first one.
/// Numbers may arrive as JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub university_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub first_choice: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub second_choice: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub motivation: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub interview: Option<String>,
}

/// A fully validated application ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub university_id: String,
    pub full_name: String,
    pub email: String,
    pub faculty: String,
    pub year: i32,
    pub phone_number: String,
    pub first_choice: i32,
    pub second_choice: Option<i32>,
    pub skills: String,
    pub motivation: String,
    pub interview: String,
}

impl ApplicationSubmission {
    /// Converts the submission into a [`NewApplication`]
    ///
    /// # Errors
    ///
    /// Returns the names of every required field that is missing or blank.
    /// `second_choice` is optional; a value of `0` is treated as "none".
    pub fn into_new(self) -> Result<NewApplication, Vec<&'static str>> {
        let mut missing = Vec::new();

        fn take<T>(value: Option<T>, name: &'static str, missing: &mut Vec<&'static str>) -> Option<T> {
            if value.is_none() {
                missing.push(name);
            }
            value
        }

        let university_id = take(self.university_id, "university_id", &mut missing);
        let full_name = take(self.full_name, "full_name", &mut missing);
        let email = take(self.email, "email", &mut missing);
        let faculty = take(self.faculty, "faculty", &mut missing);
        let year = take(self.year, "year", &mut missing);
        let phone_number = take(self.phone_number, "phone_number", &mut missing);
        let first_choice = take(self.first_choice.filter(|id| *id != 0), "first_choice", &mut missing);
        let skills = take(self.skills, "skills", &mut missing);
        let motivation = take(self.motivation, "motivation", &mut missing);
        let interview = take(self.interview, "interview", &mut missing);

        match (
            university_id,
            full_name,
            email,
            faculty,
            year,
            phone_number,
            first_choice,
            skills,
            motivation,
            interview,
        ) {
            (
                Some(university_id),
                Some(full_name),
                Some(email),
                Some(faculty),
                Some(year),
                Some(phone_number),
                Some(first_choice),
                Some(skills),
                Some(motivation),
                Some(interview),
            ) => Ok(NewApplication {
                university_id,
                full_name,
                email,
                faculty,
                year,
                phone_number,
                first_choice,
                second_choice: self.second_choice.filter(|id| *id != 0),
                skills,
                motivation,
                interview,
            }),
            _ => Err(missing),
        }
    }
}

/// List filters for the review dashboard
///
/// Exact-match filters combine with AND. `search` is a case-insensitive
/// substring match across university ID, name, email, phone, skills, and
/// motivation (OR-ed), AND-ed with the other filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFilter {
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub first_choice: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub second_choice: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ApplicationFilter {
    /// True when no filter is set
    pub fn is_empty(&self) -> bool {
        *self == ApplicationFilter::default()
    }

    /// Evaluates the filter in memory with the same semantics as [`Application::list`]
    pub fn matches(&self, app: &Application) -> bool {
        if self.first_choice.is_some_and(|v| v != app.first_choice) {
            return false;
        }
        if self.second_choice.is_some() && self.second_choice != app.second_choice {
            return false;
        }
        if self.status.is_some_and(|v| v != app.status) {
            return false;
        }
        if self.faculty.as_deref().is_some_and(|v| v != app.faculty) {
            return false;
        }
        if self.year.is_some_and(|v| v != app.year) {
            return false;
        }
        if let Some(term) = &self.search {
            let needle = term.to_lowercase();
            let haystacks = [
                &app.university_id,
                &app.full_name,
                &app.email,
                &app.phone_number,
                &app.skills,
                &app.motivation,
            ];
            if !haystacks.iter().any(|h| h.to_lowercase().contains(&needle)) {
                return false;
            }
        }
        true
    }

    /// Appends this filter's WHERE conditions to a query that already ends in `WHERE TRUE`
    fn push_conditions<'a>(&'a self, qb: &mut QueryBuilder<'a, Postgres>) {
        if let Some(first_choice) = self.first_choice {
            qb.push(" AND first_choice = ").push_bind(first_choice);
        }
        if let Some(second_choice) = self.second_choice {
            qb.push(" AND second_choice = ").push_bind(second_choice);
        }
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(faculty) = &self.faculty {
            qb.push(" AND faculty = ").push_bind(faculty);
        }
        if let Some(year) = self.year {
            qb.push(" AND year = ").push_bind(year);
        }
        if let Some(term) = &self.search {
            let pattern = format!("%{}%", escape_like(term));
            qb.push(" AND (");
            let mut any = qb.separated(" OR ");
            for column in SEARCH_COLUMNS {
                any.push(format!("{column} ILIKE "));
                any.push_bind_unseparated(pattern.clone());
            }
            qb.push(")");
        }
    }
}

/// Escapes `%`, `_` and `\` so user input matches literally inside a LIKE pattern
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Number of applications in each status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub total: i64,
}

impl StatusCounts {
    /// Tallies statuses from an iterator
    pub fn tally<I: IntoIterator<Item = ApplicationStatus>>(statuses: I) -> Self {
        let mut counts = StatusCounts::default();
        for status in statuses {
            counts.add(status, 1);
        }
        counts
    }

    fn add(&mut self, status: ApplicationStatus, n: i64) {
        match status {
            ApplicationStatus::Pending => self.pending += n,
            ApplicationStatus::Approved => self.approved += n,
            ApplicationStatus::Rejected => self.rejected += n,
        }
        self.total += n;
    }
}

/// Applicant demand per department (first choice)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DepartmentDemand {
    pub department_id: i32,
    pub name: String,
    pub applications: i64,
}

impl Application {
    /// Inserts a new application with status `pending`
    ///
    /// # Errors
    ///
    /// Returns a database error on unique violation of `university_id` or an
    /// unknown department id.
    pub async fn create(pool: &PgPool, data: NewApplication) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO applications (
                university_id, full_name, email, faculty, year, phone_number,
                first_choice, second_choice, skills, motivation, interview
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, Application>(&query)
            .bind(data.university_id)
            .bind(data.full_name)
            .bind(data.email)
            .bind(data.faculty)
            .bind(data.year)
            .bind(data.phone_number)
            .bind(data.first_choice)
            .bind(data.second_choice)
            .bind(data.skills)
            .bind(data.motivation)
            .bind(data.interview)
            .fetch_one(pool)
            .await
    }

    /// Finds an application by primary key
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM applications WHERE application_id = $1");
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds an application by university ID
    pub async fn find_by_university_id(
        pool: &PgPool,
        university_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM applications WHERE university_id = $1");
        sqlx::query_as::<_, Application>(&query)
            .bind(university_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists applications matching `filter`, newest first (`application_id DESC`)
    pub async fn list(pool: &PgPool, filter: &ApplicationFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS} FROM applications WHERE TRUE"
        ));
        filter.push_conditions(&mut qb);
        qb.push(" ORDER BY application_id DESC");

        qb.build_query_as::<Application>().fetch_all(pool).await
    }

    /// Lists every application in a given status, oldest first
    pub async fn list_by_status(
        pool: &PgPool,
        status: ApplicationStatus,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM applications WHERE status = $1 ORDER BY application_id ASC"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Sets the review status. Returns `None` if the application doesn't exist.
    pub async fn update_status(
        pool: &PgPool,
        id: i32,
        status: ApplicationStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE applications SET status = $2 WHERE application_id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Sets or clears the reviewer comment. Returns `None` if the application doesn't exist.
    pub async fn update_comment(
        pool: &PgPool,
        id: i32,
        comment: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE applications SET comment = $2 WHERE application_id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .bind(comment)
            .fetch_optional(pool)
            .await
    }

    /// Hard-deletes an application. Returns false if it didn't exist.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM applications WHERE application_id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts applications per status
    pub async fn status_counts(pool: &PgPool) -> Result<StatusCounts, sqlx::Error> {
        let rows: Vec<(ApplicationStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM applications GROUP BY status")
                .fetch_all(pool)
                .await?;

        let mut counts = StatusCounts::default();
        for (status, n) in rows {
            counts.add(status, n);
        }
        Ok(counts)
    }

    /// Counts applications per first-choice department, including departments with none
    pub async fn demand_by_department(pool: &PgPool) -> Result<Vec<DepartmentDemand>, sqlx::Error> {
        sqlx::query_as::<_, DepartmentDemand>(
            r#"
            SELECT d.department_id, d.name, COUNT(a.application_id) AS applications
            FROM departments d
            LEFT JOIN applications a ON a.first_choice = d.department_id
            GROUP BY d.department_id, d.name
            ORDER BY d.department_id
            "#,
        )
        .fetch_all(pool)
        .await
    }
}
