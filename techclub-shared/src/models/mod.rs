/// Database models for the Tech Club backend
///
/// This module contains all database models and their queries.
///
/// # Models
///
/// - `application`: Membership applications and the review workflow
/// - `department`: Club departments (seeded)
/// - `user`: Accounts, roles, and activation
/// - `member`: Accepted members, plus promotion of approved applications
/// - `board`: Board positions
/// - `event`, `session`, `attendance`: Club activity records
/// - `leaderboard`, `sponsor`, `suggestion`: Supporting club data
///
/// # Example
///
/// ```no_run
/// use techclub_shared::models::application::{Application, ApplicationFilter};
/// use techclub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let pending = Application::list(&pool, &ApplicationFilter::default()).await?;
/// println!("{} applications", pending.len());
/// # Ok(())
/// # }
/// ```

pub mod application;
pub mod attendance;
pub mod board;
pub mod department;
pub mod event;
pub mod leaderboard;
pub mod member;
pub mod session;
pub mod sponsor;
pub mod suggestion;
pub mod user;

pub mod lenient;
