/// Database plumbing
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded schema migrations from the workspace `migrations/` directory
///
/// Models and their queries live in [`crate::models`].
///
/// # Example
///
/// ```no_run
/// use techclub_shared::db::pool::{create_pool, DatabaseConfig};
/// use techclub_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig::from_url(std::env::var("DATABASE_URL")?)).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
