//! Promotes approved applications to club members.
//!
//! Reads `DATABASE_URL` (or `.env`), runs the promotion once, and prints a
//! report. Safe to re-run: existing members are skipped.
//!
//! ```bash
//! cargo run -p techclub-api --bin promote-members
//! ```

use anyhow::Context;
use techclub_api::telemetry;
use techclub_shared::{
    db::pool::{close_pool, create_pool, DatabaseConfig},
    models::member::Member,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("techclub_shared=info,promote_members=info");

    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = create_pool(DatabaseConfig::from_url(url))
        .await
        .context("Failed to connect to database")?;

    let report = Member::promote_approved_applications(&pool)
        .await
        .context("Promotion failed")?;

    println!("Approved applications: {}", report.total);
    println!("Members created:       {}", report.created);
    println!("Already members:       {}", report.skipped);
    println!("Errors:                {}", report.errors.len());

    for error in &report.errors {
        println!(
            "  #{} {} ({}): {}",
            error.application_id, error.full_name, error.university_id, error.error
        );
    }

    close_pool(pool).await;
    Ok(())
}
