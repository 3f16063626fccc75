//! # Tech Club Client Library
//!
//! Typed access to the club API for the review dashboard.
//!
//! ## Modules
//!
//! - `api`: HTTP client with an in-memory token and a cached application list
//! - `cache`: TTL response cache
//! - `debounce`: quiet-period debouncing for search input
//! - `dashboard`: review board state with optimistic status changes
//! - `error`: client error type
//!
//! ## Example
//!
//! ```no_run
//! use techclub_client::{api::ApiClient, dashboard::ReviewBoard};
//! use techclub_shared::models::application::ApplicationFilter;
//!
//! # async fn example() -> Result<(), techclub_client::error::ClientError> {
//! let client = ApiClient::new("http://localhost:3000/api")?;
//! client.login("2023/00042", "secret").await?;
//!
//! let mut board = ReviewBoard::new(client);
//! board.refresh(ApplicationFilter::default()).await?;
//! println!("{} applications", board.rows().len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod dashboard;
pub mod debounce;
pub mod error;

pub use api::{ApiClient, ApplicationsApi};
pub use error::{ClientError, ClientResult};
