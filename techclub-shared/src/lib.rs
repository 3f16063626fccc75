//! # Tech Club Shared Library
//!
//! This crate contains the data model, authentication primitives, and database
//! plumbing shared by the Tech Club API server, its admin binaries, and the
//! typed client library.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their queries
//! - `auth`: Password hashing, JWT tokens, review passphrases, role checks
//! - `db`: Connection pool and migrations
//! - `audit`: Structured audit/security logging with field redaction

pub mod audit;
pub mod auth;
pub mod db;
pub mod models;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
