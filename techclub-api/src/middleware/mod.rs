/// Middleware modules for the API server
///
/// - `auth`: bearer-token authentication and role allow-lists
/// - `security`: security response headers

pub mod auth;
pub mod security;
