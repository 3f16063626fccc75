/// Configuration for the API server
///
/// Everything comes from environment variables, with a `.env` file loaded
/// first when present.
///
/// # Environment Variables
///
/// | Variable | Default | |
/// |---|---|---|
/// | `API_HOST` | `0.0.0.0` | bind host |
/// | `PORT` | `3000` | bind port |
/// | `DATABASE_URL` | required | PostgreSQL URL |
/// | `DATABASE_MAX_CONNECTIONS` | `10` | pool size |
/// | `JWT_SECRET` | required | at least 16 characters |
/// | `JWT_EXPIRES_IN` | `7d` | `<n>s`, `<n>m`, `<n>h` or `<n>d` |
/// | `REVIEW_PASSPHRASES` | required | comma-separated status-change passphrases |
/// | `CORS_ORIGINS` | `*` | comma-separated allowed origins |
/// | `UPLOADS_DIR` | `uploads` | profile pictures, served at `/uploads` |
/// | `STATIC_DIR` | `client/public` | built front end, served at `/` |
/// | `APP_ENV` / `NODE_ENV` | `development` | `production` enables HSTS |
///
/// # Example
///
/// ```no_run
/// use techclub_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::path::PathBuf;
use techclub_shared::auth::jwt::{JwtError, JwtSettings};
use techclub_shared::auth::passphrase::ReviewPassphrases;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("REVIEW_PASSPHRASES must contain at least one non-empty passphrase")]
    NoReviewPassphrases,

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtSettings,

    /// Accepted passphrases for application status changes
    pub review_passphrases: ReviewPassphrases,

    pub storage: StorageConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Running with `APP_ENV=production`
    pub production: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Filesystem locations
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Uploaded profile pictures
    pub uploads_dir: PathBuf,

    /// Built single-page app (must contain `index.html`)
    pub static_dir: PathBuf,
}

impl Config {
    /// Loads `.env` (if any) and reads the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(var("PORT"), "PORT", 3000u16)?;

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let max_connections = parse_or(
            var("DATABASE_MAX_CONNECTIONS"),
            "DATABASE_MAX_CONNECTIONS",
            10u32,
        )?;

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let jwt = JwtSettings::new(jwt_secret, var("JWT_EXPIRES_IN").as_deref())?;

        let review_passphrases = ReviewPassphrases::from_csv(
            &var("REVIEW_PASSPHRASES").ok_or(ConfigError::Missing("REVIEW_PASSPHRASES"))?,
        );
        if review_passphrases.is_empty() {
            return Err(ConfigError::NoReviewPassphrases);
        }

        let cors_origins = var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        let environment = var("APP_ENV")
            .or_else(|| var("NODE_ENV"))
            .unwrap_or_else(|| "development".to_string());

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production: environment.eq_ignore_ascii_case("production"),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt,
            review_passphrases,
            storage: StorageConfig {
                uploads_dir: var("UPLOADS_DIR")
                    .unwrap_or_else(|| "uploads".to_string())
                    .into(),
                static_dir: var("STATIC_DIR")
                    .unwrap_or_else(|| "client/public".to_string())
                    .into(),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    pub(crate) fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = [
            ("DATABASE_URL", "postgres://localhost/techclub_test"),
            ("JWT_SECRET", "test-secret-key-at-least-32-bytes-long"),
            ("REVIEW_PASSPHRASES", "review-phrase"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        for (k, v) in pairs {
            map.insert(k.to_string(), v.to_string());
        }
        map
    }

    pub(crate) fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map = vars(pairs);
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert!(!config.api.production);
        assert_eq!(config.jwt.expires_in, chrono::Duration::days(7));
        assert_eq!(config.storage.uploads_dir, PathBuf::from("uploads"));
        assert_eq!(config.storage.static_dir, PathBuf::from("client/public"));
        assert!(config.review_passphrases.verify("review-phrase"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("API_HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("CORS_ORIGINS", "https://club.example, http://localhost:5173"),
            ("NODE_ENV", "production"),
            ("JWT_EXPIRES_IN", "12h"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.api.cors_origins,
            vec!["https://club.example", "http://localhost:5173"]
        );
        assert!(config.api.production);
        assert_eq!(config.jwt.expires_in, chrono::Duration::hours(12));
    }

    #[test]
    fn test_app_env_takes_precedence() {
        let config = load(&[("APP_ENV", "staging"), ("NODE_ENV", "production")]).unwrap();
        assert!(!config.api.production);
    }

    #[test]
    fn test_required_variables() {
        let map = vars(&[("DATABASE_URL", "")]);
        let err = Config::from_lookup(|k| map.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        assert!(matches!(
            load(&[("REVIEW_PASSPHRASES", " , ")]),
            Err(ConfigError::NoReviewPassphrases)
        ));
        assert!(matches!(
            load(&[("JWT_SECRET", "too-short")]),
            Err(ConfigError::Jwt(JwtError::SecretTooShort { .. }))
        ));
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(
            load(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
    }

    #[test]
    fn test_debug_does_not_leak_secrets() {
        let config = load(&[]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("test-secret-key"));
        assert!(!debug.contains("review-phrase"));
    }
}
