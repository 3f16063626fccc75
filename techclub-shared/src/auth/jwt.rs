/// JWT token generation and validation
///
/// Tokens are signed with HS256 and carry the user's id, role, and department
/// so that handlers can make role decisions without a second lookup. The
/// authentication middleware still reloads the user to reject deleted or
/// deactivated accounts.
///
/// # Configuration
///
/// - `JWT_SECRET`: required, at least 16 characters. Secrets shorter than 32
///   characters, well-known defaults (`secret`, `changeme`, ...) and
///   single-character repeats are accepted with a warning.
/// - `JWT_EXPIRES_IN`: `<n><unit>` with unit `s`, `m`, `h` or `d`. Anything
///   else falls back to `7d` with a warning.
///
/// # Example
///
/// ```
/// use techclub_shared::auth::jwt::{create_token, validate_token, Claims, JwtSettings};
/// use techclub_shared::models::user::UserRole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = JwtSettings::new("a-long-enough-secret-for-signing-tokens", Some("1h"))?;
///
/// let claims = Claims::new(42, UserRole::Board, Some(1), settings.expires_in);
/// let token = create_token(&claims, &settings.secret)?;
///
/// let validated = validate_token(&token, &settings.secret)?;
/// assert_eq!(validated.sub, 42);
/// assert_eq!(validated.role, UserRole::Board);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::user::UserRole;

/// Issuer claim on every token
pub const ISSUER: &str = "techclub";

/// Minimum accepted secret length
pub const MIN_SECRET_LEN: usize = 16;

/// Secrets shorter than this are accepted with a warning
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Expiration used when `JWT_EXPIRES_IN` is unset or malformed
pub const DEFAULT_EXPIRES_IN: &str = "7d";

const WEAK_SECRETS: [&str; 7] = [
    "secret",
    "password",
    "123456",
    "jwt_secret",
    "changeme",
    "test",
    "default",
];

static EXPIRES_IN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)([smhd])$").expect("valid expiration pattern"));

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// No secret configured
    #[error("JWT_SECRET environment variable is not set")]
    MissingSecret,

    /// Secret below the minimum length
    #[error("JWT_SECRET must be at least {min} characters long (current: {actual})")]
    SecretTooShort { min: usize, actual: usize },

    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format, or claim check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Issuer is not ours
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Non-fatal problems with an accepted secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretWarning {
    /// Shorter than [`RECOMMENDED_SECRET_LEN`]
    Short,

    /// Matches a well-known default value
    WellKnown,

    /// A single character repeated
    Repetitive,
}

impl SecretWarning {
    pub fn message(&self) -> &'static str {
        match self {
            SecretWarning::Short => "JWT_SECRET is shorter than the recommended 32 characters",
            SecretWarning::WellKnown => "JWT_SECRET appears to be a weak or default value",
            SecretWarning::Repetitive => "JWT_SECRET appears to be too simple or predictable",
        }
    }
}

/// Checks a signing secret
///
/// # Errors
///
/// Fails on an empty secret or one shorter than [`MIN_SECRET_LEN`].
/// Weaker-but-usable secrets produce warnings instead.
pub fn validate_secret(secret: &str) -> Result<Vec<SecretWarning>, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }

    let len = secret.chars().count();
    if len < MIN_SECRET_LEN {
        return Err(JwtError::SecretTooShort {
            min: MIN_SECRET_LEN,
            actual: len,
        });
    }

    let mut warnings = Vec::new();
    if len < RECOMMENDED_SECRET_LEN {
        warnings.push(SecretWarning::Short);
    }

    let lowered = secret.trim().to_lowercase();
    if WEAK_SECRETS.contains(&lowered.as_str()) {
        warnings.push(SecretWarning::WellKnown);
    }

    let mut chars = lowered.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            warnings.push(SecretWarning::Repetitive);
        }
    }

    Ok(warnings)
}

/// Parses a `<n><unit>` expiration such as `30m` or `7d`
pub fn parse_expires_in(value: &str) -> Option<Duration> {
    let caps = EXPIRES_IN_RE.captures(value.trim())?;
    let amount: i64 = caps[1].parse().ok()?;

    let duration = match &caps[2] {
        "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        _ => None,
    }?;

    // Tokens issued now must get a representable `exp`
    Utc::now().checked_add_signed(duration)?;
    Some(duration)
}

/// Resolved signing settings
#[derive(Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub expires_in: Duration,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl JwtSettings {
    /// Validates the secret and resolves the expiration, logging any warnings
    pub fn new(secret: impl Into<String>, expires_in: Option<&str>) -> Result<Self, JwtError> {
        let secret = secret.into();

        for warning in validate_secret(&secret)? {
            tracing::warn!(warning = ?warning, "{}", warning.message());
        }

        let expires_in = match expires_in {
            None => default_expiration(),
            Some(raw) => parse_expires_in(raw).unwrap_or_else(|| {
                tracing::warn!(
                    value = raw,
                    "Invalid JWT_EXPIRES_IN format, using default: {}",
                    DEFAULT_EXPIRES_IN
                );
                default_expiration()
            }),
        };

        Ok(Self { secret, expires_in })
    }
}

fn default_expiration() -> Duration {
    Duration::days(7)
}

/// JWT claims
///
/// - `sub`: user id
/// - `role`: account role at issue time
/// - `department`: the user's department, if any
/// - `iss`, `iat`, `exp`, `nbf`: standard claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub role: UserRole,
    pub department: Option<i32>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
}

impl Claims {
    /// Creates claims valid from now for `expires_in`
    pub fn new(user_id: i32, role: UserRole, department: Option<i32>, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            role,
            department,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(expires_in)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
            nbf: now.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies signature, issuer, `exp` and `nbf`, and returns the claims
///
/// # Errors
///
/// `JwtError::Expired` for an expired token; `ValidationError` or
/// `InvalidIssuer` for anything else wrong with it.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new(7, UserRole::Admin, Some(3), Duration::hours(1));
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, 7);
        assert_eq!(validated.role, UserRole::Admin);
        assert_eq!(validated.department, Some(3));
        assert_eq!(validated.iss, ISSUER);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(1, UserRole::Member, None, Duration::hours(1));
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, "another-secret-that-is-long-enough");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::new(1, UserRole::Member, None, Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_no_clock_leeway() {
        let claims = Claims::new(1, UserRole::Member, None, Duration::seconds(-30));
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_garbage() {
        assert!(matches!(
            validate_token("not.a.jwt", SECRET),
            Err(JwtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let mut claims = Claims::new(1, UserRole::Member, None, Duration::hours(1));
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::InvalidIssuer { .. })
        ));
    }

    #[test]
    fn test_secret_validation() {
        assert!(matches!(validate_secret(""), Err(JwtError::MissingSecret)));
        assert!(matches!(
            validate_secret("short"),
            Err(JwtError::SecretTooShort { min: 16, actual: 5 })
        ));

        assert_eq!(validate_secret(SECRET).unwrap(), vec![]);
        assert_eq!(
            validate_secret("sixteen-chars-ok").unwrap(),
            vec![SecretWarning::Short]
        );
        assert_eq!(
            validate_secret(&"a".repeat(40)).unwrap(),
            vec![SecretWarning::Repetitive]
        );
    }

    #[test]
    fn test_parse_expires_in() {
        assert_eq!(parse_expires_in("30s"), Some(Duration::seconds(30)));
        assert_eq!(parse_expires_in("15m"), Some(Duration::minutes(15)));
        assert_eq!(parse_expires_in("12h"), Some(Duration::hours(12)));
        assert_eq!(parse_expires_in("7d"), Some(Duration::days(7)));
        assert_eq!(parse_expires_in("7 days"), None);
        assert_eq!(parse_expires_in("h"), None);
        assert_eq!(parse_expires_in("-1d"), None);
        assert_eq!(parse_expires_in("999999999d"), None);
    }

    #[test]
    fn test_oversized_expiration_falls_back() {
        let settings = JwtSettings::new(SECRET, Some("999999999d")).unwrap();
        assert_eq!(settings.expires_in, Duration::days(7));

        let claims = Claims::new(1, UserRole::Member, None, Duration::days(100_000_000));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_settings_fall_back_to_default_expiration() {
        let settings = JwtSettings::new(SECRET, Some("forever")).unwrap();
        assert_eq!(settings.expires_in, Duration::days(7));

        let settings = JwtSettings::new(SECRET, None).unwrap();
        assert_eq!(settings.expires_in, Duration::days(7));

        let settings = JwtSettings::new(SECRET, Some("2h")).unwrap();
        assert_eq!(settings.expires_in, Duration::hours(2));
    }

    #[test]
    fn test_settings_debug_redacts_secret() {
        let settings = JwtSettings::new(SECRET, None).unwrap();
        assert!(!format!("{:?}", settings).contains(SECRET));
    }
}
