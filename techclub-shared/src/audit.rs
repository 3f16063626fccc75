//! Structured audit and security logging.
//!
//! Audit events are ordinary `tracing` events on the `audit` target, so they
//! end up wherever the binary's subscriber sends logs and can be filtered with
//! `RUST_LOG=audit=info`. Detail payloads pass through [`redact_fields`] first.
//!
//! ```
//! use serde_json::json;
//! use techclub_shared::audit::{audit_event, AuditEvent, RequestMeta};
//!
//! let meta = RequestMeta::new(Some("10.0.0.7".into()), Some("curl/8.0".into()));
//! audit_event(AuditEvent::LoginFailure, &meta, json!({
//!     "university_id": "2023/00042",
//!     "reason": "invalid_password",
//!     "password": "never logged",
//! }));
//! ```

use serde_json::{Map, Value};

/// Tracing target for audit events
pub const AUDIT_TARGET: &str = "audit";

/// Replacement for sensitive values
pub const REDACTED: &str = "[REDACTED]";

/// Key fragments treated as sensitive, matched case-insensitively as substrings
const SENSITIVE_KEYS: [&str; 7] = [
    "password",
    "password_hash",
    "token",
    "secret",
    "key",
    "api_key",
    "authorization",
];

/// Audit-worthy actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    LoginSuccess,
    LoginFailure,
    Registration,
    Logout,
    PasswordChanged,
    ApplicationStatusChanged,
    ApplicationDeleted,
    MembersPromoted,
}

impl AuditEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEvent::LoginSuccess => "LOGIN_SUCCESS",
            AuditEvent::LoginFailure => "LOGIN_FAILURE",
            AuditEvent::Registration => "REGISTRATION",
            AuditEvent::Logout => "LOGOUT",
            AuditEvent::PasswordChanged => "PASSWORD_CHANGED",
            AuditEvent::ApplicationStatusChanged => "APPLICATION_STATUS_CHANGED",
            AuditEvent::ApplicationDeleted => "APPLICATION_DELETED",
            AuditEvent::MembersPromoted => "MEMBERS_PROMOTED",
        }
    }
}

/// Suspicious activity, logged at WARN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    InactiveLoginAttempt,
    InvalidReviewPassphrase,
    InsufficientRole,
}

impl SecurityEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityEvent::InactiveLoginAttempt => "SECURITY_INACTIVE_LOGIN_ATTEMPT",
            SecurityEvent::InvalidReviewPassphrase => "SECURITY_INVALID_REVIEW_PASSPHRASE",
            SecurityEvent::InsufficientRole => "SECURITY_INSUFFICIENT_ROLE",
        }
    }
}

/// Who made the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub client_ip: String,
    pub user_agent: String,
}

impl Default for RequestMeta {
    fn default() -> Self {
        Self {
            client_ip: "unknown".to_string(),
            user_agent: "unknown".to_string(),
        }
    }
}

impl RequestMeta {
    /// Missing or blank parts become `"unknown"`
    pub fn new(client_ip: Option<String>, user_agent: Option<String>) -> Self {
        let or_unknown = |v: Option<String>| {
            v.filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "unknown".to_string())
        };

        Self {
            client_ip: or_unknown(client_ip),
            user_agent: or_unknown(user_agent),
        }
    }
}

fn is_sensitive(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|s| key.contains(s))
}

/// Returns a copy of `value` with sensitive object fields replaced by `[REDACTED]`
///
/// Nested objects and arrays are walked.
pub fn redact_fields(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let redacted: Map<String, Value> = map
                .iter()
                .map(|(k, v)| {
                    let v = if is_sensitive(k) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_fields(v)
                    };
                    (k.clone(), v)
                })
                .collect();
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_fields).collect()),
        other => other.clone(),
    }
}

/// Emits an audit event at INFO
pub fn audit_event(event: AuditEvent, meta: &RequestMeta, details: Value) {
    let details = redact_fields(&details);
    tracing::info!(
        target: AUDIT_TARGET,
        event = event.as_str(),
        client_ip = %meta.client_ip,
        user_agent = %meta.user_agent,
        details = %details,
        "audit"
    );
}

/// Emits a security event at WARN
pub fn security_event(event: SecurityEvent, meta: &RequestMeta, details: Value) {
    let details = redact_fields(&details);
    tracing::warn!(
        target: AUDIT_TARGET,
        event = event.as_str(),
        client_ip = %meta.client_ip,
        user_agent = %meta.user_agent,
        details = %details,
        "security"
    );
}
