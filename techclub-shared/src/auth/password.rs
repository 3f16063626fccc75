/// Member password storage
///
/// New hashes are Argon2id (m=64 MiB, t=3, p=4, 32-byte output). Accounts
/// imported from the previous platform carry bcrypt hashes; those still
/// verify until the member next changes their password.
///
/// ```
/// use techclub_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("hunter22")?;
///
/// assert!(verify_password("hunter22", &hash)?);
/// assert!(!verify_password("wrong", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Minimum password length accepted at registration and password change
pub const MIN_PASSWORD_LEN: usize = 6;

const MEMORY_KIB: u32 = 64 * 1024;
const PASSES: u32 = 3;
const LANES: u32 = 4;
const OUTPUT_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("could not hash password: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    Malformed(String),
}

/// Algorithm a stored hash was produced with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    Argon2id,
    Bcrypt,
}

impl HashScheme {
    /// Detects the scheme from the PHC / modular-crypt prefix
    pub fn of(hash: &str) -> Self {
        if ["$2a$", "$2b$", "$2y$"].iter().any(|p| hash.starts_with(p)) {
            HashScheme::Bcrypt
        } else {
            HashScheme::Argon2id
        }
    }
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_KIB, PASSES, LANES, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes `password` into a PHC string (`$argon2id$v=19$m=65536,t=3,p=4$...`)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// `Ok(false)` on mismatch; errors only for a hash that can't be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    match HashScheme::of(hash) {
        HashScheme::Bcrypt => {
            bcrypt::verify(password, hash).map_err(|e| PasswordError::Malformed(e.to_string()))
        }
        HashScheme::Argon2id => {
            let stored =
                PasswordHash::new(hash).map_err(|e| PasswordError::Malformed(e.to_string()))?;

            if stored.salt.is_none() || stored.hash.is_none() {
                return Err(PasswordError::Malformed("missing salt or output".to_string()));
            }

            // Cost parameters come from the stored hash
            match Argon2::default().verify_password(password.as_bytes(), &stored) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(PasswordError::Malformed(e.to_string())),
            }
        }
    }
}

/// Length is counted in characters, not bytes
pub fn validate_password_length(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        ));
    }
    Ok(())
}
