/// Authentication and authorization primitives
///
/// # Modules
///
/// - [`password`]: Argon2id hashing, legacy bcrypt verification
/// - [`jwt`]: token signing, validation, secret and expiry checks
/// - [`passphrase`]: shared review passphrases for status changes
/// - [`authorization`]: role allow-lists
/// - [`identity`]: university ID format check
///
/// The axum middleware that ties these together lives in the API crate.
///
/// # Example
///
/// ```no_run
/// use techclub_shared::auth::password::{hash_password, verify_password};
/// use techclub_shared::auth::jwt::{create_token, Claims};
/// use techclub_shared::models::user::UserRole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("member_password")?;
/// assert!(verify_password("member_password", &hash)?);
///
/// let claims = Claims::new(1, UserRole::Member, None, chrono::Duration::days(7));
/// let token = create_token(&claims, "a-long-enough-secret-for-signing-tokens")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod identity;
pub mod jwt;
pub mod passphrase;
pub mod password;
