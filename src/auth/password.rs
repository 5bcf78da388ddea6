use argon2::{
    Argon2,
    password_hash::{
        Error as PhcError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to hash credential")]
    Hash,
    #[error("stored digest is not a valid PHC string")]
    MalformedDigest,
}

/// Hash a credential with Argon2id.
///
/// The returned PHC string embeds the salt and cost parameters, so
/// verification needs nothing besides the digest itself.
///
/// # Errors
///
/// Returns an error only if the hasher itself fails.
pub fn hash(candidate: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(candidate.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|_| Error::Hash)
}

/// Verify a credential against a stored PHC digest.
///
/// A mismatch is `Ok(false)`, not an error; the comparison runs in time
/// independent of where the first differing byte sits.
///
/// # Errors
///
/// Returns an error only when `digest` cannot be parsed as a PHC string.
pub fn verify(candidate: &str, digest: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(digest).map_err(|_| Error::MalformedDigest)?;

    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PhcError::Password) => Ok(false),
        Err(_) => Err(Error::MalformedDigest),
    }
}
