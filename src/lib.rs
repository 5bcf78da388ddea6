//! # Pepi (microblog with token authentication)
//!
//! `pepi` is a small multi-user content service. Users register with an
//! email and password, log in to receive a short-lived signed access token
//! plus an opaque refresh token, and present the access token as a bearer
//! credential on every protected request.
//!
//! ## Authentication
//!
//! Passwords are stored as salted Argon2id digests; the plaintext exists
//! only for the duration of a login call. Access tokens are stateless
//! HS256-signed assertions (subject, issuer, expiry) verified purely by
//! signature and clock. Refresh tokens are 256-bit random values with no
//! embedded claims.
//!
//! Login failures are deliberately opaque: an unknown email and a wrong
//! password produce the same `401 Unauthorized`, so the API cannot be used
//! to enumerate accounts.

pub mod auth;
pub mod cli;
pub mod pepi;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
