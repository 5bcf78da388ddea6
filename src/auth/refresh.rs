use rand::{RngCore, rngs::OsRng};
use thiserror::Error;

/// Bytes of entropy behind each refresh token (256 bits).
pub const REFRESH_TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
#[error("system random source unavailable")]
pub struct Error(#[from] rand::Error);

/// Produce an opaque rotation token: 32 random bytes, hex-encoded.
///
/// The token carries no claims; uniqueness, storage and expiry are the
/// persistence layer's concern.
///
/// # Errors
///
/// Returns an error only when the operating system's random source fails,
/// which callers must treat as fatal for the process.
pub fn new_refresh_token() -> Result<String, Error> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;

    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn token_is_lowercase_hex_of_expected_width() -> Result<(), Error> {
        let token = new_refresh_token()?;
        assert_eq!(token.len(), REFRESH_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        Ok(())
    }

    #[test]
    fn successive_tokens_differ() -> Result<(), Error> {
        assert_ne!(new_refresh_token()?, new_refresh_token()?);
        Ok(())
    }

    #[test]
    fn no_collisions_across_ten_thousand_samples() -> Result<(), Error> {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(new_refresh_token()?));
        }
        Ok(())
    }
}
