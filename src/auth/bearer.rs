use axum::http::{HeaderMap, header::AUTHORIZATION};
use thiserror::Error;

const SCHEME_PREFIX: &str = "Bearer ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BearerError {
    #[error("authorization header missing")]
    Missing,
    #[error("authorization header malformed")]
    Malformed,
}

/// Pull the bearer token out of a request's headers.
///
/// Only the first `authorization` value is considered. The value must use
/// the `Bearer ` scheme and carry a non-empty token once surrounding
/// whitespace is trimmed.
///
/// # Errors
///
/// `Missing` when the header is absent, `Malformed` when it is present but
/// uses another scheme or carries no token. Both are client errors.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers.get(AUTHORIZATION).ok_or(BearerError::Missing)?;
    let value = value.to_str().map_err(|_| BearerError::Malformed)?;

    let token = value
        .strip_prefix(SCHEME_PREFIX)
        .ok_or(BearerError::Malformed)?
        .trim();

    if token.is_empty() {
        return Err(BearerError::Malformed);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_token_after_scheme() {
        assert_eq!(extract_bearer(&headers_with("Bearer abc123")), Ok("abc123"));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(extract_bearer(&headers_with("Bearer   abc123  ")), Ok("abc123"));
    }

    #[test]
    fn absent_header_is_missing() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Err(BearerError::Missing));
    }

    #[test]
    fn wrong_scheme_is_malformed() {
        assert_eq!(
            extract_bearer(&headers_with("Basic xyz")),
            Err(BearerError::Malformed)
        );
    }

    #[test]
    fn empty_token_is_malformed() {
        assert_eq!(
            extract_bearer(&headers_with("Bearer    ")),
            Err(BearerError::Malformed)
        );
        assert_eq!(
            extract_bearer(&headers_with("Bearer")),
            Err(BearerError::Malformed)
        );
    }

    #[test]
    fn only_first_header_value_is_read() {
        let mut headers = headers_with("Bearer first");
        headers.append(AUTHORIZATION, HeaderValue::from_static("Bearer second"));
        assert_eq!(extract_bearer(&headers), Ok("first"));
    }
}
